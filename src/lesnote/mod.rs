//! LesNote 客户端 SDK
//!
//! 课程分类管理（级联筛选 + 分页增删改查）、教案结构、AI 聊天面板、
//! 教案搜索导出，以及统一的会话存储。

pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod crud;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod http;
pub mod listing;
pub mod notes;
pub mod session;
pub mod structure;
pub mod taxonomy;
pub mod types;

/// 测试日志：只初始化一次，输出交给测试框架捕获
#[cfg(test)]
pub(crate) fn init_test_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}
