//! 客户端配置
//!
//! API 地址只在这里配置一次，所有模块都通过 `ClientConfig::endpoint` 拼接 URL。

use std::time::Duration;
use tracing::debug;

/// 默认后端 API 地址（本地开发环境）
pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7225/api";

/// 默认本地 SQLite 数据库
pub const DEFAULT_DB_URL: &str = "sqlite://lesnote.db?mode=rwc";

/// 默认请求超时
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API 基础 URL（不带结尾的 `/`）
    pub api_base_url: String,
    /// 本地数据库 URL，可以是：
    /// - `sqlite://lesnote.db?mode=rwc`（文件）
    /// - `sqlite::memory:`（内存，进程结束即丢失）
    pub db_url: String,
    /// 是否接受自签名证书（本地后端使用开发证书）
    pub accept_invalid_certs: bool,
    /// 单个请求的超时时间
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// 使用指定的 API 地址创建配置
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        let accept_invalid_certs = is_local_origin(&api_base_url);
        Self {
            api_base_url,
            db_url: DEFAULT_DB_URL.to_string(),
            accept_invalid_certs,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_db_url(mut self, db_url: impl Into<String>) -> Self {
        self.db_url = db_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 从环境变量（以及 `.env` 文件）读取配置
    ///
    /// - `LESNOTE_API_URL`
    /// - `LESNOTE_DB_URL`
    /// - `LESNOTE_ACCEPT_INVALID_CERTS`（`1`/`true`/`0`/`false`）
    /// - `LESNOTE_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_env_with_api_url(None)
    }

    /// 同 `from_env`，但 API 地址由调用方（命令行参数）指定
    ///
    /// 其余配置仍来自环境变量；证书开关未显式设置时按新地址推导。
    pub fn from_env_with_api_url(api_url: Option<String>) -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("[Config] 已加载 .env: {}", path.display());
        }
        Self::from_lookup(with_api_url(|key| std::env::var(key).ok(), api_url))
    }

    /// 通过任意键值查找函数构建配置（`from_env` 的底层实现）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup("LESNOTE_API_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        );
        if let Some(db_url) = lookup("LESNOTE_DB_URL").filter(|v| !v.trim().is_empty()) {
            config.db_url = db_url;
        }
        if let Some(secs) = lookup("LESNOTE_REQUEST_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => debug!("[Config] 忽略无效的超时设置: {}", secs),
            }
        }
        if let Some(flag) = lookup("LESNOTE_ACCEPT_INVALID_CERTS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.accept_invalid_certs = true,
                "0" | "false" | "no" => config.accept_invalid_certs = false,
                other => debug!("[Config] 忽略无法识别的证书开关: {}", other),
            }
        }
        config
    }

    /// 拼接完整的接口地址，`path` 以 `/` 开头
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// 用给定的 API 地址覆盖查找结果中的 `LESNOTE_API_URL`
fn with_api_url<F>(lookup: F, api_url: Option<String>) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| match (key, &api_url) {
        ("LESNOTE_API_URL", Some(url)) => Some(url.clone()),
        _ => lookup(key),
    }
}

fn is_local_origin(url: &str) -> bool {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let host = without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}
