//! 聊天面板监听器回调接口

use async_trait::async_trait;

use crate::lesnote::chat::models::ChatMessage;

#[async_trait]
pub trait ChatListener: Send + Sync {
    /// 消息列表发生变化（追加、清空、加载历史）
    async fn on_messages_changed(&self, messages: Vec<ChatMessage>);

    /// token 已清除或过期，面板应关闭并回到登录页
    async fn on_session_expired(&self);
}

/// 默认空实现（无操作）
pub struct EmptyChatListener;

#[async_trait]
impl ChatListener for EmptyChatListener {
    async fn on_messages_changed(&self, _messages: Vec<ChatMessage>) {}

    async fn on_session_expired(&self) {}
}
