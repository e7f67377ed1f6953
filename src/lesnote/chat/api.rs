//! AI 聊天 HTTP API 客户端

use async_trait::async_trait;
use tracing::{debug, info};

use crate::lesnote::chat::models::ChatMessage;
use crate::lesnote::chat::types::{ChatHistoryEntry, ChatRequest, ChatResponse, DeleteChatRequest};
use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;

/// 聊天后端
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 服务器保存的历史记录
    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ClientError>;

    /// 发送一条消息，返回 AI 回复
    async fn send(&self, message: &str, session_id: &str) -> Result<String, ClientError>;

    async fn delete_history(&self, session_id: &str) -> Result<(), ClientError>;
}

#[derive(Clone, Debug)]
pub struct ChatApi {
    http: ApiClient,
}

impl ChatApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatBackend for ChatApi {
    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
        let entries: Option<Vec<ChatHistoryEntry>> = self
            .http
            .get_json(
                "/AI/chat-history",
                &[("sessionId", session_id.to_string())],
                "聊天历史",
            )
            .await?;
        let messages: Vec<ChatMessage> = entries
            .unwrap_or_default()
            .into_iter()
            .flat_map(ChatHistoryEntry::into_messages)
            .collect();
        debug!("[ChatAPI] 服务器历史消息 {} 条", messages.len());
        Ok(messages)
    }

    async fn send(&self, message: &str, session_id: &str) -> Result<String, ClientError> {
        let req = ChatRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };
        let resp: ChatResponse = self.http.post_json("/AI/chat", &req, "发送聊天消息").await?;
        Ok(resp.response)
    }

    async fn delete_history(&self, session_id: &str) -> Result<(), ClientError> {
        info!("[ChatAPI] 🗑️ 删除聊天记录 sessionId={}", session_id);
        self.http
            .post_unit(
                "/AI/delete-chat",
                &DeleteChatRequest {
                    session_id: session_id.to_string(),
                },
                "删除聊天记录",
            )
            .await
    }
}
