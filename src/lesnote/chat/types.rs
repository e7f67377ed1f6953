//! AI 聊天 API DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lesnote::chat::models::{ChatMessage, MessageKind};
use crate::lesnote::types::deserialize_flexible_datetime;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(alias = "reply", alias = "message")]
    pub response: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteChatRequest {
    pub session_id: String,
}

/// 服务器保存的一轮问答
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryEntry {
    #[serde(default, alias = "userMessage")]
    pub message: Option<String>,
    #[serde(default, alias = "aiResponse")]
    pub response: Option<String>,
    #[serde(default, alias = "createdAt", deserialize_with = "deserialize_flexible_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatHistoryEntry {
    /// 展开成用户气泡和 AI 气泡
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let at = self.timestamp.unwrap_or_else(Utc::now);
        let mut out = Vec::with_capacity(2);
        if let Some(text) = self.message.filter(|t| !t.trim().is_empty()) {
            out.push(ChatMessage::at(MessageKind::User, text, at));
        }
        if let Some(text) = self.response.filter(|t| !t.trim().is_empty()) {
            out.push(ChatMessage::at(MessageKind::Ai, text, at));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_expands_to_two_bubbles() {
        let entry: ChatHistoryEntry = serde_json::from_str(
            r#"{"userMessage":"Plan a lesson on fractions","aiResponse":"Sure!","createdAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        let messages = entry.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::User);
        assert_eq!(messages[1].text, "Sure!");
    }

    #[test]
    fn reply_alias_is_accepted() {
        let resp: ChatResponse = serde_json::from_str(r#"{"reply":"hi"}"#).unwrap();
        assert_eq!(resp.response, "hi");
    }
}
