//! AI 聊天消息模型

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 打开面板或清空记录后展示的欢迎语
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your LesNote AI assistant. Ask me anything about planning or writing your lesson notes.";

/// AI 接口失败时追加的提示气泡
pub const AI_ERROR_MESSAGE: &str =
    "Sorry, I couldn't get a response right now. Please try again in a moment.";

/// 第一次点击清空后等待二次确认的时间
pub const CLEAR_CONFIRM_WINDOW: Duration = Duration::from_secs(5);

/// 收到回复后展示前的固定延迟（纯展示效果）
pub const RESPONSE_DELAY: Duration = Duration::from_millis(500);

/// 会话过期轮询间隔
pub const SESSION_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Ai,
    System,
}

/// 聊天面板中的一条气泡
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self::at(kind, text, Utc::now())
    }

    pub fn at(kind: MessageKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            text: text.into(),
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Ai, text)
    }

    pub fn welcome() -> Self {
        Self::new(MessageKind::System, WELCOME_MESSAGE)
    }
}
