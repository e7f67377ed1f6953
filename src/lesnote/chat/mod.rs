//! AI 聊天助手面板

pub mod api;
pub mod dao;
pub mod listener;
pub mod models;
pub mod service;
pub mod types;
pub mod watcher;

pub use api::{ChatApi, ChatBackend};
pub use dao::ChatHistoryStore;
pub use listener::{ChatListener, EmptyChatListener};
pub use models::{ChatMessage, MessageKind};
pub use service::{ChatPanel, ChatPanelConfig, ClearButton, ClearOutcome, PanelState};
pub use watcher::SessionWatcher;
