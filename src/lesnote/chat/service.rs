//! AI 聊天面板状态机
//!
//! `Closed → Open(Idle | AwaitingResponse)`。
//! 发送：追加用户气泡并锁定输入 → 请求 → 固定延迟后追加 AI 气泡（失败则追加错误气泡）→ 解锁并写缓存。
//! 清空：第一次点击进入确认状态，确认窗口内再次点击才真正删除。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::lesnote::chat::api::ChatBackend;
use crate::lesnote::chat::dao::ChatHistoryStore;
use crate::lesnote::chat::listener::{ChatListener, EmptyChatListener};
use crate::lesnote::chat::models::{
    ChatMessage, AI_ERROR_MESSAGE, CLEAR_CONFIRM_WINDOW, RESPONSE_DELAY,
};
use crate::lesnote::error::ClientError;

/// 面板时间参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPanelConfig {
    pub clear_confirm_window: Duration,
    pub response_delay: Duration,
}

impl Default for ChatPanelConfig {
    fn default() -> Self {
        Self {
            clear_confirm_window: CLEAR_CONFIRM_WINDOW,
            response_delay: RESPONSE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Idle,
    AwaitingResponse,
}

/// 清空按钮当前显示的图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearButton {
    Trash,
    Confirm,
}

/// 一次点击清空按钮的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Armed,
    Cleared,
}

pub struct ChatPanel {
    backend: Arc<dyn ChatBackend>,
    store: ChatHistoryStore,
    listener: Arc<dyn ChatListener>,
    config: ChatPanelConfig,
    session_id: String,
    state: PanelState,
    messages: Vec<ChatMessage>,
    clear_deadline: Option<Instant>,
}

impl ChatPanel {
    pub fn new(backend: Arc<dyn ChatBackend>, store: ChatHistoryStore, session_id: impl Into<String>) -> Self {
        Self::with_listener(backend, store, session_id, Arc::new(EmptyChatListener))
    }

    pub fn with_listener(
        backend: Arc<dyn ChatBackend>,
        store: ChatHistoryStore,
        session_id: impl Into<String>,
        listener: Arc<dyn ChatListener>,
    ) -> Self {
        Self {
            backend,
            store,
            listener,
            config: ChatPanelConfig::default(),
            session_id: session_id.into(),
            state: PanelState::Closed,
            messages: Vec::new(),
            clear_deadline: None,
        }
    }

    pub fn with_config(mut self, config: ChatPanelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 等待回复时输入框锁定
    pub fn is_input_locked(&self) -> bool {
        self.state == PanelState::AwaitingResponse
    }

    /// 打开面板并加载历史
    ///
    /// 优先本地缓存，其次服务器历史，都没有时只显示欢迎语。
    pub async fn open(&mut self) -> Result<(), ClientError> {
        if self.state != PanelState::Closed {
            return Ok(());
        }
        self.messages = match self.store.load(&self.session_id).await? {
            Some(cached) => {
                debug!("[Chat] 使用本地缓存 {} 条", cached.len());
                cached
            }
            None => match self.backend.history(&self.session_id).await {
                Ok(history) if !history.is_empty() => history,
                Ok(_) => vec![ChatMessage::welcome()],
                Err(e) => {
                    warn!("[Chat] 加载服务器聊天历史失败: {}", e);
                    vec![ChatMessage::welcome()]
                }
            },
        };
        self.state = PanelState::Idle;
        info!("[Chat] 💬 面板已打开 sessionId={}", self.session_id);
        self.notify().await;
        Ok(())
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
        self.clear_deadline = None;
    }

    /// 发送一条消息
    ///
    /// 空白消息、面板未打开或正在等待回复时忽略，返回 `Ok(false)`。
    pub async fn send(&mut self, text: &str) -> Result<bool, ClientError> {
        let text = text.trim();
        if text.is_empty() || self.state != PanelState::Idle {
            return Ok(false);
        }

        self.messages.push(ChatMessage::user(text));
        self.state = PanelState::AwaitingResponse;
        self.notify().await;

        let reply = match self.backend.send(text, &self.session_id).await {
            Ok(reply) => {
                tokio::time::sleep(self.config.response_delay).await;
                ChatMessage::ai(reply)
            }
            Err(e) => {
                warn!("[Chat] AI 回复失败: {}", e);
                ChatMessage::ai(AI_ERROR_MESSAGE)
            }
        };
        self.messages.push(reply);
        self.state = PanelState::Idle;
        self.persist().await?;
        self.notify().await;
        Ok(true)
    }

    /// 确认窗口过期后自动回到垃圾桶图标
    pub fn tick(&mut self) {
        if self
            .clear_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            debug!("[Chat] 清空确认已超时");
            self.clear_deadline = None;
        }
    }

    pub fn clear_button(&mut self) -> ClearButton {
        self.tick();
        if self.clear_deadline.is_some() {
            ClearButton::Confirm
        } else {
            ClearButton::Trash
        }
    }

    /// 点击清空按钮
    pub async fn click_clear(&mut self) -> Result<ClearOutcome, ClientError> {
        if self.clear_button() == ClearButton::Trash {
            self.clear_deadline = Some(Instant::now() + self.config.clear_confirm_window);
            return Ok(ClearOutcome::Armed);
        }

        self.clear_deadline = None;
        self.backend.delete_history(&self.session_id).await?;
        self.messages = vec![ChatMessage::welcome()];
        self.persist().await?;
        info!("[Chat] 🗑️ 聊天记录已清空 sessionId={}", self.session_id);
        self.notify().await;
        Ok(ClearOutcome::Cleared)
    }

    async fn persist(&self) -> Result<(), ClientError> {
        self.store.save(&self.session_id, &self.messages).await
    }

    async fn notify(&self) {
        self.listener.on_messages_changed(self.messages.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::chat::models::{MessageKind, WELCOME_MESSAGE};
    use crate::lesnote::db::create_sqlite_pool_with_migration;
    use crate::lesnote::session::SessionStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        sent: Mutex<Vec<String>>,
        deletes: Mutex<u32>,
        fail_send: bool,
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn history(&self, _session_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
            Ok(Vec::new())
        }

        async fn send(&self, message: &str, _session_id: &str) -> Result<String, ClientError> {
            self.sent.lock().await.push(message.to_string());
            if self.fail_send {
                return Err(ClientError::Network("timeout".into()));
            }
            Ok(format!("echo: {}", message))
        }

        async fn delete_history(&self, _session_id: &str) -> Result<(), ClientError> {
            *self.deletes.lock().await += 1;
            Ok(())
        }
    }

    fn fast() -> ChatPanelConfig {
        ChatPanelConfig {
            clear_confirm_window: Duration::from_millis(200),
            response_delay: Duration::from_millis(5),
        }
    }

    async fn panel(backend: Arc<FakeBackend>) -> (ChatHistoryStore, ChatPanel) {
        crate::lesnote::init_test_logging();
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let store = ChatHistoryStore::new(SessionStore::new(pool));
        let panel = ChatPanel::new(backend, store.clone(), "user-a").with_config(fast());
        (store, panel)
    }

    #[tokio::test]
    async fn open_without_history_shows_welcome() {
        let (_, mut panel) = panel(Arc::new(FakeBackend::default())).await;
        panel.open().await.unwrap();
        assert_eq!(panel.state(), PanelState::Idle);
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.messages()[0].kind, MessageKind::System);
        assert_eq!(panel.messages()[0].text, WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn send_appends_both_bubbles_and_persists() {
        let backend = Arc::new(FakeBackend::default());
        let (store, mut panel) = panel(Arc::clone(&backend)).await;
        panel.open().await.unwrap();

        assert!(panel.send("  Plan fractions  ").await.unwrap());
        let kinds: Vec<_> = panel.messages().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::System, MessageKind::User, MessageKind::Ai]);
        assert_eq!(panel.messages()[2].text, "echo: Plan fractions");
        assert!(!panel.is_input_locked());

        let cached = store.load("user-a").await.unwrap().unwrap();
        assert_eq!(cached.len(), 3);

        // 重新打开时从缓存恢复
        panel.close();
        panel.open().await.unwrap();
        assert_eq!(panel.messages().len(), 3);
    }

    #[tokio::test]
    async fn blank_or_closed_send_is_ignored() {
        let backend = Arc::new(FakeBackend::default());
        let (_, mut panel) = panel(Arc::clone(&backend)).await;
        assert!(!panel.send("hello").await.unwrap());
        panel.open().await.unwrap();
        assert!(!panel.send("   ").await.unwrap());
        assert!(backend.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failed_send_appends_error_bubble() {
        let backend = Arc::new(FakeBackend {
            fail_send: true,
            ..Default::default()
        });
        let (_, mut panel) = panel(backend).await;
        panel.open().await.unwrap();
        panel.send("hello").await.unwrap();
        let last = panel.messages().last().unwrap();
        assert_eq!(last.kind, MessageKind::Ai);
        assert_eq!(last.text, AI_ERROR_MESSAGE);
        assert_eq!(panel.state(), PanelState::Idle);
    }

    #[tokio::test]
    async fn second_click_within_window_clears_history() {
        let backend = Arc::new(FakeBackend::default());
        let (_, mut panel) = panel(Arc::clone(&backend)).await;
        panel.open().await.unwrap();
        panel.send("hello").await.unwrap();

        assert_eq!(panel.click_clear().await.unwrap(), ClearOutcome::Armed);
        assert_eq!(panel.clear_button(), ClearButton::Confirm);
        assert_eq!(*backend.deletes.lock().await, 0);

        assert_eq!(panel.click_clear().await.unwrap(), ClearOutcome::Cleared);
        assert_eq!(*backend.deletes.lock().await, 1);
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.messages()[0].kind, MessageKind::System);
        assert_eq!(panel.clear_button(), ClearButton::Trash);
    }

    #[test]
    fn default_timings() {
        let config = ChatPanelConfig::default();
        assert_eq!(config.response_delay, Duration::from_millis(500));
        assert_eq!(config.clear_confirm_window, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn confirmation_disarms_after_window() {
        let backend = Arc::new(FakeBackend::default());
        let (_, panel) = panel(Arc::clone(&backend)).await;
        let mut panel = panel.with_config(ChatPanelConfig::default());
        panel.open().await.unwrap();

        // 以下步骤不访问数据库，可以暂停时钟
        tokio::time::pause();
        assert_eq!(panel.click_clear().await.unwrap(), ClearOutcome::Armed);
        tokio::time::advance(CLEAR_CONFIRM_WINDOW - Duration::from_millis(1)).await;
        assert_eq!(panel.clear_button(), ClearButton::Confirm);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(panel.clear_button(), ClearButton::Trash);

        // 超时后的点击重新进入确认状态，不会删除
        assert_eq!(panel.click_clear().await.unwrap(), ClearOutcome::Armed);
        assert_eq!(*backend.deletes.lock().await, 0);
    }
}
