//! 会话过期轮询
//!
//! 聊天面板挂载期间定时检查 token，被清除或 `exp` 已过时通知监听器并停止。
//! 句柄被 drop 时后台任务随之取消。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::lesnote::auth::jwt::is_expired;
use crate::lesnote::chat::listener::ChatListener;
use crate::lesnote::chat::models::SESSION_POLL_INTERVAL;
use crate::lesnote::session::SessionStore;

pub struct SessionWatcher {
    handle: JoinHandle<()>,
}

impl SessionWatcher {
    pub fn spawn(session: SessionStore, listener: Arc<dyn ChatListener>) -> Self {
        Self::spawn_with_interval(session, listener, SESSION_POLL_INTERVAL)
    }

    pub fn spawn_with_interval(
        session: SessionStore,
        listener: Arc<dyn ChatListener>,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let expired = match session.token().await {
                    Ok(Some(token)) => is_expired(&token, Utc::now().timestamp()),
                    Ok(None) => true,
                    Err(e) => {
                        warn!("[SessionWatcher] 读取 token 失败: {}", e);
                        continue;
                    }
                };
                if expired {
                    info!("[SessionWatcher] ⏰ 会话已失效");
                    listener.on_session_expired().await;
                    break;
                }
                debug!("[SessionWatcher] 会话有效");
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::auth::jwt::encode_test_token;
    use crate::lesnote::chat::models::ChatMessage;
    use crate::lesnote::db::create_sqlite_pool_with_migration;
    use crate::lesnote::session::{keys, Persistence};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingListener {
        expired: AtomicUsize,
        notify: Notify,
    }

    #[async_trait]
    impl ChatListener for CountingListener {
        async fn on_messages_changed(&self, _messages: Vec<ChatMessage>) {}

        async fn on_session_expired(&self) {
            self.expired.fetch_add(1, Ordering::SeqCst);
            self.notify.notify_one();
        }
    }

    async fn session_with(token: Option<String>) -> SessionStore {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let session = SessionStore::new(pool);
        if let Some(token) = token {
            session
                .set(keys::TOKEN, &token, Persistence::Session)
                .await
                .unwrap();
        }
        session
    }

    #[tokio::test]
    async fn removed_token_fires_expiry_once() {
        let exp = Utc::now().timestamp() + 3600;
        let session = session_with(Some(encode_test_token(&json!({"sub": "u", "exp": exp})))).await;
        let listener = Arc::new(CountingListener::default());
        let watcher = SessionWatcher::spawn_with_interval(
            session.clone(),
            listener.clone(),
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(listener.expired.load(Ordering::SeqCst), 0);
        assert!(watcher.is_running());

        session.remove(keys::TOKEN).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), listener.notify.notified())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(listener.expired.load(Ordering::SeqCst), 1);
        assert!(!watcher.is_running());
    }

    #[tokio::test]
    async fn expired_token_is_detected() {
        let exp = Utc::now().timestamp() - 10;
        let session = session_with(Some(encode_test_token(&json!({"sub": "u", "exp": exp})))).await;
        let listener = Arc::new(CountingListener::default());
        let _watcher =
            SessionWatcher::spawn_with_interval(session, listener.clone(), Duration::from_millis(20));

        tokio::time::timeout(Duration::from_secs(2), listener.notify.notified())
            .await
            .unwrap();
        assert_eq!(listener.expired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_watcher_stops_polling() {
        let session = session_with(None).await;
        let listener = Arc::new(CountingListener::default());
        let watcher = SessionWatcher::spawn_with_interval(
            session,
            listener.clone(),
            Duration::from_secs(3600),
        );
        // interval 的第一次 tick 立即触发，先 drop 再让出调度
        drop(watcher);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(listener.expired.load(Ordering::SeqCst), 0);
    }
}
