//! 聊天记录本地缓存
//!
//! 整段记录以 `{sessionId, messages}` 的 JSON 存在 `ai_chat_messages` 键下，
//! 会话 ID 对不上的缓存一律视为不存在。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::lesnote::auth::jwt::session_id_for;
use crate::lesnote::chat::models::ChatMessage;
use crate::lesnote::error::ClientError;
use crate::lesnote::session::{keys, Persistence, SessionStore};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHistory {
    session_id: String,
    messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug)]
pub struct ChatHistoryStore {
    session: SessionStore,
}

impl ChatHistoryStore {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// 根据 token 得到聊天会话 ID 并缓存
    ///
    /// 与已缓存的 ID 不同时（换了账号或 token），旧的聊天缓存被清除。
    pub async fn resolve_session_id(&self, token: &str) -> Result<String, ClientError> {
        let session_id = session_id_for(token);
        let cached = self.session.get(keys::AI_CHAT_SESSION_ID).await?;
        if cached.as_deref() != Some(session_id.as_str()) {
            if cached.is_some() {
                debug!("[ChatStore] 会话 ID 变化，清除旧聊天缓存");
                self.session.remove(keys::AI_CHAT_MESSAGES).await?;
            }
            self.session
                .set(keys::AI_CHAT_SESSION_ID, &session_id, Persistence::Local)
                .await?;
        }
        Ok(session_id)
    }

    /// 读取某个会话的缓存记录
    pub async fn load(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>, ClientError> {
        let Some(raw) = self.session.get(keys::AI_CHAT_MESSAGES).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<StoredHistory>(&raw) {
            Ok(stored) if stored.session_id == session_id && !stored.messages.is_empty() => {
                Ok(Some(stored.messages))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("[ChatStore] 聊天缓存无法解析，忽略: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), ClientError> {
        let stored = StoredHistory {
            session_id: session_id.to_string(),
            messages: messages.to_vec(),
        };
        let raw = serde_json::to_string(&stored)?;
        self.session
            .set(keys::AI_CHAT_MESSAGES, &raw, Persistence::Local)
            .await
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        self.session.remove(keys::AI_CHAT_MESSAGES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::auth::jwt::encode_test_token;
    use crate::lesnote::db::create_sqlite_pool_with_migration;
    use serde_json::json;

    async fn store() -> ChatHistoryStore {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        ChatHistoryStore::new(SessionStore::new(pool))
    }

    #[tokio::test]
    async fn history_of_another_session_is_hidden() {
        let store = store().await;
        store
            .save("user-a", &[ChatMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(store.load("user-a").await.unwrap().map(|m| m.len()), Some(1));
        assert!(store.load("user-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_session_id_drops_cached_history() {
        let store = store().await;
        let token_a = encode_test_token(&json!({"sub": "user-a"}));
        let token_b = encode_test_token(&json!({"sub": "user-b"}));

        let id = store.resolve_session_id(&token_a).await.unwrap();
        assert_eq!(id, "user-a");
        store.save(&id, &[ChatMessage::user("hi")]).await.unwrap();

        // 同一个 token 再次解析不会清缓存
        store.resolve_session_id(&token_a).await.unwrap();
        assert!(store.load("user-a").await.unwrap().is_some());

        assert_eq!(store.resolve_session_id(&token_b).await.unwrap(), "user-b");
        assert!(store.load("user-a").await.unwrap().is_none());
    }
}
