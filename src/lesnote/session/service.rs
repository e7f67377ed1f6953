//! 会话存储服务
//!
//! 登录写入、登出清除，其他模块只通过这里读取 token 和用户信息，
//! 不直接操作存储键。

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::lesnote::auth::types::LoginOutcome;
use crate::lesnote::error::ClientError;
use crate::lesnote::session::dao::StorageDao;
use crate::lesnote::session::models::{keys, Persistence, Role, Theme, UserProfile};

/// 会话存储（localStorage + sessionStorage 两层）
#[derive(Clone, Debug)]
pub struct SessionStore {
    dao: StorageDao,
    memory: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            dao: StorageDao::new(db),
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 读取键值，先查 sessionStorage，再查 localStorage
    pub async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        if let Some(value) = self.memory.lock().await.get(key).cloned() {
            return Ok(Some(value));
        }
        self.dao.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str, persistence: Persistence) -> Result<(), ClientError> {
        match persistence {
            Persistence::Local => {
                self.memory.lock().await.remove(key);
                self.dao.set(key, value).await
            }
            Persistence::Session => {
                self.memory
                    .lock()
                    .await
                    .insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    /// 从两层存储中同时删除
    pub async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.memory.lock().await.remove(key);
        self.dao.remove(key).await
    }

    /// 登录成功后写入会话
    ///
    /// `remember = true` 时持久化，否则仅在当前进程内有效。
    /// 换了账号登录时，上一个账号缓存的聊天记录会被清掉。
    pub async fn login(&self, outcome: &LoginOutcome, remember: bool) -> Result<(), ClientError> {
        let persistence = if remember {
            Persistence::Local
        } else {
            Persistence::Session
        };
        let profile = outcome.profile();
        let user_json = serde_json::to_string(&profile)?;

        let previous = self.dao.get(keys::LAST_LOGGED_IN_USER).await?;
        if previous.as_deref().is_some_and(|p| p != profile.email) {
            info!("[Session] 切换账号，清除上一个账号的聊天缓存");
            self.remove(keys::AI_CHAT_MESSAGES).await?;
            self.remove(keys::AI_CHAT_SESSION_ID).await?;
        }

        // 另一层里可能残留旧 token
        for key in [keys::TOKEN, keys::EMAIL, keys::USER] {
            self.remove(key).await?;
        }
        self.set(keys::TOKEN, &outcome.token, persistence).await?;
        self.set(keys::EMAIL, &profile.email, persistence).await?;
        self.set(keys::USER, &user_json, persistence).await?;
        self.set(keys::LAST_LOGGED_IN_USER, &profile.email, Persistence::Local)
            .await?;

        info!(
            "[Session] ✅ 已登录: {} (roleId={}, remember={})",
            profile.email, profile.role_id, remember
        );
        Ok(())
    }

    /// 登出：清除 token、用户信息和聊天缓存，保留主题和上次登录账号
    pub async fn logout(&self) -> Result<(), ClientError> {
        for key in [
            keys::TOKEN,
            keys::EMAIL,
            keys::USER,
            keys::AI_CHAT_MESSAGES,
            keys::AI_CHAT_SESSION_ID,
        ] {
            self.remove(key).await?;
        }
        info!("[Session] 👋 已登出");
        Ok(())
    }

    pub async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.get(keys::TOKEN).await?.filter(|t| !t.is_empty()))
    }

    pub async fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.token().await?.is_some())
    }

    pub async fn current_user(&self) -> Result<Option<UserProfile>, ClientError> {
        let Some(raw) = self.get(keys::USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("[Session] 用户信息无法解析，视为未登录: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn role(&self) -> Result<Option<Role>, ClientError> {
        Ok(self.current_user().await?.and_then(|u| u.role()))
    }

    pub async fn theme(&self) -> Result<Theme, ClientError> {
        Ok(self
            .get(keys::THEME)
            .await?
            .map(|v| Theme::parse(&v))
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<(), ClientError> {
        debug!("[Session] 切换主题: {}", theme.as_str());
        self.set(keys::THEME, theme.as_str(), Persistence::Local).await
    }

    pub async fn last_logged_in_user(&self) -> Result<Option<String>, ClientError> {
        self.dao.get(keys::LAST_LOGGED_IN_USER).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::db::create_sqlite_pool_with_migration;

    async fn store() -> SessionStore {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        SessionStore::new(pool)
    }

    fn outcome(email: &str, role_id: i32) -> LoginOutcome {
        LoginOutcome {
            token: format!("token-for-{}", email),
            email: email.to_string(),
            first_name: Some("Ada".into()),
            last_name: None,
            role_id,
            plan: Some("free".into()),
        }
    }

    #[tokio::test]
    async fn remembered_login_survives_new_store_instance() {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let first = SessionStore::new(pool.clone());
        first.login(&outcome("ada@school.ng", 1), true).await.unwrap();

        let second = SessionStore::new(pool);
        assert_eq!(
            second.token().await.unwrap().as_deref(),
            Some("token-for-ada@school.ng")
        );
        assert_eq!(second.role().await.unwrap(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn session_only_login_is_not_persisted() {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let first = SessionStore::new(pool.clone());
        first.login(&outcome("ada@school.ng", 3), false).await.unwrap();
        assert!(first.is_authenticated().await.unwrap());

        let second = SessionStore::new(pool);
        assert!(!second.is_authenticated().await.unwrap());
        assert_eq!(
            second.last_logged_in_user().await.unwrap().as_deref(),
            Some("ada@school.ng")
        );
    }

    #[tokio::test]
    async fn logout_clears_identity_but_keeps_theme() {
        let store = store().await;
        store.set_theme(Theme::Dark).await.unwrap();
        store.login(&outcome("ada@school.ng", 2), true).await.unwrap();
        store
            .set(keys::AI_CHAT_SESSION_ID, "abc", Persistence::Local)
            .await
            .unwrap();

        store.logout().await.unwrap();
        assert!(store.token().await.unwrap().is_none());
        assert!(store.current_user().await.unwrap().is_none());
        assert!(store.get(keys::AI_CHAT_SESSION_ID).await.unwrap().is_none());
        assert_eq!(store.theme().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn switching_account_drops_previous_chat_cache() {
        let store = store().await;
        store.login(&outcome("ada@school.ng", 3), true).await.unwrap();
        store
            .set(keys::AI_CHAT_MESSAGES, "[]", Persistence::Local)
            .await
            .unwrap();

        store.login(&outcome("ada@school.ng", 3), true).await.unwrap();
        assert!(store.get(keys::AI_CHAT_MESSAGES).await.unwrap().is_some());

        store.login(&outcome("bola@school.ng", 3), true).await.unwrap();
        assert!(store.get(keys::AI_CHAT_MESSAGES).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_layer_shadows_local_layer() {
        let store = store().await;
        store.set("k", "local", Persistence::Local).await.unwrap();
        store.set("k", "session", Persistence::Session).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("session"));
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
