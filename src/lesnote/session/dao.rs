//! 本地键值存储数据访问层（DAO）
//!
//! 替代浏览器 localStorage，数据落在 SQLite 的 `local_storage` 表中。

use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

use crate::lesnote::error::ClientError;

/// 键值存储 DAO（基于 sqlx）
#[derive(Clone, Debug)]
pub struct StorageDao {
    db: Pool<Sqlite>,
}

impl StorageDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.db)
        .await?;
        debug!("[StorageDAO] 写入键: {}", key);
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;
        debug!("[StorageDAO] 删除键: {}", key);
        Ok(())
    }
}
