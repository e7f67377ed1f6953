//! SQLite 数据库工具：统一创建连接池并执行 sqlx 迁移
//!
//! 约定：本 crate 根目录下存在 `migrations/` 目录，存放所有迁移 SQL 文件。
//! 通过 `sqlx::migrate!()` 自动管理 schema 升级。

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

/// 创建 SQLite 连接池并执行所有未执行的迁移
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("无效的数据库 URL: {}", db_url))?
        .create_if_missing(true);

    // 内存数据库每个连接都是独立的库，只能用单连接
    let in_memory = db_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("连接SQLite数据库失败: {}", db_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("执行数据库迁移失败")?;

    info!("[DB] ✅ 数据库已就绪: {}", db_url);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_local_storage_table() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("lesnote.db").display());
        let pool = create_sqlite_pool_with_migration(&url).await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'local_storage'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(count, 1);

        // 重复执行迁移不会出错
        drop(pool);
        create_sqlite_pool_with_migration(&url).await?;
        Ok(())
    }
}
