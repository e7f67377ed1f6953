//! 通用响应结构体与反序列化辅助函数

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 反序列化时间字段，兼容 RFC3339 与不带时区的 `2024-05-01T10:00:00.123`
/// （后端 DateTime 序列化时可能不带 `Z`，按 UTC 处理）
pub(crate) fn deserialize_flexible_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = opt.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

/// 分页信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// 分页列表响应：`{ items: T[], pagination: { totalPages, totalCount } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_pages: u32, total_count: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta {
                total_pages,
                total_count,
                ..Default::default()
            },
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }
}

/// 只带一条提示信息的响应（注册、验证码等接口）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
