//! 教案搜索模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lesnote::listing::ListQuery;
use crate::lesnote::types::deserialize_flexible_datetime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonNote {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `POST /LessonNotes/search` 请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
    pub search_term: String,
    pub page: u32,
    pub page_size: u32,
}

impl From<&ListQuery> for SearchRequest {
    fn from(query: &ListQuery) -> Self {
        Self {
            class_id: query.filter_id("classId"),
            subject_id: query.filter_id("subjectId"),
            theme_id: query.filter_id("themeId"),
            topic_id: query.filter_id("topicId"),
            search_term: query.search_term.trim().to_string(),
            page: query.page,
            page_size: query.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_comes_from_list_query() {
        let mut query = ListQuery {
            page: 2,
            search_term: " fractions ".into(),
            ..Default::default()
        };
        query.filters.insert("subjectId".into(), "9".into());

        let json = serde_json::to_value(SearchRequest::from(&query)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "subjectId": 9,
                "searchTerm": "fractions",
                "page": 2,
                "pageSize": 10
            })
        );
    }
}
