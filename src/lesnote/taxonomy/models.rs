//! 课程分类模型：班级 → 科目 → 主题 → 课题

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub class_id: i64,
    /// 列表接口会附带班级名称，便于表格展示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub theme_number: i32,
    #[serde(default)]
    pub subject_id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Theme {
    /// 下拉框里展示的名称，后端没给 `displayName` 时按 “Theme N: 名称” 拼接
    pub fn label(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Theme {}: {}", self.theme_number, self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub theme_id: Option<i64>,
    #[serde(default)]
    pub subject_id: i64,
}

/// 级联下拉框中的一个选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOption {
    pub id: i64,
    pub label: String,
    /// 上级 ID（班级没有上级）
    pub parent_id: Option<i64>,
}

impl From<Class> for LevelOption {
    fn from(c: Class) -> Self {
        Self {
            id: c.id,
            label: c.name,
            parent_id: None,
        }
    }
}

impl From<Subject> for LevelOption {
    fn from(s: Subject) -> Self {
        Self {
            id: s.id,
            label: s.name,
            parent_id: Some(s.class_id),
        }
    }
}

impl From<Theme> for LevelOption {
    fn from(t: Theme) -> Self {
        Self {
            id: t.id,
            label: t.label(),
            parent_id: Some(t.subject_id),
        }
    }
}

impl From<Topic> for LevelOption {
    fn from(t: Topic) -> Self {
        Self {
            id: t.id,
            label: t.name,
            parent_id: Some(t.subject_id),
        }
    }
}
