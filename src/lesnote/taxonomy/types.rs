//! 课程分类 API DTO（请求结构体）及表单草稿

use serde::Serialize;

use crate::lesnote::error::ClientError;

#[derive(Debug, Clone, Serialize)]
pub struct ClassRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    pub name: String,
    pub class_id: i64,
}

/// 一次为某个班级创建多个科目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBatchRequest {
    pub class_id: i64,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRequest {
    pub name: String,
    pub theme_number: i32,
    pub subject_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRequest {
    pub name: String,
    pub subject_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
}

/// 一次为某个科目（可选主题）创建多个课题
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicBatchRequest {
    pub subject_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
    pub names: Vec<String>,
}

/// 去掉首尾空白并丢弃空行
pub fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_id(value: Option<i64>, field: &'static str, label: &str) -> Result<i64, ClientError> {
    value.ok_or_else(|| ClientError::validation(field, format!("Please select a {}.", label)))
}

/// 科目表单草稿：新增时可以一次填写多个名称
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDraft {
    pub class_id: Option<i64>,
    pub names: Vec<String>,
}

impl Default for SubjectDraft {
    fn default() -> Self {
        Self {
            class_id: None,
            names: vec![String::new()],
        }
    }
}

impl SubjectDraft {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_id(self.class_id, "classId", "class")?;
        if clean_names(&self.names).is_empty() {
            return Err(ClientError::validation(
                "names",
                "Enter at least one subject name.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeDraft {
    pub subject_id: Option<i64>,
    pub name: String,
    pub theme_number: Option<i32>,
}

impl ThemeDraft {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_id(self.subject_id, "subjectId", "subject")?;
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("name", "Theme name is required."));
        }
        match self.theme_number {
            Some(n) if n > 0 => Ok(()),
            _ => Err(ClientError::validation(
                "themeNumber",
                "Theme number must be a positive number.",
            )),
        }
    }
}

/// 课题表单草稿：新增时可以一次填写多个名称
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDraft {
    pub subject_id: Option<i64>,
    pub theme_id: Option<i64>,
    pub names: Vec<String>,
}

impl Default for TopicDraft {
    fn default() -> Self {
        Self {
            subject_id: None,
            theme_id: None,
            names: vec![String::new()],
        }
    }
}

impl TopicDraft {
    pub fn validate(&self) -> Result<(), ClientError> {
        require_id(self.subject_id, "subjectId", "subject")?;
        if clean_names(&self.names).is_empty() {
            return Err(ClientError::validation(
                "names",
                "Enter at least one topic name.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_names_drops_blank_rows() {
        let names = vec!["".to_string(), " Algebra ".to_string(), "  ".to_string()];
        assert_eq!(clean_names(&names), vec!["Algebra".to_string()]);
    }

    #[test]
    fn drafts_require_parent_scope() {
        let draft = SubjectDraft {
            class_id: None,
            names: vec!["Math".into()],
        };
        assert!(matches!(
            draft.validate(),
            Err(ClientError::Validation { field: "classId", .. })
        ));

        let draft = TopicDraft {
            subject_id: Some(9),
            ..Default::default()
        };
        assert!(matches!(
            draft.validate(),
            Err(ClientError::Validation { field: "names", .. })
        ));

        let draft = ThemeDraft {
            subject_id: Some(9),
            name: "Numbers".into(),
            theme_number: Some(0),
        };
        assert!(matches!(
            draft.validate(),
            Err(ClientError::Validation { field: "themeNumber", .. })
        ));
    }

    #[test]
    fn optional_theme_is_omitted_from_topic_payload() {
        let req = TopicRequest {
            name: "Fractions".into(),
            subject_id: 9,
            theme_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Fractions", "subjectId": 9}));
    }
}
