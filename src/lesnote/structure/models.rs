//! 教案结构模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lesnote::types::{deserialize_flexible_datetime, deserialize_vec_or_null};

/// 教案结构的七个固定分区，顺序即展示顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Objectives,
    Content,
    TeacherActivities,
    StudentActivities,
    Materials,
    Evaluation,
    Assessment,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Objectives,
        Section::Content,
        Section::TeacherActivities,
        Section::StudentActivities,
        Section::Materials,
        Section::Evaluation,
        Section::Assessment,
    ];

    /// 接口字段名
    pub fn key(self) -> &'static str {
        match self {
            Section::Objectives => "objectives",
            Section::Content => "content",
            Section::TeacherActivities => "teacherActivities",
            Section::StudentActivities => "studentActivities",
            Section::Materials => "materials",
            Section::Evaluation => "evaluation",
            Section::Assessment => "assessment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Objectives => "Objectives",
            Section::Content => "Content",
            Section::TeacherActivities => "Teacher Activities",
            Section::StudentActivities => "Student Activities",
            Section::Materials => "Materials",
            Section::Evaluation => "Evaluation",
            Section::Assessment => "Assessment",
        }
    }
}

/// 七个分区的内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSections {
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub objectives: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub content: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub teacher_activities: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub student_activities: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub materials: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub evaluation: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub assessment: Vec<String>,
}

impl StructureSections {
    pub fn get(&self, section: Section) -> &Vec<String> {
        match section {
            Section::Objectives => &self.objectives,
            Section::Content => &self.content,
            Section::TeacherActivities => &self.teacher_activities,
            Section::StudentActivities => &self.student_activities,
            Section::Materials => &self.materials,
            Section::Evaluation => &self.evaluation,
            Section::Assessment => &self.assessment,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Objectives => &mut self.objectives,
            Section::Content => &mut self.content,
            Section::TeacherActivities => &mut self.teacher_activities,
            Section::StudentActivities => &mut self.student_activities,
            Section::Materials => &mut self.materials,
            Section::Evaluation => &mut self.evaluation,
            Section::Assessment => &mut self.assessment,
        }
    }
}

/// 教案结构（服务器返回）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonNoteStructure {
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    #[serde(default)]
    pub theme_id: Option<i64>,
    #[serde(default)]
    pub topic_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    #[serde(flatten)]
    pub sections: StructureSections,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_payload_with_null_sections() {
        let json = r#"{
            "id": 3,
            "classId": 1,
            "subjectId": 9,
            "themeId": null,
            "subjectName": "Math",
            "objectives": ["Count to ten"],
            "content": null,
            "teacherActivities": ["Demonstrate"],
            "createdBy": "admin@lesnote.ai",
            "createdAt": "2024-05-01T10:00:00.123"
        }"#;
        let s: LessonNoteStructure = serde_json::from_str(json).unwrap();
        assert_eq!(s.sections.objectives, vec!["Count to ten".to_string()]);
        assert!(s.sections.content.is_empty());
        assert!(s.sections.assessment.is_empty());
        assert_eq!(s.theme_id, None);
        assert_eq!(s.subject_name.as_deref(), Some("Math"));
        assert!(s.created_at.is_some());
    }

    #[test]
    fn section_keys_follow_fixed_order() {
        let keys: Vec<_> = Section::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            vec![
                "objectives",
                "content",
                "teacherActivities",
                "studentActivities",
                "materials",
                "evaluation",
                "assessment"
            ]
        );
    }
}
