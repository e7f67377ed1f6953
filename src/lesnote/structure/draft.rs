//! 教案结构表单草稿
//!
//! 每个分区至少保留一行输入框（可以为空），提交前去掉空行。

use crate::lesnote::error::ClientError;
use crate::lesnote::structure::models::{LessonNoteStructure, Section, StructureSections};
use crate::lesnote::taxonomy::cascade::{CascadingFilter, Level};
use crate::lesnote::taxonomy::api::TaxonomySource;

/// 级联筛选中已加载的主题 / 课题，用来校验草稿的选择是否属于所选科目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CascadeScope {
    subject_id: Option<i64>,
    theme_ids: Vec<i64>,
    topic_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDraft {
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub theme_id: Option<i64>,
    pub topic_id: Option<i64>,
    sections: StructureSections,
    scope: Option<CascadeScope>,
}

impl Default for StructureDraft {
    fn default() -> Self {
        let mut sections = StructureSections::default();
        for section in Section::ALL {
            sections.get_mut(section).push(String::new());
        }
        Self {
            class_id: None,
            subject_id: None,
            theme_id: None,
            topic_id: None,
            sections,
            scope: None,
        }
    }
}

impl StructureDraft {
    /// 编辑已有结构时使用，空分区补一行空输入框
    ///
    /// 已保存的主题和课题作为初始可选范围，换分类需重新 `apply_selection`。
    pub fn from_structure(structure: &LessonNoteStructure) -> Self {
        let mut sections = structure.sections.clone();
        for section in Section::ALL {
            let rows = sections.get_mut(section);
            if rows.is_empty() {
                rows.push(String::new());
            }
        }
        Self {
            class_id: Some(structure.class_id),
            subject_id: Some(structure.subject_id),
            theme_id: structure.theme_id,
            topic_id: structure.topic_id,
            sections,
            scope: Some(CascadeScope {
                subject_id: Some(structure.subject_id),
                theme_ids: structure.theme_id.into_iter().collect(),
                topic_ids: structure.topic_id.into_iter().collect(),
            }),
        }
    }

    pub fn rows(&self, section: Section) -> &[String] {
        self.sections.get(section)
    }

    pub fn sections(&self) -> &StructureSections {
        &self.sections
    }

    pub fn add_row(&mut self, section: Section) {
        self.sections.get_mut(section).push(String::new());
    }

    /// 删除一行；只剩一行时清空而不删除
    pub fn remove_row(&mut self, section: Section, index: usize) {
        let rows = self.sections.get_mut(section);
        if index >= rows.len() {
            return;
        }
        if rows.len() == 1 {
            rows[0].clear();
        } else {
            rows.remove(index);
        }
    }

    pub fn set_row(&mut self, section: Section, index: usize, text: impl Into<String>) -> Result<(), ClientError> {
        let rows = self.sections.get_mut(section);
        let row = rows.get_mut(index).ok_or_else(|| {
            ClientError::validation(section.key(), format!("Row {} does not exist.", index + 1))
        })?;
        *row = text.into();
        Ok(())
    }

    /// 去掉每行首尾空白并丢弃空行
    pub fn sanitized(&self) -> StructureSections {
        let mut clean = StructureSections::default();
        for section in Section::ALL {
            *clean.get_mut(section) = self
                .sections
                .get(section)
                .iter()
                .map(|row| row.trim())
                .filter(|row| !row.is_empty())
                .map(str::to_string)
                .collect();
        }
        clean
    }

    /// 用清理后的分区替换草稿内容
    pub fn with_sanitized_sections(mut self) -> Self {
        self.sections = self.sanitized();
        self
    }

    /// 从级联筛选同步分类选择，并记录当前可选的主题和课题
    pub fn apply_selection<S: TaxonomySource + ?Sized>(&mut self, cascade: &CascadingFilter<S>) {
        let selection = cascade.selection();
        self.class_id = selection.class_id;
        self.subject_id = selection.subject_id;
        self.theme_id = selection.theme_id;
        self.topic_id = selection.topic_id;
        self.scope = Some(CascadeScope {
            subject_id: selection.subject_id,
            theme_ids: cascade.options(Level::Theme).iter().map(|o| o.id).collect(),
            topic_ids: cascade.options(Level::Topic).iter().map(|o| o.id).collect(),
        });
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.class_id.is_none() {
            return Err(ClientError::validation("classId", "Please select a class."));
        }
        let Some(subject_id) = self.subject_id else {
            return Err(ClientError::validation("subjectId", "Please select a subject."));
        };

        // 没有同步过级联筛选时无法确认主题 / 课题归属
        let Some(scope) = &self.scope else {
            if self.theme_id.is_some() {
                return Err(ClientError::validation(
                    "themeId",
                    "Please select the theme from the subject's list.",
                ));
            }
            if self.topic_id.is_some() {
                return Err(ClientError::validation(
                    "topicId",
                    "Please select the topic from the subject's list.",
                ));
            }
            return Ok(());
        };
        if scope.subject_id != Some(subject_id) {
            return Err(ClientError::validation(
                "subjectId",
                "The selected subject has changed. Please reselect the theme and topic.",
            ));
        }
        if let Some(theme_id) = self.theme_id {
            if !scope.theme_ids.contains(&theme_id) {
                return Err(ClientError::validation(
                    "themeId",
                    "The selected theme does not belong to the selected subject.",
                ));
            }
        }
        if let Some(topic_id) = self.topic_id {
            if !scope.topic_ids.contains(&topic_id) {
                return Err(ClientError::validation(
                    "topicId",
                    "The selected topic does not belong to the selected subject.",
                ));
            }
        }
        Ok(())
    }
}
