//! 科目 / 主题 / 课题管理页面的实体描述

use async_trait::async_trait;

use crate::lesnote::crud::CrudResource;
use crate::lesnote::error::ClientError;
use crate::lesnote::listing::{ListQuery, PageSource};
use crate::lesnote::taxonomy::api::TaxonomyApi;
use crate::lesnote::taxonomy::models::{Subject, Theme, Topic};
use crate::lesnote::taxonomy::types::{
    clean_names, SubjectDraft, SubjectRequest, ThemeDraft, ThemeRequest, TopicDraft, TopicRequest,
};
use crate::lesnote::types::Paginated;

fn missing(field: &'static str) -> ClientError {
    ClientError::validation(field, format!("{} is required.", field))
}

fn first_name(names: &[String], field: &'static str) -> Result<String, ClientError> {
    names.first().cloned().ok_or_else(|| missing(field))
}

impl From<&Subject> for SubjectDraft {
    fn from(s: &Subject) -> Self {
        Self {
            class_id: Some(s.class_id),
            names: vec![s.name.clone()],
        }
    }
}

impl From<&Theme> for ThemeDraft {
    fn from(t: &Theme) -> Self {
        Self {
            subject_id: Some(t.subject_id),
            name: t.name.clone(),
            theme_number: Some(t.theme_number),
        }
    }
}

impl From<&Topic> for TopicDraft {
    fn from(t: &Topic) -> Self {
        Self {
            subject_id: Some(t.subject_id),
            theme_id: t.theme_id,
            names: vec![t.name.clone()],
        }
    }
}

/// 科目
#[derive(Clone, Debug)]
pub struct SubjectResource {
    api: TaxonomyApi,
}

impl SubjectResource {
    pub fn new(api: TaxonomyApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<Subject> for SubjectResource {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<Subject>, ClientError> {
        self.api.list_subjects(query).await
    }
}

#[async_trait]
impl CrudResource for SubjectResource {
    type Item = Subject;
    type Draft = SubjectDraft;

    fn name(&self) -> &'static str {
        "subject"
    }

    fn validate(&self, draft: &SubjectDraft) -> Result<(), ClientError> {
        draft.validate()
    }

    fn sanitize(&self, draft: SubjectDraft) -> SubjectDraft {
        SubjectDraft {
            names: clean_names(&draft.names),
            ..draft
        }
    }

    /// 只填一个名称时走单条接口，多个名称走批量接口
    async fn create(&self, draft: &SubjectDraft) -> Result<(), ClientError> {
        let class_id = draft.class_id.ok_or_else(|| missing("classId"))?;
        match draft.names.as_slice() {
            [name] => {
                self.api
                    .create_subject(&SubjectRequest {
                        name: name.clone(),
                        class_id,
                    })
                    .await
            }
            names => self.api.create_subjects_batch(class_id, names).await,
        }
    }

    async fn update(&self, id: i64, draft: &SubjectDraft) -> Result<(), ClientError> {
        let req = SubjectRequest {
            name: first_name(&draft.names, "names")?,
            class_id: draft.class_id.ok_or_else(|| missing("classId"))?,
        };
        self.api.update_subject(id, &req).await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete_subject(id).await
    }

    async fn fetch_one(&self, id: i64) -> Result<Subject, ClientError> {
        self.api.get_subject(id).await
    }
}

/// 主题
#[derive(Clone, Debug)]
pub struct ThemeResource {
    api: TaxonomyApi,
}

impl ThemeResource {
    pub fn new(api: TaxonomyApi) -> Self {
        Self { api }
    }

    fn request(draft: &ThemeDraft) -> Result<ThemeRequest, ClientError> {
        Ok(ThemeRequest {
            name: draft.name.clone(),
            theme_number: draft.theme_number.ok_or_else(|| missing("themeNumber"))?,
            subject_id: draft.subject_id.ok_or_else(|| missing("subjectId"))?,
        })
    }
}

#[async_trait]
impl PageSource<Theme> for ThemeResource {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<Theme>, ClientError> {
        self.api.list_themes(query).await
    }
}

#[async_trait]
impl CrudResource for ThemeResource {
    type Item = Theme;
    type Draft = ThemeDraft;

    fn name(&self) -> &'static str {
        "theme"
    }

    fn validate(&self, draft: &ThemeDraft) -> Result<(), ClientError> {
        draft.validate()
    }

    fn sanitize(&self, draft: ThemeDraft) -> ThemeDraft {
        ThemeDraft {
            name: draft.name.trim().to_string(),
            ..draft
        }
    }

    async fn create(&self, draft: &ThemeDraft) -> Result<(), ClientError> {
        self.api.create_theme(&Self::request(draft)?).await
    }

    async fn update(&self, id: i64, draft: &ThemeDraft) -> Result<(), ClientError> {
        self.api.update_theme(id, &Self::request(draft)?).await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete_theme(id).await
    }

    async fn fetch_one(&self, id: i64) -> Result<Theme, ClientError> {
        self.api.get_theme(id).await
    }
}

/// 课题
#[derive(Clone, Debug)]
pub struct TopicResource {
    api: TaxonomyApi,
}

impl TopicResource {
    pub fn new(api: TaxonomyApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<Topic> for TopicResource {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<Topic>, ClientError> {
        self.api.list_topics(query).await
    }
}

#[async_trait]
impl CrudResource for TopicResource {
    type Item = Topic;
    type Draft = TopicDraft;

    fn name(&self) -> &'static str {
        "topic"
    }

    fn validate(&self, draft: &TopicDraft) -> Result<(), ClientError> {
        draft.validate()
    }

    fn sanitize(&self, draft: TopicDraft) -> TopicDraft {
        TopicDraft {
            names: clean_names(&draft.names),
            ..draft
        }
    }

    async fn create(&self, draft: &TopicDraft) -> Result<(), ClientError> {
        let subject_id = draft.subject_id.ok_or_else(|| missing("subjectId"))?;
        match draft.names.as_slice() {
            [name] => {
                self.api
                    .create_topic(&TopicRequest {
                        name: name.clone(),
                        subject_id,
                        theme_id: draft.theme_id,
                    })
                    .await
            }
            names => {
                self.api
                    .create_topics_batch(subject_id, draft.theme_id, names)
                    .await
            }
        }
    }

    async fn update(&self, id: i64, draft: &TopicDraft) -> Result<(), ClientError> {
        let req = TopicRequest {
            name: first_name(&draft.names, "names")?,
            subject_id: draft.subject_id.ok_or_else(|| missing("subjectId"))?,
            theme_id: draft.theme_id,
        };
        self.api.update_topic(id, &req).await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete_topic(id).await
    }

    async fn fetch_one(&self, id: i64) -> Result<Topic, ClientError> {
        self.api.get_topic(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::config::ClientConfig;
    use crate::lesnote::http::ApiClient;

    fn offline_api() -> TaxonomyApi {
        let http = ApiClient::anonymous(ClientConfig::new("http://127.0.0.1:9/api")).unwrap();
        TaxonomyApi::new(http)
    }

    #[test]
    fn sanitize_drops_blank_name_rows() {
        let res = SubjectResource::new(offline_api());
        let draft = SubjectDraft {
            class_id: Some(1),
            names: vec!["".into(), " Math ".into(), " ".into(), "English".into()],
        };
        let clean = res.sanitize(draft);
        assert_eq!(clean.names, vec!["Math".to_string(), "English".to_string()]);
        assert_eq!(clean.class_id, Some(1));
    }

    #[test]
    fn edit_draft_is_built_from_item() {
        let topic = Topic {
            id: 4,
            name: "Fractions".into(),
            theme_id: Some(30),
            subject_id: 9,
        };
        let draft = TopicDraft::from(&topic);
        assert_eq!(draft.names, vec!["Fractions".to_string()]);
        assert_eq!((draft.subject_id, draft.theme_id), (Some(9), Some(30)));
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_before_sending() {
        let res = TopicResource::new(offline_api());
        let draft = TopicDraft {
            subject_id: Some(9),
            theme_id: None,
            names: Vec::new(),
        };
        let err = res.create(&draft).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "names", .. }));
    }
}
