//! 教案结构 HTTP API 客户端

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::lesnote::crud::{CrudController, CrudResource};
use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::listing::{ListQuery, PageSource};
use crate::lesnote::structure::draft::StructureDraft;
use crate::lesnote::structure::models::{LessonNoteStructure, StructureSections};
use crate::lesnote::taxonomy::{CascadingFilter, TaxonomySource};
use crate::lesnote::types::Paginated;

/// 新增教案结构请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStructureRequest {
    pub class_id: i64,
    pub subject_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
    #[serde(flatten)]
    pub sections: StructureSections,
}

impl CreateStructureRequest {
    pub fn from_draft(draft: &StructureDraft) -> Result<Self, ClientError> {
        draft.validate()?;
        let (Some(class_id), Some(subject_id)) = (draft.class_id, draft.subject_id) else {
            return Err(ClientError::validation("subjectId", "Please select a subject."));
        };
        Ok(Self {
            class_id,
            subject_id,
            theme_id: draft.theme_id,
            topic_id: draft.topic_id,
            sections: draft.sanitized(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct StructureApi {
    http: ApiClient,
}

impl StructureApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<LessonNoteStructure>, ClientError> {
        self.http
            .get_json("/LessonNoteStructure", &query.to_params(), "教案结构分页列表")
            .await
    }

    pub async fn get(&self, id: i64) -> Result<LessonNoteStructure, ClientError> {
        self.http
            .get_json(&format!("/LessonNoteStructure/{}", id), &[], "教案结构详情")
            .await
    }

    pub async fn create(&self, req: &CreateStructureRequest) -> Result<(), ClientError> {
        info!(
            "[StructureAPI] ➕ 新增教案结构 (classId={}, subjectId={}, themeId={:?}, topicId={:?})",
            req.class_id, req.subject_id, req.theme_id, req.topic_id
        );
        self.http
            .post_unit("/LessonNoteStructure", req, "新增教案结构")
            .await
    }

    /// 编辑只更新七个分区，分类归属不变
    pub async fn update(&self, id: i64, sections: &StructureSections) -> Result<(), ClientError> {
        info!("[StructureAPI] ✏️ 更新教案结构 {}", id);
        self.http
            .put_unit(
                &format!("/LessonNoteStructure/{}", id),
                sections,
                "更新教案结构",
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        info!("[StructureAPI] 🗑️ 删除教案结构 {}", id);
        self.http
            .delete(&format!("/LessonNoteStructure/{}", id), "删除教案结构")
            .await
    }
}

/// 教案结构管理页面的实体描述
#[derive(Clone, Debug)]
pub struct StructureResource {
    api: StructureApi,
}

impl StructureResource {
    pub fn new(api: StructureApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<LessonNoteStructure> for StructureResource {
    async fn fetch_page(
        &self,
        query: &ListQuery,
    ) -> Result<Paginated<LessonNoteStructure>, ClientError> {
        self.api.list(query).await
    }
}

#[async_trait]
impl CrudResource for StructureResource {
    type Item = LessonNoteStructure;
    type Draft = StructureDraft;

    fn name(&self) -> &'static str {
        "lesson note structure"
    }

    fn validate(&self, draft: &StructureDraft) -> Result<(), ClientError> {
        draft.validate()
    }

    fn sanitize(&self, draft: StructureDraft) -> StructureDraft {
        draft.with_sanitized_sections()
    }

    async fn create(&self, draft: &StructureDraft) -> Result<(), ClientError> {
        self.api
            .create(&CreateStructureRequest::from_draft(draft)?)
            .await
    }

    async fn update(&self, id: i64, draft: &StructureDraft) -> Result<(), ClientError> {
        self.api.update(id, &draft.sanitized()).await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete(id).await
    }

    async fn fetch_one(&self, id: i64) -> Result<LessonNoteStructure, ClientError> {
        self.api.get(id).await
    }
}

impl CrudController<StructureResource> {
    /// 打开新增弹窗，分类选择和可选范围取自级联筛选
    pub fn open_add_from<S: TaxonomySource + ?Sized>(&mut self, cascade: &CascadingFilter<S>) {
        self.open_add();
        self.draft_mut().apply_selection(cascade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::config::ClientConfig;
    use crate::lesnote::crud::ModalState;
    use crate::lesnote::session::Role;
    use crate::lesnote::structure::models::Section;
    use crate::lesnote::taxonomy::cascade::tests::FakeTaxonomy;
    use crate::lesnote::taxonomy::Level;
    use std::sync::Arc;

    #[tokio::test]
    async fn add_from_cascade_checks_theme_scope() {
        let http = ApiClient::anonymous(ClientConfig::default()).unwrap();
        let resource = Arc::new(StructureResource::new(StructureApi::new(http)));
        let mut ctl = CrudController::from_resource(Arc::clone(&resource), Some(Role::Staff));

        let mut cascade = CascadingFilter::new(Arc::new(FakeTaxonomy::default()));
        cascade.load_classes().await;
        cascade.select(Level::Class, Some(1)).await.unwrap();
        cascade.select(Level::Subject, Some(9)).await.unwrap();
        cascade.select(Level::Theme, Some(30)).await.unwrap();

        ctl.open_add_from(&cascade);
        assert_eq!(ctl.modal(), ModalState::Add);
        assert_eq!(ctl.draft().theme_id, Some(30));
        assert!(resource.validate(ctl.draft()).is_ok());

        ctl.draft_mut().theme_id = Some(777);
        assert!(matches!(
            resource.validate(ctl.draft()),
            Err(ClientError::Validation { field: "themeId", .. })
        ));

        // 普通新增没有范围，不能带主题
        ctl.open_add();
        ctl.draft_mut().class_id = Some(1);
        ctl.draft_mut().subject_id = Some(9);
        ctl.draft_mut().theme_id = Some(30);
        assert!(resource.validate(ctl.draft()).is_err());
    }

    #[test]
    fn create_payload_is_flat_and_clean() {
        let mut draft = StructureDraft::default();
        draft.class_id = Some(1);
        draft.subject_id = Some(9);
        draft.set_row(Section::Objectives, 0, " Objective A ").unwrap();
        draft.add_row(Section::Objectives);

        let req = CreateStructureRequest::from_draft(&draft).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["classId"], 1);
        assert_eq!(json["objectives"], serde_json::json!(["Objective A"]));
        assert_eq!(json["assessment"], serde_json::json!([]));
        assert!(json.get("themeId").is_none());
    }

    #[test]
    fn create_payload_requires_subject() {
        let mut draft = StructureDraft::default();
        draft.class_id = Some(1);
        assert!(CreateStructureRequest::from_draft(&draft).is_err());
    }
}
