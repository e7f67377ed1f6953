//! 课程分类 HTTP API 客户端
//!
//! 负责班级 / 科目 / 主题 / 课题的查询和增删改

use async_trait::async_trait;
use tracing::{debug, info};

use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::listing::ListQuery;
use crate::lesnote::taxonomy::models::{Class, Subject, Theme, Topic};
use crate::lesnote::taxonomy::types::{
    clean_names, ClassRequest, SubjectBatchRequest, SubjectRequest, ThemeRequest,
    TopicBatchRequest, TopicRequest,
};
use crate::lesnote::types::Paginated;

/// 级联下拉框每一级的数据来源
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    async fn classes(&self) -> Result<Vec<Class>, ClientError>;

    async fn subjects_by_class(&self, class_id: i64) -> Result<Vec<Subject>, ClientError>;

    async fn themes_by_subject(&self, subject_id: i64) -> Result<Vec<Theme>, ClientError>;

    async fn topics_by_subject(
        &self,
        subject_id: i64,
        theme_id: Option<i64>,
    ) -> Result<Vec<Topic>, ClientError>;
}

/// 课程分类相关的 HTTP API 客户端
#[derive(Clone, Debug)]
pub struct TaxonomyApi {
    http: ApiClient,
}

impl TaxonomyApi {
    /// `http` 应该已经配置好 Bearer token
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    // ========== 班级 ==========

    pub async fn list_classes(&self, query: &ListQuery) -> Result<Paginated<Class>, ClientError> {
        self.http
            .get_json("/Class/paged", &query.to_params(), "班级分页列表")
            .await
    }

    pub async fn create_class(&self, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::validation("name", "Class name is required."));
        }
        info!("[TaxonomyAPI] ➕ 新增班级: {}", name);
        self.http
            .post_unit("/Class", &ClassRequest { name: name.to_string() }, "新增班级")
            .await
    }

    pub async fn update_class(&self, id: i64, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::validation("name", "Class name is required."));
        }
        info!("[TaxonomyAPI] ✏️ 更新班级 {}: {}", id, name);
        self.http
            .put_unit(
                &format!("/Class/{}", id),
                &ClassRequest { name: name.to_string() },
                "更新班级",
            )
            .await
    }

    pub async fn delete_class(&self, id: i64) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] 🗑️ 删除班级 {}", id);
        self.http.delete(&format!("/Class/{}", id), "删除班级").await
    }

    // ========== 科目 ==========

    pub async fn list_subjects(&self, query: &ListQuery) -> Result<Paginated<Subject>, ClientError> {
        self.http
            .get_json("/Subject", &query.to_params(), "科目分页列表")
            .await
    }

    pub async fn get_subject(&self, id: i64) -> Result<Subject, ClientError> {
        self.http
            .get_json(&format!("/Subject/{}", id), &[], "科目详情")
            .await
    }

    pub async fn create_subject(&self, req: &SubjectRequest) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] ➕ 新增科目: {} (classId={})", req.name, req.class_id);
        self.http.post_unit("/Subject", req, "新增科目").await
    }

    /// 批量新增科目，空名称会先被过滤掉
    pub async fn create_subjects_batch(&self, class_id: i64, names: &[String]) -> Result<(), ClientError> {
        let names = clean_names(names);
        if names.is_empty() {
            return Err(ClientError::validation(
                "names",
                "Enter at least one subject name.",
            ));
        }
        info!(
            "[TaxonomyAPI] ➕ 批量新增科目 {} 个 (classId={})",
            names.len(),
            class_id
        );
        self.http
            .post_unit(
                "/Subject/batch",
                &SubjectBatchRequest { class_id, names },
                "批量新增科目",
            )
            .await
    }

    pub async fn update_subject(&self, id: i64, req: &SubjectRequest) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] ✏️ 更新科目 {}: {}", id, req.name);
        self.http
            .put_unit(&format!("/Subject/{}", id), req, "更新科目")
            .await
    }

    pub async fn delete_subject(&self, id: i64) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] 🗑️ 删除科目 {}", id);
        self.http.delete(&format!("/Subject/{}", id), "删除科目").await
    }

    // ========== 主题 ==========

    pub async fn list_themes(&self, query: &ListQuery) -> Result<Paginated<Theme>, ClientError> {
        self.http
            .get_json("/Theme", &query.to_params(), "主题分页列表")
            .await
    }

    pub async fn get_theme(&self, id: i64) -> Result<Theme, ClientError> {
        self.http
            .get_json(&format!("/Theme/{}", id), &[], "主题详情")
            .await
    }

    pub async fn create_theme(&self, req: &ThemeRequest) -> Result<(), ClientError> {
        info!(
            "[TaxonomyAPI] ➕ 新增主题: {} #{} (subjectId={})",
            req.name, req.theme_number, req.subject_id
        );
        self.http.post_unit("/Theme", req, "新增主题").await
    }

    pub async fn update_theme(&self, id: i64, req: &ThemeRequest) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] ✏️ 更新主题 {}: {}", id, req.name);
        self.http
            .put_unit(&format!("/Theme/{}", id), req, "更新主题")
            .await
    }

    pub async fn delete_theme(&self, id: i64) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] 🗑️ 删除主题 {}", id);
        self.http.delete(&format!("/Theme/{}", id), "删除主题").await
    }

    // ========== 课题 ==========

    pub async fn list_topics(&self, query: &ListQuery) -> Result<Paginated<Topic>, ClientError> {
        self.http
            .get_json("/Topic", &query.to_params(), "课题分页列表")
            .await
    }

    pub async fn get_topic(&self, id: i64) -> Result<Topic, ClientError> {
        self.http
            .get_json(&format!("/Topic/{}", id), &[], "课题详情")
            .await
    }

    pub async fn create_topic(&self, req: &TopicRequest) -> Result<(), ClientError> {
        info!(
            "[TaxonomyAPI] ➕ 新增课题: {} (subjectId={}, themeId={:?})",
            req.name, req.subject_id, req.theme_id
        );
        self.http.post_unit("/Topic", req, "新增课题").await
    }

    /// 批量新增课题，空名称会先被过滤掉
    pub async fn create_topics_batch(
        &self,
        subject_id: i64,
        theme_id: Option<i64>,
        names: &[String],
    ) -> Result<(), ClientError> {
        let names = clean_names(names);
        if names.is_empty() {
            return Err(ClientError::validation(
                "names",
                "Enter at least one topic name.",
            ));
        }
        info!(
            "[TaxonomyAPI] ➕ 批量新增课题 {} 个 (subjectId={}, themeId={:?})",
            names.len(),
            subject_id,
            theme_id
        );
        self.http
            .post_unit(
                "/Topic/batch",
                &TopicBatchRequest {
                    subject_id,
                    theme_id,
                    names,
                },
                "批量新增课题",
            )
            .await
    }

    pub async fn update_topic(&self, id: i64, req: &TopicRequest) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] ✏️ 更新课题 {}: {}", id, req.name);
        self.http
            .put_unit(&format!("/Topic/{}", id), req, "更新课题")
            .await
    }

    pub async fn delete_topic(&self, id: i64) -> Result<(), ClientError> {
        info!("[TaxonomyAPI] 🗑️ 删除课题 {}", id);
        self.http.delete(&format!("/Topic/{}", id), "删除课题").await
    }
}

#[async_trait]
impl TaxonomySource for TaxonomyApi {
    async fn classes(&self) -> Result<Vec<Class>, ClientError> {
        let classes: Option<Vec<Class>> = self.http.get_json("/Class", &[], "班级列表").await?;
        let classes = classes.unwrap_or_default();
        debug!("[TaxonomyAPI] 班级共 {} 个", classes.len());
        Ok(classes)
    }

    async fn subjects_by_class(&self, class_id: i64) -> Result<Vec<Subject>, ClientError> {
        let subjects: Option<Vec<Subject>> = self
            .http
            .get_json(&format!("/Subject/by-class/{}", class_id), &[], "按班级查询科目")
            .await?;
        let subjects = subjects.unwrap_or_default();
        debug!(
            "[TaxonomyAPI] 班级 {} 下科目共 {} 个",
            class_id,
            subjects.len()
        );
        Ok(subjects)
    }

    async fn themes_by_subject(&self, subject_id: i64) -> Result<Vec<Theme>, ClientError> {
        let themes: Option<Vec<Theme>> = self
            .http
            .get_json(&format!("/Theme/by-subject/{}", subject_id), &[], "按科目查询主题")
            .await?;
        Ok(themes.unwrap_or_default())
    }

    async fn topics_by_subject(
        &self,
        subject_id: i64,
        theme_id: Option<i64>,
    ) -> Result<Vec<Topic>, ClientError> {
        let query: Vec<(&str, String)> = theme_id
            .map(|id| vec![("themeId", id.to_string())])
            .unwrap_or_default();
        let topics: Option<Vec<Topic>> = self
            .http
            .get_json(
                &format!("/Topic/by-subject/{}", subject_id),
                &query,
                "按科目查询课题",
            )
            .await?;
        Ok(topics.unwrap_or_default())
    }
}
