//! 通用增删改查控制器
//!
//! 科目、主题、课题和教案结构的管理页面行为完全一致：
//! 分页列表 + 新增/编辑/查看弹窗 + 仅管理员可删除。
//! 各实体只需实现 [`CrudResource`] 描述自身的校验和接口调用。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::lesnote::error::ClientError;
use crate::lesnote::listing::{PageSource, PaginatedList};
use crate::lesnote::session::Role;

/// 实体描述
#[async_trait]
pub trait CrudResource: Send + Sync {
    type Item: Send + Sync + 'static;
    type Draft: Clone + Default + Send + Sync;

    /// 日志和提示中使用的实体名
    fn name(&self) -> &'static str;

    fn validate(&self, draft: &Self::Draft) -> Result<(), ClientError>;

    /// 提交前清理草稿（去空白、去空行）
    fn sanitize(&self, draft: Self::Draft) -> Self::Draft;

    async fn create(&self, draft: &Self::Draft) -> Result<(), ClientError>;

    async fn update(&self, id: i64, draft: &Self::Draft) -> Result<(), ClientError>;

    async fn delete(&self, id: i64) -> Result<(), ClientError>;

    async fn fetch_one(&self, id: i64) -> Result<Self::Item, ClientError>;
}

/// 弹窗状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Add,
    Edit(i64),
    View(i64),
}

/// 增删改查控制器
pub struct CrudController<R: CrudResource> {
    resource: Arc<R>,
    list: PaginatedList<R::Item>,
    role: Option<Role>,
    modal: ModalState,
    draft: R::Draft,
    detail: Option<R::Item>,
    inline_error: Option<String>,
    pending_delete: Option<i64>,
    submitting: bool,
}

impl<R: CrudResource> CrudController<R> {
    pub fn new(resource: Arc<R>, pages: Arc<dyn PageSource<R::Item>>, role: Option<Role>) -> Self {
        Self {
            resource,
            list: PaginatedList::new(pages),
            role,
            modal: ModalState::Closed,
            draft: R::Draft::default(),
            detail: None,
            inline_error: None,
            pending_delete: None,
            submitting: false,
        }
    }

    /// 实体本身同时提供分页数据时使用
    pub fn from_resource(resource: Arc<R>, role: Option<Role>) -> Self
    where
        R: PageSource<R::Item> + 'static,
    {
        let pages: Arc<dyn PageSource<R::Item>> = resource.clone();
        Self::new(resource, pages, role)
    }

    pub fn list(&self) -> &PaginatedList<R::Item> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PaginatedList<R::Item> {
        &mut self.list
    }

    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    pub fn detail(&self) -> Option<&R::Item> {
        self.detail.as_ref()
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// 删除按钮只对管理员显示
    pub fn can_delete(&self) -> bool {
        self.role.is_some_and(Role::is_admin)
    }

    pub fn open_add(&mut self) {
        self.modal = ModalState::Add;
        self.draft = R::Draft::default();
        self.detail = None;
        self.inline_error = None;
    }

    pub fn open_edit(&mut self, id: i64, draft: R::Draft) {
        self.modal = ModalState::Edit(id);
        self.draft = draft;
        self.detail = None;
        self.inline_error = None;
    }

    /// 打开查看弹窗并加载详情
    pub async fn open_view(&mut self, id: i64) -> Result<(), ClientError> {
        self.modal = ModalState::View(id);
        self.detail = None;
        self.inline_error = None;
        match self.resource.fetch_one(id).await {
            Ok(item) => {
                self.detail = Some(item);
                Ok(())
            }
            Err(e) => {
                warn!("[Crud] 加载{}详情失败 id={}: {}", self.resource.name(), id, e);
                self.inline_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        self.modal = ModalState::Closed;
        self.draft = R::Draft::default();
        self.detail = None;
        self.inline_error = None;
    }

    /// 提交新增或编辑弹窗
    ///
    /// 失败时弹窗保持打开，错误写入 `inline_error`。
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let mode = self.modal;
        if !matches!(mode, ModalState::Add | ModalState::Edit(_)) {
            return Err(ClientError::validation("modal", "There is nothing to submit."));
        }
        if self.submitting {
            debug!("[Crud] 正在提交，忽略重复提交");
            return Ok(());
        }

        if let Err(e) = self.resource.validate(&self.draft) {
            self.inline_error = Some(e.user_message());
            return Err(e);
        }
        let clean = self.resource.sanitize(self.draft.clone());

        self.submitting = true;
        self.inline_error = None;
        let result = match mode {
            ModalState::Edit(id) => self.resource.update(id, &clean).await,
            _ => self.resource.create(&clean).await,
        };
        self.submitting = false;

        if let Err(e) = result {
            warn!("[Crud] 保存{}失败: {}", self.resource.name(), e);
            self.inline_error = Some(e.user_message());
            return Err(e);
        }

        match mode {
            ModalState::Edit(id) => {
                info!("[Crud] ✅ {} {} 已更新", self.resource.name(), id);
                self.close();
                self.list.refresh().await
            }
            _ => {
                info!("[Crud] ✅ 已新增{}", self.resource.name());
                self.close();
                self.list.reload_first_page().await
            }
        }
    }

    /// 点击删除：非管理员直接拒绝，否则等待二次确认
    pub fn request_delete(&mut self, id: i64) -> Result<(), ClientError> {
        if !self.can_delete() {
            warn!("[Crud] 非管理员尝试删除{} id={}", self.resource.name(), id);
            return Err(ClientError::Forbidden("delete records".to_string()));
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// 执行已确认的删除
    ///
    /// 删掉的是非首页的最后一条时回退一页，否则刷新当前页。
    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        info!("[Crud] 🗑️ 删除{} id={}", self.resource.name(), id);
        self.resource.delete(id).await?;

        let page = self.list.page();
        if self.list.items().len() == 1 && page > 1 {
            debug!("[Crud] 当前页已空，回退到第 {} 页", page - 1);
            self.list.go_to(page - 1).await
        } else {
            self.list.refresh().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::listing::ListQuery;
    use crate::lesnote::types::Paginated;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: String,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct RowDraft {
        name: String,
    }

    struct FakeRows {
        rows: Mutex<Vec<Row>>,
        next_id: Mutex<i64>,
        creates: Mutex<u32>,
        reject_saves: bool,
    }

    impl FakeRows {
        fn with_rows(n: i64) -> Arc<Self> {
            Self::build(n, false)
        }

        fn build(n: i64, reject_saves: bool) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(
                    (1..=n)
                        .map(|id| Row {
                            id,
                            name: format!("row {}", id),
                        })
                        .collect(),
                ),
                next_id: Mutex::new(n + 1),
                creates: Mutex::new(0),
                reject_saves,
            })
        }
    }

    #[async_trait]
    impl PageSource<Row> for FakeRows {
        async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<Row>, ClientError> {
            let rows = self.rows.lock().await;
            let size = query.page_size as usize;
            let total_pages = rows.len().div_ceil(size) as u32;
            let items = rows
                .iter()
                .skip((query.page as usize - 1) * size)
                .take(size)
                .cloned()
                .collect();
            Ok(Paginated::new(items, total_pages, rows.len() as u64))
        }
    }

    #[async_trait]
    impl CrudResource for FakeRows {
        type Item = Row;
        type Draft = RowDraft;

        fn name(&self) -> &'static str {
            "row"
        }

        fn validate(&self, draft: &RowDraft) -> Result<(), ClientError> {
            if draft.name.trim().is_empty() {
                return Err(ClientError::validation("name", "Name is required."));
            }
            Ok(())
        }

        fn sanitize(&self, draft: RowDraft) -> RowDraft {
            RowDraft {
                name: draft.name.trim().to_string(),
            }
        }

        async fn create(&self, draft: &RowDraft) -> Result<(), ClientError> {
            *self.creates.lock().await += 1;
            if self.reject_saves {
                return Err(ClientError::from_status(
                    reqwest::StatusCode::CONFLICT,
                    br#"{"message":"Row already exists"}"#,
                ));
            }
            let mut next = self.next_id.lock().await;
            self.rows.lock().await.push(Row {
                id: *next,
                name: draft.name.clone(),
            });
            *next += 1;
            Ok(())
        }

        async fn update(&self, id: i64, draft: &RowDraft) -> Result<(), ClientError> {
            let mut rows = self.rows.lock().await;
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| ClientError::from_status(reqwest::StatusCode::NOT_FOUND, b""))?;
            row.name = draft.name.clone();
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), ClientError> {
            self.rows.lock().await.retain(|r| r.id != id);
            Ok(())
        }

        async fn fetch_one(&self, id: i64) -> Result<Row, ClientError> {
            self.rows
                .lock()
                .await
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ClientError::from_status(reqwest::StatusCode::NOT_FOUND, b"Not found"))
        }
    }

    async fn controller(rows: i64, role: Option<Role>) -> (Arc<FakeRows>, CrudController<FakeRows>) {
        crate::lesnote::init_test_logging();
        let source = FakeRows::with_rows(rows);
        let mut ctl = CrudController::from_resource(Arc::clone(&source), role);
        ctl.list_mut().set_page_size(5).await.unwrap();
        (source, ctl)
    }

    #[tokio::test]
    async fn successful_add_resets_draft_and_reloads_first_page() {
        let (source, mut ctl) = controller(12, Some(Role::Staff)).await;
        ctl.list_mut().go_to(2).await.unwrap();

        ctl.open_add();
        ctl.draft_mut().name = "  Geometry ".into();
        ctl.submit().await.unwrap();

        assert_eq!(ctl.modal(), ModalState::Closed);
        assert_eq!(ctl.draft(), &RowDraft::default());
        assert_eq!(ctl.list().page(), 1);
        assert_eq!(ctl.list().total_count(), 13);
        let rows = source.rows.lock().await;
        assert_eq!(rows.last().map(|r| r.name.as_str()), Some("Geometry"));
    }

    #[tokio::test]
    async fn invalid_draft_stays_open_without_request() {
        let (source, mut ctl) = controller(3, Some(Role::Admin)).await;
        ctl.open_add();
        ctl.draft_mut().name = "   ".into();

        assert!(ctl.submit().await.is_err());
        assert_eq!(ctl.modal(), ModalState::Add);
        assert_eq!(ctl.inline_error(), Some("Name is required."));
        assert_eq!(*source.creates.lock().await, 0);
    }

    #[tokio::test]
    async fn server_rejection_is_shown_inline() {
        let source = FakeRows::build(2, true);
        let mut ctl = CrudController::from_resource(source, Some(Role::Admin));
        ctl.open_add();
        ctl.draft_mut().name = "Duplicate".into();

        assert!(ctl.submit().await.is_err());
        assert_eq!(ctl.modal(), ModalState::Add);
        assert_eq!(ctl.inline_error(), Some("Row already exists"));
        assert_eq!(ctl.draft().name, "Duplicate");
    }

    #[tokio::test]
    async fn edit_refreshes_current_page() {
        let (_, mut ctl) = controller(12, Some(Role::Staff)).await;
        ctl.list_mut().go_to(2).await.unwrap();

        ctl.open_edit(7, RowDraft { name: "renamed".into() });
        ctl.submit().await.unwrap();

        assert_eq!(ctl.modal(), ModalState::Closed);
        assert_eq!(ctl.list().page(), 2);
        assert_eq!(ctl.list().items()[1].name, "renamed");
    }

    #[tokio::test]
    async fn view_loads_detail() {
        let (_, mut ctl) = controller(3, None).await;
        ctl.open_view(2).await.unwrap();
        assert_eq!(ctl.modal(), ModalState::View(2));
        assert_eq!(ctl.detail().map(|r| r.name.as_str()), Some("row 2"));

        assert!(ctl.open_view(99).await.is_err());
        assert_eq!(ctl.inline_error(), Some("Not found"));
        ctl.close();
        assert!(ctl.detail().is_none());
        assert!(ctl.inline_error().is_none());
    }

    #[tokio::test]
    async fn only_admins_can_delete() {
        let (source, mut ctl) = controller(3, Some(Role::Staff)).await;
        let err = ctl.request_delete(1).unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
        assert_eq!(err.user_message(), "Only administrators can delete records.");
        assert!(ctl.pending_delete().is_none());
        assert_eq!(source.rows.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn deleting_last_row_on_page_steps_back() {
        let (source, mut ctl) = controller(11, Some(Role::Admin)).await;
        ctl.list_mut().go_to(3).await.unwrap();
        assert_eq!(ctl.list().items().len(), 1);

        ctl.request_delete(11).unwrap();
        assert_eq!(ctl.pending_delete(), Some(11));
        ctl.confirm_delete().await.unwrap();

        assert_eq!(ctl.list().page(), 2);
        assert_eq!(ctl.list().items().len(), 5);
        assert_eq!(source.rows.lock().await.len(), 10);
    }

    #[tokio::test]
    async fn deleting_non_last_row_keeps_page() {
        let (source, mut ctl) = controller(12, Some(Role::Admin)).await;
        ctl.list_mut().go_to(2).await.unwrap();
        assert_eq!(ctl.list().items().len(), 5);

        ctl.request_delete(7).unwrap();
        ctl.confirm_delete().await.unwrap();

        assert_eq!(ctl.list().page(), 2);
        let ids: Vec<i64> = ctl.list().items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 8, 9, 10, 11]);
        assert_eq!(ctl.list().total_count(), 11);
        assert_eq!(source.rows.lock().await.len(), 11);
    }

    #[tokio::test]
    async fn cancelled_delete_does_nothing() {
        let (source, mut ctl) = controller(4, Some(Role::Admin)).await;
        ctl.request_delete(2).unwrap();
        ctl.cancel_delete();
        ctl.confirm_delete().await.unwrap();
        assert_eq!(source.rows.lock().await.len(), 4);
    }
}
