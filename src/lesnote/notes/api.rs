//! 教案搜索 HTTP API 客户端

use async_trait::async_trait;
use tracing::debug;

use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::listing::{ListQuery, PageSource};
use crate::lesnote::notes::models::{LessonNote, SearchRequest};
use crate::lesnote::types::Paginated;

#[derive(Clone, Debug)]
pub struct NotesApi {
    http: ApiClient,
}

impl NotesApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 搜索当前用户自己的教案
    pub async fn search(&self, req: &SearchRequest) -> Result<Paginated<LessonNote>, ClientError> {
        debug!("[NotesAPI] 搜索教案: {:?}", req);
        self.http
            .post_json("/LessonNotes/search", req, "搜索教案")
            .await
    }

    /// 搜索全部用户的教案（管理员视图）
    pub async fn search_all(&self, req: &SearchRequest) -> Result<Paginated<LessonNote>, ClientError> {
        debug!("[NotesAPI] 搜索全部教案: {:?}", req);
        self.http
            .post_json("/LessonNotes/search-all", req, "搜索全部教案")
            .await
    }
}

/// 搜索范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    Own,
    All,
}

/// 让分页列表控制器驱动教案搜索
#[derive(Clone, Debug)]
pub struct NoteSearchSource {
    api: NotesApi,
    scope: SearchScope,
}

impl NoteSearchSource {
    pub fn new(api: NotesApi, scope: SearchScope) -> Self {
        Self { api, scope }
    }
}

#[async_trait]
impl PageSource<LessonNote> for NoteSearchSource {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<LessonNote>, ClientError> {
        let req = SearchRequest::from(query);
        match self.scope {
            SearchScope::Own => self.api.search(&req).await,
            SearchScope::All => self.api.search_all(&req).await,
        }
    }
}
