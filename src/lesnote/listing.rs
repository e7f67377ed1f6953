//! 分页列表控制器
//!
//! `{page, pageSize, searchTerm, filters}` 是列表查询的唯一状态来源：
//! 除显式翻页外，任何一项变化都会把页码重置为 1 并重新请求。
//!
//! 每次请求都带一个单调递增的序号，只有最新一次请求的结果会写回状态，
//! 快速翻页时先发后到的旧响应会被丢弃。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::lesnote::error::ClientError;
use crate::lesnote::types::Paginated;

/// 可选的每页条数
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 20, 50];

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 列表查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search_term: String,
    /// 过滤条件，键为接口参数名（如 `classId`）
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: String::new(),
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    /// 转换为 URL 查询参数
    pub fn to_params(&self) -> Vec<(&str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if !self.search_term.trim().is_empty() {
            params.push(("search", self.search_term.trim().to_string()));
        }
        for (key, value) in &self.filters {
            params.push((key.as_str(), value.clone()));
        }
        params
    }

    pub fn filter_id(&self, key: &str) -> Option<i64> {
        self.filters.get(key).and_then(|v| v.parse().ok())
    }
}

/// 分页数据来源
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Paginated<T>, ClientError>;
}

/// 翻页按钮的可用状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub first: bool,
    pub prev: bool,
    pub next: bool,
    pub last: bool,
}

/// 一次列表请求的凭据
#[derive(Debug, Clone)]
pub struct PageTicket {
    seq: u64,
    query: ListQuery,
}

impl PageTicket {
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// 分页列表控制器
pub struct PaginatedList<T> {
    source: Arc<dyn PageSource<T>>,
    query: ListQuery,
    items: Vec<T>,
    total_pages: u32,
    total_count: u64,
    loading: bool,
    error: Option<String>,
    seq: u64,
}

impl<T: Send + 'static> PaginatedList<T> {
    pub fn new(source: Arc<dyn PageSource<T>>) -> Self {
        Self {
            source,
            query: ListQuery::default(),
            items: Vec::new(),
            total_pages: 0,
            total_count: 0,
            loading: false,
            error: None,
            seq: 0,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.query.page_size = page_size.max(1);
        self
    }

    /// 以给定查询作为初始状态（不发请求）
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = ListQuery {
            page: query.page.max(1),
            page_size: query.page_size.max(1),
            ..query
        };
        self
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    pub fn page_size(&self) -> u32 {
        self.query.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 翻页按钮状态：第一页禁用“首页/上一页”，最后一页禁用“下一页/末页”
    pub fn nav_state(&self) -> NavState {
        let at_first = self.query.page <= 1;
        let at_last = self.query.page >= self.total_pages;
        NavState {
            first: !at_first,
            prev: !at_first,
            next: !at_last,
            last: !at_last,
        }
    }

    /// 开始一次请求：递增序号并记录当前查询
    pub fn begin_fetch(&mut self) -> PageTicket {
        self.seq += 1;
        self.loading = true;
        PageTicket {
            seq: self.seq,
            query: self.query.clone(),
        }
    }

    /// 写回请求结果；凭据已过期时丢弃并返回 false
    pub fn apply(&mut self, ticket: PageTicket, result: Result<Paginated<T>, ClientError>) -> bool {
        if ticket.seq != self.seq {
            debug!(
                "[List] 丢弃过期响应: seq={}, 最新 seq={}, page={}",
                ticket.seq, self.seq, ticket.query.page
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    "[List] 第 {} 页加载完成，共 {} 条 / {} 页",
                    ticket.query.page,
                    page.pagination.total_count,
                    page.pagination.total_pages
                );
                self.items = page.items;
                self.total_pages = page.pagination.total_pages;
                self.total_count = page.pagination.total_count;
                self.error = None;
            }
            Err(e) => {
                warn!("[List] 列表加载失败: {}", e);
                self.items.clear();
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// 按当前查询重新请求
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let ticket = self.begin_fetch();
        let source = Arc::clone(&self.source);
        match source.fetch_page(ticket.query()).await {
            Ok(page) => {
                self.apply(ticket, Ok(page));
                Ok(())
            }
            Err(e) => {
                self.apply(ticket, Err(e.clone()));
                Err(e)
            }
        }
    }

    pub async fn set_page_size(&mut self, page_size: u32) -> Result<(), ClientError> {
        info!("[List] 每页条数: {} → {}", self.query.page_size, page_size);
        self.query.page_size = page_size.max(1);
        self.query.page = 1;
        self.refresh().await
    }

    /// 提交搜索（只在显式提交时调用，不做输入防抖）
    pub async fn set_search(&mut self, term: impl Into<String>) -> Result<(), ClientError> {
        self.query.search_term = term.into();
        self.query.page = 1;
        self.refresh().await
    }

    /// 设置或清除一个过滤条件（`None` 或空字符串表示清除）
    pub async fn set_filter(&mut self, key: &str, value: Option<String>) -> Result<(), ClientError> {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => {
                self.query.filters.insert(key.to_string(), v);
            }
            None => {
                self.query.filters.remove(key);
            }
        }
        self.query.page = 1;
        self.refresh().await
    }

    pub async fn clear_filter(&mut self, key: &str) -> Result<(), ClientError> {
        self.set_filter(key, None).await
    }

    /// 一次性替换全部过滤条件（级联筛选变化时使用）
    pub async fn replace_filters(&mut self, filters: BTreeMap<String, String>) -> Result<(), ClientError> {
        self.query.filters = filters;
        self.query.page = 1;
        self.refresh().await
    }

    /// 回到第一页并重新请求
    pub async fn reload_first_page(&mut self) -> Result<(), ClientError> {
        self.query.page = 1;
        self.refresh().await
    }

    /// 跳转到指定页，页码会被限制在 `1..=total_pages`
    pub async fn go_to(&mut self, page: u32) -> Result<(), ClientError> {
        let target = page.clamp(1, self.total_pages.max(1));
        if target == self.query.page {
            return Ok(());
        }
        self.query.page = target;
        self.refresh().await
    }

    pub async fn first(&mut self) -> Result<(), ClientError> {
        if !self.nav_state().first {
            return Ok(());
        }
        self.go_to(1).await
    }

    pub async fn prev(&mut self) -> Result<(), ClientError> {
        if !self.nav_state().prev {
            return Ok(());
        }
        self.go_to(self.query.page - 1).await
    }

    pub async fn next(&mut self) -> Result<(), ClientError> {
        if !self.nav_state().next {
            return Ok(());
        }
        self.go_to(self.query.page + 1).await
    }

    pub async fn last(&mut self) -> Result<(), ClientError> {
        if !self.nav_state().last {
            return Ok(());
        }
        self.go_to(self.total_pages).await
    }
}
