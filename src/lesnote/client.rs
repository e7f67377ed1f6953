//! LesNote 客户端入口
//!
//! 组合配置、本地会话存储和各业务 API。带 token 的 HTTP 客户端按需构建，
//! token 变化（登录、换号、登出）后自动重建。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::lesnote::auth::{AuthApi, LoginOutcome, LoginRequest};
use crate::lesnote::chat::{
    ChatApi, ChatHistoryStore, ChatListener, ChatPanel, SessionWatcher,
};
use crate::lesnote::config::ClientConfig;
use crate::lesnote::crud::CrudController;
use crate::lesnote::dashboard::DashboardApi;
use crate::lesnote::db::create_sqlite_pool_with_migration;
use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::listing::{PageSource, PaginatedList};
use crate::lesnote::notes::{LessonNote, NoteSearchSource, NotesApi, SearchScope};
use crate::lesnote::session::{SessionStore, UserProfile};
use crate::lesnote::structure::{StructureApi, StructureResource};
use crate::lesnote::taxonomy::{
    CascadingFilter, SubjectResource, TaxonomyApi, ThemeResource, TopicResource,
};

#[derive(Clone)]
pub struct LesNoteClient {
    config: ClientConfig,
    session: SessionStore,
    anonymous: ApiClient,
    /// 最近一次构建的带 token 客户端及其 token
    bearer: Arc<Mutex<Option<(String, ApiClient)>>>,
}

impl LesNoteClient {
    /// 打开本地数据库（执行迁移）并创建客户端
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let pool = create_sqlite_pool_with_migration(&config.db_url)
            .await
            .with_context(|| format!("打开本地数据库失败: {}", config.db_url))?;
        let anonymous = ApiClient::anonymous(config.clone()).context("创建 HTTP 客户端失败")?;
        info!("[Client] 🚀 客户端已初始化，API: {}", config.api_base_url);
        Ok(Self {
            config,
            session: SessionStore::new(pool),
            anonymous,
            bearer: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 不需要登录的认证接口
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.anonymous.clone())
    }

    pub async fn login(&self, email: &str, password: &str, remember: bool) -> Result<UserProfile, ClientError> {
        let outcome = self
            .auth()
            .login(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        self.start_session(outcome, remember).await
    }

    pub async fn login_with_google(&self, id_token: &str, remember: bool) -> Result<UserProfile, ClientError> {
        let outcome = self.auth().google_login(id_token).await?;
        self.start_session(outcome, remember).await
    }

    async fn start_session(&self, outcome: LoginOutcome, remember: bool) -> Result<UserProfile, ClientError> {
        self.session.login(&outcome, remember).await?;
        *self.bearer.lock().await = None;
        Ok(outcome.profile())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.logout().await?;
        *self.bearer.lock().await = None;
        Ok(())
    }

    /// 当前 token 对应的客户端，没有 token 时返回 `NotAuthenticated`
    async fn authorized(&self) -> Result<ApiClient, ClientError> {
        let token = self.session.token().await?.ok_or(ClientError::NotAuthenticated)?;
        let mut cached = self.bearer.lock().await;
        if let Some((cached_token, client)) = cached.as_ref() {
            if *cached_token == token {
                return Ok(client.clone());
            }
        }
        let client = ApiClient::with_token(self.config.clone(), &token)?;
        *cached = Some((token, client.clone()));
        Ok(client)
    }

    pub async fn taxonomy(&self) -> Result<TaxonomyApi, ClientError> {
        Ok(TaxonomyApi::new(self.authorized().await?))
    }

    pub async fn structures(&self) -> Result<StructureApi, ClientError> {
        Ok(StructureApi::new(self.authorized().await?))
    }

    pub async fn notes(&self) -> Result<NotesApi, ClientError> {
        Ok(NotesApi::new(self.authorized().await?))
    }

    pub async fn dashboard(&self) -> Result<DashboardApi, ClientError> {
        Ok(DashboardApi::new(self.authorized().await?))
    }

    /// 级联筛选（班级 → 科目 → 主题 → 课题）
    pub async fn cascade(&self) -> Result<CascadingFilter<TaxonomyApi>, ClientError> {
        Ok(CascadingFilter::new(Arc::new(self.taxonomy().await?)))
    }

    pub async fn manage_subjects(&self) -> Result<CrudController<SubjectResource>, ClientError> {
        let resource = Arc::new(SubjectResource::new(self.taxonomy().await?));
        Ok(CrudController::from_resource(resource, self.session.role().await?))
    }

    pub async fn manage_themes(&self) -> Result<CrudController<ThemeResource>, ClientError> {
        let resource = Arc::new(ThemeResource::new(self.taxonomy().await?));
        Ok(CrudController::from_resource(resource, self.session.role().await?))
    }

    pub async fn manage_topics(&self) -> Result<CrudController<TopicResource>, ClientError> {
        let resource = Arc::new(TopicResource::new(self.taxonomy().await?));
        Ok(CrudController::from_resource(resource, self.session.role().await?))
    }

    pub async fn manage_structures(&self) -> Result<CrudController<StructureResource>, ClientError> {
        let resource = Arc::new(StructureResource::new(self.structures().await?));
        Ok(CrudController::from_resource(resource, self.session.role().await?))
    }

    /// 教案搜索列表；管理员可以搜索全部用户的教案
    pub async fn note_search(&self, scope: SearchScope) -> Result<PaginatedList<LessonNote>, ClientError> {
        if scope == SearchScope::All && !self.session.role().await?.is_some_and(|r| r.is_admin()) {
            return Err(ClientError::Forbidden("search all lesson notes".to_string()));
        }
        let source: Arc<dyn PageSource<LessonNote>> =
            Arc::new(NoteSearchSource::new(self.notes().await?, scope));
        Ok(PaginatedList::new(source))
    }

    /// 创建聊天面板，会话 ID 由当前 token 推导
    pub async fn chat_panel(&self, listener: Arc<dyn ChatListener>) -> Result<ChatPanel, ClientError> {
        let token = self.session.token().await?.ok_or(ClientError::NotAuthenticated)?;
        let http = self.authorized().await?;
        let store = ChatHistoryStore::new(self.session.clone());
        let session_id = store.resolve_session_id(&token).await?;
        Ok(ChatPanel::with_listener(
            Arc::new(ChatApi::new(http)),
            store,
            session_id,
            listener,
        ))
    }

    /// 面板挂载期间的会话过期轮询
    pub fn watch_session(&self, listener: Arc<dyn ChatListener>) -> SessionWatcher {
        SessionWatcher::spawn(self.session.clone(), listener)
    }
}
