//! 级联筛选控制器：班级 → 科目 → 主题 → 课题
//!
//! 修改第 N 级时清空其下所有级别，并按新选中的 ID 加载第 N+1 级选项。
//! 下级在加载完成前处于禁用（而非隐藏）状态；加载失败会记录在该级的
//! `error` 上，由界面在对应字段旁展示。
//!
//! 每一级的请求都带单调递增的序号，只有最新请求的结果会被采用。

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::lesnote::error::ClientError;
use crate::lesnote::taxonomy::api::TaxonomySource;
use crate::lesnote::taxonomy::models::LevelOption;

/// 级联层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Class,
    Subject,
    Theme,
    Topic,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Class, Level::Subject, Level::Theme, Level::Topic];

    fn index(self) -> usize {
        self as usize
    }

    /// 决定本级是否可用的上级（课题挂在科目下，主题可选）
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Class => None,
            Level::Subject => Some(Level::Class),
            Level::Theme | Level::Topic => Some(Level::Subject),
        }
    }

    /// 本级以下的所有级别
    pub fn below(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().filter(move |l| *l > self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Class => "class",
            Level::Subject => "subject",
            Level::Theme => "theme",
            Level::Topic => "topic",
        }
    }

    /// 作为列表过滤条件时的参数名
    pub fn filter_key(self) -> &'static str {
        match self {
            Level::Class => "classId",
            Level::Subject => "subjectId",
            Level::Theme => "themeId",
            Level::Topic => "topicId",
        }
    }
}

/// 某一级的请求参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelQuery {
    Classes,
    Subjects { class_id: i64 },
    Themes { subject_id: i64 },
    Topics { subject_id: i64, theme_id: Option<i64> },
}

impl LevelQuery {
    pub fn level(self) -> Level {
        match self {
            LevelQuery::Classes => Level::Class,
            LevelQuery::Subjects { .. } => Level::Subject,
            LevelQuery::Themes { .. } => Level::Theme,
            LevelQuery::Topics { .. } => Level::Topic,
        }
    }

    /// 调用数据源获取选项
    pub async fn run<S: TaxonomySource + ?Sized>(self, source: &S) -> Result<Vec<LevelOption>, ClientError> {
        Ok(match self {
            LevelQuery::Classes => into_options(source.classes().await?),
            LevelQuery::Subjects { class_id } => into_options(source.subjects_by_class(class_id).await?),
            LevelQuery::Themes { subject_id } => into_options(source.themes_by_subject(subject_id).await?),
            LevelQuery::Topics {
                subject_id,
                theme_id,
            } => into_options(source.topics_by_subject(subject_id, theme_id).await?),
        })
    }
}

fn into_options<T: Into<LevelOption>>(items: Vec<T>) -> Vec<LevelOption> {
    items.into_iter().map(Into::into).collect()
}

/// 单级下拉框状态
#[derive(Debug, Clone, Default)]
pub struct LevelState {
    pub options: Vec<LevelOption>,
    pub selected: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
}

impl LevelState {
    fn reset(&mut self) {
        self.options.clear();
        self.selected = None;
        self.loading = false;
        self.error = None;
    }
}

/// 当前选中的分类组合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub theme_id: Option<i64>,
    pub topic_id: Option<i64>,
}

impl Selection {
    /// 转换为列表过滤条件
    pub fn to_filters(&self) -> BTreeMap<String, String> {
        [
            (Level::Class, self.class_id),
            (Level::Subject, self.subject_id),
            (Level::Theme, self.theme_id),
            (Level::Topic, self.topic_id),
        ]
        .into_iter()
        .filter_map(|(level, id)| id.map(|id| (level.filter_key().to_string(), id.to_string())))
        .collect()
    }
}

/// 一次选项请求的凭据
#[derive(Debug, Clone, Copy)]
pub struct LevelTicket {
    query: LevelQuery,
    seq: u64,
}

impl LevelTicket {
    pub fn query(&self) -> LevelQuery {
        self.query
    }
}

/// 级联筛选控制器
pub struct CascadingFilter<S: TaxonomySource + ?Sized> {
    source: Arc<S>,
    levels: [LevelState; 4],
    seqs: [u64; 4],
}

impl<S: TaxonomySource + ?Sized> CascadingFilter<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            levels: Default::default(),
            seqs: [0; 4],
        }
    }

    pub fn state(&self, level: Level) -> &LevelState {
        &self.levels[level.index()]
    }

    pub fn options(&self, level: Level) -> &[LevelOption] {
        &self.levels[level.index()].options
    }

    pub fn selected(&self, level: Level) -> Option<i64> {
        self.levels[level.index()].selected
    }

    pub fn error(&self, level: Level) -> Option<&str> {
        self.levels[level.index()].error.as_deref()
    }

    pub fn is_loading(&self, level: Level) -> bool {
        self.levels[level.index()].loading
    }

    /// 上级已选中且本级不在加载中时可用
    pub fn is_enabled(&self, level: Level) -> bool {
        let parent_ready = level
            .parent()
            .map_or(true, |p| self.selected(p).is_some());
        parent_ready && !self.is_loading(level)
    }

    pub fn contains(&self, level: Level, id: i64) -> bool {
        self.options(level).iter().any(|o| o.id == id)
    }

    pub fn selection(&self) -> Selection {
        Selection {
            class_id: self.selected(Level::Class),
            subject_id: self.selected(Level::Subject),
            theme_id: self.selected(Level::Theme),
            topic_id: self.selected(Level::Topic),
        }
    }

    /// 根据当前选择计算某一级的请求参数；上级未选中时返回 None
    pub fn query_for(&self, level: Level) -> Option<LevelQuery> {
        match level {
            Level::Class => Some(LevelQuery::Classes),
            Level::Subject => self
                .selected(Level::Class)
                .map(|class_id| LevelQuery::Subjects { class_id }),
            Level::Theme => self
                .selected(Level::Subject)
                .map(|subject_id| LevelQuery::Themes { subject_id }),
            Level::Topic => self.selected(Level::Subject).map(|subject_id| LevelQuery::Topics {
                subject_id,
                theme_id: self.selected(Level::Theme),
            }),
        }
    }

    /// 开始加载某一级：递增序号、标记加载中、清空旧的错误
    pub fn begin_fetch(&mut self, query: LevelQuery) -> LevelTicket {
        let idx = query.level().index();
        self.seqs[idx] += 1;
        let state = &mut self.levels[idx];
        state.loading = true;
        state.error = None;
        LevelTicket {
            query,
            seq: self.seqs[idx],
        }
    }

    /// 写回加载结果；凭据已过期（本级在此期间被重置或重新加载）时丢弃并返回 false
    pub fn apply(&mut self, ticket: LevelTicket, result: Result<Vec<LevelOption>, ClientError>) -> bool {
        let level = ticket.query.level();
        let idx = level.index();
        if ticket.seq != self.seqs[idx] {
            debug!(
                "[Cascade] 丢弃过期的 {:?} 选项响应: seq={}, 最新 seq={}",
                level, ticket.seq, self.seqs[idx]
            );
            return false;
        }
        let state = &mut self.levels[idx];
        state.loading = false;
        match result {
            Ok(options) => {
                debug!("[Cascade] {:?} 选项加载完成，共 {} 个", level, options.len());
                state.options = options;
                state.error = None;
            }
            Err(e) => {
                warn!("[Cascade] {:?} 选项加载失败: {}", level, e);
                state.options.clear();
                state.error = Some(e.user_message());
            }
        }
        true
    }

    async fn load(&mut self, query: LevelQuery) {
        let ticket = self.begin_fetch(query);
        let source = Arc::clone(&self.source);
        let result = query.run(source.as_ref()).await;
        self.apply(ticket, result);
    }

    /// 加载班级选项（页面初始化时调用）
    pub async fn load_classes(&mut self) {
        self.load(LevelQuery::Classes).await;
    }

    /// 选中（或清除）某一级
    ///
    /// 选中的 ID 必须在本级已加载的选项中，否则返回校验错误且状态不变。
    pub async fn select(&mut self, level: Level, id: Option<i64>) -> Result<(), ClientError> {
        if let Some(id) = id {
            if !self.contains(level, id) {
                return Err(ClientError::validation(
                    level.filter_key(),
                    format!("The selected {} is not available.", level.label()),
                ));
            }
        }
        // 选择未变化且下级没有加载失败时无需重新请求；下级失败时重新选中即重试
        let below_failed = level.below().any(|b| self.error(b).is_some());
        if self.selected(level) == id && id.is_some() && !below_failed {
            debug!("[Cascade] {:?} 选择未变化: {:?}", level, id);
            return Ok(());
        }

        info!("[Cascade] 选择 {:?} = {:?}", level, id);
        self.levels[level.index()].selected = id;
        for below in level.below() {
            self.levels[below.index()].reset();
            // 作废下级仍在进行中的请求
            self.seqs[below.index()] += 1;
        }

        let to_load: Vec<LevelQuery> = match level {
            Level::Class => self.query_for(Level::Subject).into_iter().collect(),
            Level::Subject => [Level::Theme, Level::Topic]
                .into_iter()
                .filter_map(|l| self.query_for(l))
                .collect(),
            // 主题可选：清除主题时课题回到按科目过滤
            Level::Theme => self.query_for(Level::Topic).into_iter().collect(),
            Level::Topic => Vec::new(),
        };

        let tickets: Vec<LevelTicket> = to_load.iter().map(|q| self.begin_fetch(*q)).collect();
        let source = Arc::clone(&self.source);
        let results = run_queries(source.as_ref(), &to_load).await;
        for (ticket, result) in tickets.into_iter().zip(results) {
            self.apply(ticket, result);
        }
        Ok(())
    }
}

/// 并发执行同一轮的多个选项请求（选中科目时主题和课题同时加载）
async fn run_queries<S: TaxonomySource + ?Sized>(
    source: &S,
    queries: &[LevelQuery],
) -> Vec<Result<Vec<LevelOption>, ClientError>> {
    match queries {
        [] => Vec::new(),
        [one] => vec![one.run(source).await],
        [a, b] => {
            let (ra, rb) = tokio::join!(a.run(source), b.run(source));
            vec![ra, rb]
        }
        many => {
            let mut results = Vec::with_capacity(many.len());
            for q in many {
                results.push(q.run(source).await);
            }
            results
        }
    }
}
