//! 课程分类模块
//!
//! 班级 → 科目 → 主题 → 课题 四级结构的查询、级联筛选和管理

pub mod api;
pub mod cascade;
pub mod models;
pub mod resource;
pub mod types;

pub use api::{TaxonomyApi, TaxonomySource};
pub use cascade::{CascadingFilter, Level, LevelQuery, LevelState, LevelTicket, Selection};
pub use models::{Class, LevelOption, Subject, Theme, Topic};
pub use resource::{SubjectResource, ThemeResource, TopicResource};
pub use types::{SubjectDraft, ThemeDraft, TopicDraft};
