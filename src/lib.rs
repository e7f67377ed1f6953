pub mod lesnote;

// 重新导出常用类型，方便外部使用
pub use lesnote::{
    client::LesNoteClient,
    config::ClientConfig,
    crud::{CrudController, CrudResource, ModalState},
    error::ClientError,
    listing::{ListQuery, PageSource, PaginatedList},
    session::{Role, SessionStore, UserProfile},
    taxonomy::{CascadingFilter, Level, Selection},
};
