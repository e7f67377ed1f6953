//! 教案搜索与导出

pub mod api;
pub mod export;
pub mod models;

pub use api::{NoteSearchSource, NotesApi, SearchScope};
pub use export::{ExportFormat, ExportedFile, NoteExporter, SnapshotRenderer};
pub use models::{LessonNote, SearchRequest};
