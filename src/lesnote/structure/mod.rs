//! 教案结构模块：七个分区的模板，挂在某个分类节点下

pub mod api;
pub mod draft;
pub mod models;

pub use api::{CreateStructureRequest, StructureApi, StructureResource};
pub use draft::StructureDraft;
pub use models::{LessonNoteStructure, Section, StructureSections};
