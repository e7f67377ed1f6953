//! 会话模块
//!
//! token、用户信息、主题等本地状态的唯一入口

pub mod dao;
pub mod models;
pub mod service;

pub use models::{keys, Persistence, Role, Theme, UserProfile};
pub use service::SessionStore;
