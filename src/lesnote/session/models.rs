//! 会话本地模型定义

use serde::{Deserialize, Serialize};

/// 本地存储使用的键名
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const EMAIL: &str = "email";
    pub const USER: &str = "user";
    pub const THEME: &str = "theme";
    pub const AI_CHAT_MESSAGES: &str = "ai_chat_messages";
    pub const AI_CHAT_SESSION_ID: &str = "ai_chat_session_id";
    pub const LAST_LOGGED_IN_USER: &str = "last_logged_in_user";
}

/// 存储位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// 持久化到 SQLite（对应浏览器 localStorage，"记住我"）
    Local,
    /// 仅保存在进程内存中（对应浏览器 sessionStorage）
    Session,
}

/// 用户角色：1=管理员, 2=员工, 3=普通用户
///
/// 只用于控制界面可见性，服务器仍需独立鉴权。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Staff,
    User,
}

impl Role {
    pub fn from_id(role_id: i32) -> Option<Self> {
        match role_id {
            1 => Some(Self::Admin),
            2 => Some(Self::Staff),
            3 => Some(Self::User),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Self::Admin => 1,
            Self::Staff => 2,
            Self::User => 3,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

/// 当前登录用户信息（存储在 `user` 键下）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role_id: i32,
    #[serde(default)]
    pub plan: Option<String>,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }
}

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }
}
