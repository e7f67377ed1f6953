//! 认证模块
//!
//! 邮箱密码 / Google 登录、邮箱验证、找回密码

pub mod api;
pub mod jwt;
pub mod types;

pub use api::AuthApi;
pub use types::{
    LoginOutcome, LoginRequest, RegisterRequest, ResetPasswordRequest, VerifyRequest,
};
