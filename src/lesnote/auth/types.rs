//! 认证 API DTO（请求和响应结构体）及本地校验

use serde::{Deserialize, Serialize};

use crate::lesnote::error::ClientError;
use crate::lesnote::session::models::UserProfile;

/// 密码最小长度
pub const MIN_PASSWORD_LEN: usize = 8;

/// 邮箱验证码长度
pub const VERIFICATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.first_name.trim().is_empty() {
            return Err(ClientError::validation("firstName", "First name is required."));
        }
        if self.last_name.trim().is_empty() {
            return Err(ClientError::validation("lastName", "Last name is required."));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_passwords_match(&self.password, &self.confirm_password)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ClientError::validation("password", "Password is required."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

impl VerifyRequest {
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_email(&self.email)?;
        validate_code(&self.code)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_email(&self.email)?;
        if self.token.trim().is_empty() {
            return Err(ClientError::validation(
                "token",
                "The reset link is invalid or has expired.",
            ));
        }
        validate_password(&self.new_password)?;
        validate_passwords_match(&self.new_password, &self.confirm_password)
    }
}

/// 登录成功响应（邮箱密码登录与 Google 登录共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    #[serde(alias = "accessToken")]
    pub token: String,
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

impl LoginOutcome {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role_id: self.role_id,
            plan: self.plan.clone(),
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), ClientError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::validation("email", "Email is required."));
    }
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'));
    if !valid {
        return Err(ClientError::validation(
            "email",
            "Please enter a valid email address.",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(
            "password",
            format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

pub fn validate_passwords_match(password: &str, confirm: &str) -> Result<(), ClientError> {
    if password != confirm {
        return Err(ClientError::validation(
            "confirmPassword",
            "Passwords do not match.",
        ));
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Result<(), ClientError> {
    let code = code.trim();
    if code.len() != VERIFICATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClientError::validation(
            "code",
            format!("Enter the {}-digit code sent to your email.", VERIFICATION_CODE_LEN),
        ));
    }
    Ok(())
}
