//! 认证 HTTP API 客户端
//!
//! 注册、登录、邮箱验证、找回密码。所有请求在发出前先做本地校验，
//! 校验失败时请求不会发出。

use tracing::info;

use crate::lesnote::auth::types::{
    validate_email, EmailRequest, GoogleLoginRequest, LoginOutcome, LoginRequest,
    RegisterRequest, ResetPasswordRequest, VerifyRequest,
};
use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::types::MessageResponse;

/// 认证相关的 HTTP API 客户端（使用不带 token 的客户端）
#[derive(Clone, Debug)]
pub struct AuthApi {
    http: ApiClient,
}

impl AuthApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 注册新账号，成功后服务器会向邮箱发送验证码
    pub async fn register(&self, req: &RegisterRequest) -> Result<Option<String>, ClientError> {
        req.validate()?;
        info!("[AuthAPI] 📝 注册账号: {}", req.email);
        let resp: Option<MessageResponse> = self.http.post_json("/register", req, "注册").await?;
        Ok(resp.and_then(|r| r.message))
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginOutcome, ClientError> {
        req.validate()?;
        info!("[AuthAPI] 🔐 正在登录: {}", req.email);
        let outcome: LoginOutcome = self.http.post_json("/login", req, "登录").await?;
        info!("[AuthAPI] ✅ 登录成功，roleId={}", outcome.role_id);
        Ok(outcome)
    }

    pub async fn verify(&self, req: &VerifyRequest) -> Result<Option<String>, ClientError> {
        req.validate()?;
        info!("[AuthAPI] 📧 验证邮箱: {}", req.email);
        let resp: Option<MessageResponse> = self.http.post_json("/verify", req, "邮箱验证").await?;
        Ok(resp.and_then(|r| r.message))
    }

    pub async fn resend_code(&self, email: &str) -> Result<(), ClientError> {
        validate_email(email)?;
        info!("[AuthAPI] 🔁 重新发送验证码: {}", email);
        self.http
            .post_unit(
                "/resend-code",
                &EmailRequest {
                    email: email.trim().to_string(),
                },
                "重发验证码",
            )
            .await
    }

    /// Google 登录：把前端拿到的 ID token 交给后端换取会话
    pub async fn google_login(&self, id_token: &str) -> Result<LoginOutcome, ClientError> {
        if id_token.trim().is_empty() {
            return Err(ClientError::validation(
                "idToken",
                "Google sign-in did not return a credential.",
            ));
        }
        info!("[AuthAPI] 🔐 Google 登录");
        self.http
            .post_json(
                "/auth/google-login",
                &GoogleLoginRequest {
                    id_token: id_token.to_string(),
                },
                "Google 登录",
            )
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        validate_email(email)?;
        info!("[AuthAPI] 🔑 申请重置密码: {}", email);
        self.http
            .post_unit(
                "/forgot-password",
                &EmailRequest {
                    email: email.trim().to_string(),
                },
                "找回密码",
            )
            .await
    }

    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ClientError> {
        req.validate()?;
        info!("[AuthAPI] 🔑 重置密码: {}", req.email);
        self.http.post_unit("/reset-password", req, "重置密码").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesnote::config::ClientConfig;

    // 指向不可达地址：如果请求真的发出，会得到 Network 错误而不是 Validation
    fn api() -> AuthApi {
        let config = ClientConfig::new("http://127.0.0.1:9/api");
        AuthApi::new(ApiClient::anonymous(config).unwrap())
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_network() {
        let api = api();
        let err = api
            .login(&LoginRequest {
                email: "".into(),
                password: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "email", .. }));

        let err = api
            .verify(&VerifyRequest {
                email: "ada@school.ng".into(),
                code: "12".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "code", .. }));

        let err = api.google_login(" ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "idToken", .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let err = api()
            .login(&LoginRequest {
                email: "ada@school.ng".into(),
                password: "longenough".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
