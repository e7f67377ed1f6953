//! 客户端错误类型
//!
//! 分三类处理：
//! - 网络层失败（请求发不出去 / 连接断开）→ 通用的连接提示
//! - 非 2xx 响应 → 尽量从 body 中解析 `message` 字段
//! - 本地校验失败 → 请求不会发出，直接在表单中提示

use reqwest::StatusCode;
use thiserror::Error;

/// 网络失败时展示给用户的提示
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection and try again.";

/// 服务器没有给出可读错误信息时的兜底提示
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// 传输层失败（DNS、TLS、超时、连接被重置等）
    #[error("网络请求失败: {0}")]
    Network(String),

    /// 服务器返回了非 2xx 状态码
    #[error("HTTP 错误 {status}: {message}")]
    Http { status: u16, message: String },

    /// 本地表单校验失败，请求没有发出
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// 当前角色不允许执行该操作（仅客户端判断，服务器仍会校验）
    #[error("无权限: {0}")]
    Forbidden(String),

    /// 当前没有登录会话
    #[error("未登录或会话已过期")]
    NotAuthenticated,

    /// 响应 body 无法解析
    #[error("反序列化响应失败: {0}")]
    Decode(String),

    /// 本地存储读写失败
    #[error("本地存储失败: {0}")]
    Storage(String),

    /// 导出失败（单次尝试，不重试）
    #[error("导出失败: {0}")]
    ExportFailed(String),
}

impl ClientError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// 根据 HTTP 状态码和响应 body 构造错误
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: extract_error_message(body)
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 表单/弹窗内联显示的文字
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => CONNECTION_ERROR_MESSAGE.to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::Validation { message, .. } => message.clone(),
            Self::Forbidden(action) => format!("Only administrators can {}.", action),
            Self::NotAuthenticated => "Your session has expired. Please log in again.".to_string(),
            Self::Decode(_) | Self::Storage(_) => GENERIC_ERROR_MESSAGE.to_string(),
            Self::ExportFailed(reason) => format!("Export failed: {}", reason),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<sqlx::Error> for ClientError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// 从错误响应 body 中提取可读信息
///
/// 依次尝试 `message`、`error`、`errors`（ASP.NET 校验错误）、`title`，
/// 非 JSON 的短文本 body 原样返回，HTML 错误页忽略。
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        return match value {
            serde_json::Value::Object(map) => {
                for key in ["message", "error"] {
                    if let Some(text) = map.get(key).and_then(|v| v.as_str()) {
                        if !text.trim().is_empty() {
                            return Some(text.trim().to_string());
                        }
                    }
                }
                if let Some(errors) = map.get("errors").and_then(|v| v.as_object()) {
                    let first: Vec<String> = errors
                        .values()
                        .filter_map(|v| match v {
                            serde_json::Value::Array(items) => {
                                items.first().and_then(|i| i.as_str()).map(str::to_string)
                            }
                            serde_json::Value::String(s) => Some(s.clone()),
                            _ => None,
                        })
                        .collect();
                    if !first.is_empty() {
                        return Some(first.join(" "));
                    }
                }
                map.get("title")
                    .and_then(|v| v.as_str())
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| t.trim().to_string())
            }
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            _ => None,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() || text.starts_with('<') || text.len() > 300 {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let body = br#"{"message":"Subject already exists","error":"conflict"}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Subject already exists")
        );
    }

    #[test]
    fn aspnet_validation_errors_are_joined() {
        let body = br#"{"title":"One or more validation errors occurred.","errors":{"Name":["The Name field is required."]}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("The Name field is required.")
        );
    }

    #[test]
    fn html_and_empty_bodies_fall_back() {
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(502));

        let err = ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, b"Invalid credentials");
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn network_errors_show_connection_message() {
        let err = ClientError::Network("connection refused".into());
        assert!(err.is_network());
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
    }
}
