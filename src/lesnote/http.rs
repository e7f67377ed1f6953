//! 通用 HTTP 请求封装
//!
//! 所有 API 模块共用：统一打日志、统一把非 2xx 响应转换为 `ClientError`。

use crate::lesnote::config::ClientConfig;
use crate::lesnote::error::ClientError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 带配置的 HTTP 客户端
///
/// 认证客户端通过 `default_headers` 自动附带 `Authorization: Bearer <token>`。
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
    authenticated: bool,
}

impl ApiClient {
    /// 不带 token 的客户端（注册、登录、验证码等接口）
    pub fn anonymous(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Self::builder(&config, HeaderMap::new())
            .build()
            .map_err(|e| ClientError::Network(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self {
            client,
            config,
            authenticated: false,
        })
    }

    /// 带 Bearer token 的客户端
    pub fn with_token(config: ClientConfig, token: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::validation("token", "无效的 token"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let client = Self::builder(&config, headers)
            .build()
            .map_err(|e| ClientError::Network(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self {
            client,
            config,
            authenticated: true,
        })
    }

    fn builder(config: &ClientConfig, mut headers: HeaderMap) -> reqwest::ClientBuilder {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path).query(query);
        let body = self.execute(request, path, operation).await?;
        decode_body(&body, operation)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B, operation: &str) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(payload);
        let body = self.execute(request, path, operation).await?;
        decode_body(&body, operation)
    }

    /// POST 请求，只关心是否成功，不解析响应 body
    pub async fn post_unit<B>(&self, path: &str, payload: &B, operation: &str) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(payload);
        self.execute(request, path, operation).await.map(|_| ())
    }

    pub async fn put_unit<B>(&self, path: &str, payload: &B, operation: &str) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path).json(payload);
        self.execute(request, path, operation).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str, operation: &str) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, path);
        self.execute(request, path, operation).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        self.client
            .request(method, url)
            .header("operationID", Uuid::new_v4().to_string())
    }

    /// 发送请求并返回 body；非 2xx 时解析错误信息
    async fn execute(
        &self,
        request: RequestBuilder,
        path: &str,
        operation: &str,
    ) -> Result<Vec<u8>, ClientError> {
        info!("[HTTP] 📡 {} → {}", operation, path);

        let response = request.send().await.map_err(|e| {
            error!("[HTTP] {}请求失败（网络）: {}", operation, e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("[HTTP] {}读取响应 body 失败: {}", operation, e);
            ClientError::Network(e.to_string())
        })?;
        debug!(
            "[HTTP] {}响应 Body: {}",
            operation,
            String::from_utf8_lossy(&body)
        );

        if !status.is_success() {
            let err = ClientError::from_status(status, &body);
            error!(
                "[HTTP] {}请求失败，HTTP状态: {}, 信息: {}",
                operation,
                status,
                err.user_message()
            );
            return Err(err);
        }
        debug!("[HTTP] {}请求成功，HTTP状态: {}", operation, status);
        Ok(body.to_vec())
    }
}

/// 解析响应 body；空 body 按 `null` 处理（只有 `Option<T>` 之类的类型能接受）
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8], operation: &str) -> Result<T, ClientError> {
    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation,
            e,
            String::from_utf8_lossy(body)
        );
        ClientError::Decode(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_decodes_as_none_only() {
        let none: Option<Vec<i64>> = decode_body(b"", "test").unwrap();
        assert!(none.is_none());
        let err = decode_body::<Vec<i64>>(b"  ", "test").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn authenticated_client_rejects_header_breaking_token() {
        let err = ApiClient::with_token(ClientConfig::default(), "abc\ndef").unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: "token", .. }));
        let client = ApiClient::with_token(ClientConfig::default(), "abc.def.ghi").unwrap();
        assert!(client.is_authenticated());
    }
}
