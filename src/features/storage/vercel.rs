use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::Deserialize;

use crate::config::BlobConfig;
use crate::error::{AppError, BlobError};

use super::client::{BlobStore, PutBlobRequest, PutBlobResponse};

/// Blob API 协议版本（随请求头 `x-api-version` 发送）
const API_VERSION: &str = "7";

/// 托管 Blob 服务（Vercel Blob 兼容）的最小客户端，仅实现 `put`。
///
/// 不做重试：失败直接交给调用方决定如何处理整批上传。
#[derive(Clone)]
pub struct VercelBlobClient {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl VercelBlobClient {
    pub fn new(config: &BlobConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(concat!("image-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {}", e)))?;

        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for VercelBlobClient {
    async fn put(&self, request: PutBlobRequest) -> Result<PutBlobResponse, BlobError> {
        if request.token.trim().is_empty() {
            return Err(BlobError::MissingToken);
        }

        tracing::debug!(
            pathname = %request.pathname,
            content_type = %request.content_type,
            bytes = request.body.len(),
            "写入 Blob 对象"
        );

        let resp = self
            .client
            .put(format!("{}/", self.api_url))
            .query(&[("pathname", request.pathname.as_str())])
            .bearer_auth(&request.token)
            .header("x-api-version", API_VERSION)
            .header("x-content-type", &request.content_type)
            .header("x-add-random-suffix", "0")
            .header("x-vercel-blob-access", request.access.as_str())
            .body(request.body)
            .send()
            .await?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, retry_after, &text));
        }

        serde_json::from_str::<PutBlobResponse>(&text)
            .map_err(|e| BlobError::InvalidResponse(format!("解析上传响应失败: {e}")))
    }
}

/// 将非 2xx 响应映射为 `BlobError`。
fn error_from_response(status: StatusCode, retry_after: Option<u64>, body: &str) -> BlobError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BlobError::Forbidden,
        StatusCode::NOT_FOUND => BlobError::StoreNotFound,
        StatusCode::TOO_MANY_REQUESTS => BlobError::RateLimited { retry_after },
        _ => {
            let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
                Ok(env) => (env.error.code, env.error.message),
                Err(_) => (String::new(), body.chars().take(200).collect()),
            };
            BlobError::Api {
                status: status.as_u16(),
                code: if code.is_empty() {
                    "unknown_error".to_string()
                } else {
                    code
                },
                message,
            }
        }
    }
}
