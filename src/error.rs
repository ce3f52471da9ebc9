use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型（请求级错误，以 ProblemDetails 返回）
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体解析错误
    #[error("请求体解析错误: {0}")]
    Json(String),

    /// 请求体超过上限
    #[error("请求体过大: {0}")]
    PayloadTooLarge(String),

    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 对象存储客户端错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// 未提供令牌（不会发起网络请求）
    #[error("No token found. Configure a blob read-write token to upload files")]
    MissingToken,

    /// 令牌被存储服务拒绝
    #[error("Access denied, please provide a valid token for this resource")]
    Forbidden,

    /// 存储空间不存在
    #[error("This store does not exist")]
    StoreNotFound,

    /// 请求被限流
    #[error("Too many requests, retry after {retry_after:?} seconds")]
    RateLimited {
        /// 服务端建议的重试间隔（秒）
        retry_after: Option<u64>,
    },

    /// 其余非 2xx 响应
    #[error("blob API error (status {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// 网络请求错误
    #[error("network error: {0}")]
    Network(String),

    /// 超时
    #[error("request to blob API timed out")]
    Timeout,

    /// 无效的响应
    #[error("invalid response from blob API: {0}")]
    InvalidResponse(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// - 所有请求级错误返回结构化 JSON，便于调用方稳定处理
/// - content-type = application/problem+json
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Validation Failed")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// 请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Json(_) => "BAD_REQUEST",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::PAYLOAD_TOO_LARGE => "Payload Too Large",
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: Some(self.to_string()),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

impl From<reqwest::Error> for BlobError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BlobError::Timeout
        } else {
            BlobError::Network(err.to_string())
        }
    }
}
