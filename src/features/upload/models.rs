use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BlobError;

/// 批量上传请求
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImagesRequest {
    /// data URI 列表（`data:image/<type>;base64,<payload>`），null 项按空输入跳过
    #[schema(example = json!(["data:image/png;base64,iVBORw0KGgo="]))]
    pub images: Vec<Option<String>>,
}

/// 查询参数
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// 是否返回逐项处理结果（items）
    #[serde(default)]
    pub detail: bool,
}

/// 上传结果：成功时只有 `urls`，失败时只有 `error`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// 成功上传的公开 URL（按处理顺序）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 逐项处理结果（仅在 detail=true 时返回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemOutcome>>,
}

impl UploadResult {
    pub fn success(urls: Vec<String>) -> Self {
        Self {
            urls: Some(urls),
            ..Self::default()
        }
    }

    pub fn failure(err: &UploadError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::default()
        }
    }
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// 空字符串或 null
    Empty,
    /// 不是 `data:image/` 开头
    NotImageDataUri,
    /// 逗号分隔结构不对
    Malformed,
}

/// 单张图片的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemOutcome {
    Uploaded { index: usize, url: String },
    Skipped { index: usize, reason: SkipReason },
}

/// 逐项报告；`urls` 与 `items` 中的 Uploaded 项一一对应
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub urls: Vec<String>,
    pub items: Vec<ItemOutcome>,
}

/// 批量上传失败（整批中止）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// 未配置存储令牌，未处理任何图片
    #[error("File upload service is not configured correctly. Missing token.")]
    MissingToken,

    /// 非空批次中没有任何图片上传成功
    #[error("No images were successfully uploaded. Check image formats or server logs.")]
    NoneSucceeded,

    /// 存储客户端报告缺少令牌
    #[error(
        "File upload configuration error: The server is missing the required access token."
    )]
    StorageMissingToken,

    /// 存储服务拒绝了令牌
    #[error(
        "File upload configuration error: The storage service rejected the access token."
    )]
    StorageRejectedToken,

    /// base64 解码失败
    #[error("Failed to upload images: invalid base64 payload at index {index}: {reason}")]
    Decode { index: usize, reason: String },

    /// 其余存储错误
    #[error("Failed to upload images: {0}")]
    Storage(BlobError),
}

impl UploadError {
    /// 是否属于配置类错误（令牌缺失或被拒绝）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            UploadError::MissingToken
                | UploadError::StorageMissingToken
                | UploadError::StorageRejectedToken
        )
    }
}

impl From<BlobError> for UploadError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::MissingToken => UploadError::StorageMissingToken,
            BlobError::Forbidden => UploadError::StorageRejectedToken,
            other => UploadError::Storage(other),
        }
    }
}
