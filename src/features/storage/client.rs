use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BlobError;

/// 对象访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlobAccess {
    /// 公开可读
    #[default]
    Public,
}

impl BlobAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobAccess::Public => "public",
        }
    }
}

/// 单个对象的写入请求
#[derive(Debug, Clone)]
pub struct PutBlobRequest {
    /// 对象名（路径）
    pub pathname: String,
    /// 解码后的原始字节
    pub body: Vec<u8>,
    /// MIME 类型，例如 image/png
    pub content_type: String,
    pub access: BlobAccess,
    /// 写入令牌
    pub token: String,
}

/// 存储服务返回的对象信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBlobResponse {
    /// 公开访问 URL
    pub url: String,
    #[serde(default)]
    pub download_url: Option<String>,
    pub pathname: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// 对象存储客户端抽象。
///
/// 重试、持久性与鉴权语义均由实现方负责，调用方只关心最终 URL 或错误。
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, request: PutBlobRequest) -> Result<PutBlobResponse, BlobError>;
}
