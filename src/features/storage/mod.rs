//! 对象存储协作方：上传接口只依赖 `BlobStore`，具体实现可替换。
pub mod client;
pub mod vercel;

pub use client::{BlobAccess, BlobStore, PutBlobRequest, PutBlobResponse};
pub use vercel::VercelBlobClient;
