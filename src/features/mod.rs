/// 健康检查
pub mod health;

/// 对象存储客户端
pub mod storage;

/// 图片上传中转
pub mod upload;
