/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 路由组装
pub mod app;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 优雅退出管理模块
pub mod shutdown;

/// 请求追踪 ID 中间件
pub mod request_id;

/// CORS 中间件构建
pub mod cors;

/// OpenAPI 文档
pub mod openapi;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::{AppError, BlobError};
pub use features::upload::{RelayConfig, UploadRelay, UploadResult};
pub use shutdown::{ShutdownManager, ShutdownReason};
