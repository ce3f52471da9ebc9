use std::sync::Arc;

use crate::config::UploadConfig;
use crate::features::upload::UploadRelay;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 图片上传中转（内部持有存储客户端）
    pub relay: Arc<UploadRelay>,
    /// 入口限制（单批图片数等）
    pub upload_limits: UploadConfig,
}
