use std::sync::Arc;

use crate::config::BlobConfig;
use crate::features::storage::{BlobAccess, BlobStore, PutBlobRequest};

use super::data_uri;
use super::models::{ItemOutcome, UploadError, UploadReport, UploadResult};
use super::naming;

/// 中转器配置：显式传入，不在调用时读取进程环境
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// 存储写入令牌
    pub token: Option<String>,
    /// 对象名前缀
    pub object_prefix: String,
}

impl RelayConfig {
    /// 从 blob 配置构建（令牌回落到环境变量只在这里发生一次）
    pub fn from_blob_config(cfg: &BlobConfig) -> Self {
        Self {
            token: cfg.resolve_token(),
            object_prefix: cfg.object_prefix.clone(),
        }
    }
}

/// 图片上传中转：校验并解码 data URI，逐张写入对象存储，收集公开 URL。
///
/// 图片严格按顺序处理，每次写入完成后才处理下一张。
pub struct UploadRelay {
    store: Arc<dyn BlobStore>,
    config: RelayConfig,
}

impl UploadRelay {
    pub fn new(store: Arc<dyn BlobStore>, config: RelayConfig) -> Self {
        Self { store, config }
    }

    /// 上传一批图片，返回 `{ urls }` 或 `{ error }`。
    pub async fn upload<S: AsRef<str> + Sync>(&self, images: &[S]) -> UploadResult {
        match self.upload_detailed(images).await {
            Ok(report) => UploadResult::success(report.urls),
            Err(e) => UploadResult::failure(&e),
        }
    }

    /// 与 `upload` 相同，但额外返回逐项结果。
    ///
    /// - 令牌缺失：立即失败，不处理任何图片
    /// - 格式不合格的项：跳过，仅记录日志
    /// - 解码或存储失败：中止整批，已写入的对象不回滚
    /// - 非空批次全部被跳过：返回 `NoneSucceeded`
    pub async fn upload_detailed<S: AsRef<str> + Sync>(
        &self,
        images: &[S],
    ) -> Result<UploadReport, UploadError> {
        let Some(token) = self.token() else {
            tracing::error!("存储令牌未配置（BLOB_READ_WRITE_TOKEN / blob.token）");
            return Err(UploadError::MissingToken);
        };

        let mut report = UploadReport::default();
        if let Err(e) = self.process_batch(images, token, &mut report).await {
            tracing::error!(
                uploaded = report.urls.len(),
                total = images.len(),
                "上传图片到 Blob 失败: {}",
                e
            );
            return Err(e);
        }

        if report.urls.is_empty() && !images.is_empty() {
            tracing::warn!(total = images.len(), "本批次没有任何图片上传成功");
            return Err(UploadError::NoneSucceeded);
        }

        tracing::info!(
            uploaded = report.urls.len(),
            skipped = images.len() - report.urls.len(),
            "批量上传完成"
        );
        Ok(report)
    }

    /// 是否配置了可用的存储令牌
    pub fn is_configured(&self) -> bool {
        self.token().is_some()
    }

    fn token(&self) -> Option<&str> {
        self.config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    async fn process_batch<S: AsRef<str> + Sync>(
        &self,
        images: &[S],
        token: &str,
        report: &mut UploadReport,
    ) -> Result<(), UploadError> {
        for (index, raw) in images.iter().enumerate() {
            let raw = raw.as_ref();
            let uri = match data_uri::parse(raw) {
                Ok(uri) => uri,
                Err(reason) => {
                    tracing::warn!(
                        index,
                        ?reason,
                        preview = data_uri::preview(raw),
                        "跳过不合格的图片 data URI"
                    );
                    report.items.push(ItemOutcome::Skipped { index, reason });
                    continue;
                }
            };

            let body = uri.decode().map_err(|e| UploadError::Decode {
                index,
                reason: e.to_string(),
            })?;
            let pathname = naming::object_name(&self.config.object_prefix, uri.extension());

            let stored = self
                .store
                .put(PutBlobRequest {
                    pathname,
                    body,
                    content_type: uri.mime_type.clone(),
                    access: BlobAccess::Public,
                    token: token.to_string(),
                })
                .await?;

            tracing::debug!(index, url = %stored.url, "图片已上传");
            report.urls.push(stored.url.clone());
            report.items.push(ItemOutcome::Uploaded {
                index,
                url: stored.url,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlobError;
    use crate::features::storage::PutBlobResponse;
    use crate::features::upload::models::SkipReason;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";
    const JPEG: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

    /// 内存实现：记录每次写入，可指定第 N 次调用失败
    #[derive(Default)]
    struct MemoryStore {
        calls: Mutex<Vec<PutBlobRequest>>,
        fail_on_call: Option<(usize, BlobError)>,
    }

    impl MemoryStore {
        fn failing_at(call: usize, err: BlobError) -> Self {
            Self {
                fail_on_call: Some((call, err)),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<PutBlobRequest> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl BlobStore for MemoryStore {
        async fn put(&self, request: PutBlobRequest) -> Result<PutBlobResponse, BlobError> {
            let mut calls = self.calls.lock().expect("lock");
            let n = calls.len();
            calls.push(request.clone());
            if let Some((at, err)) = &self.fail_on_call
                && *at == n
            {
                return Err(err.clone());
            }
            Ok(PutBlobResponse {
                url: format!("https://blob.test/{}", request.pathname),
                download_url: None,
                pathname: request.pathname,
                content_type: Some(request.content_type),
            })
        }
    }

    fn relay_with(store: Arc<MemoryStore>, token: Option<&str>) -> UploadRelay {
        UploadRelay::new(
            store,
            RelayConfig {
                token: token.map(str::to_string),
                object_prefix: "product".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn single_valid_png_yields_one_url() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        let result = relay.upload(&[PNG]).await;
        assert!(result.error.is_none());
        let urls = result.urls.expect("urls");
        assert_eq!(urls.len(), 1);

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].content_type, "image/png");
        assert_eq!(calls[0].access, BlobAccess::Public);
        assert_eq!(calls[0].token, "tok");
        assert!(calls[0].pathname.starts_with("product-"));
        assert!(calls[0].pathname.ends_with(".png"));
        assert_eq!(calls[0].body.len(), 8);
        assert_eq!(urls[0], format!("https://blob.test/{}", calls[0].pathname));
    }

    #[tokio::test]
    async fn empty_batch_is_success_with_no_urls() {
        let relay = relay_with(Arc::new(MemoryStore::default()), Some("tok"));
        let empty: [&str; 0] = [];
        assert_eq!(relay.upload(&empty).await, UploadResult::success(Vec::new()));
    }

    #[tokio::test]
    async fn all_malformed_batch_is_an_error() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        let result = relay.upload(&["not-a-data-uri", ""]).await;
        assert!(result.urls.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("No images were successfully uploaded. Check image formats or server logs.")
        );
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn mixed_batch_skips_malformed_silently() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        let report = relay
            .upload_detailed(&["not-a-data-uri", JPEG])
            .await
            .expect("report");
        assert_eq!(report.urls.len(), 1);
        assert_eq!(
            report.items[0],
            ItemOutcome::Skipped {
                index: 0,
                reason: SkipReason::NotImageDataUri
            }
        );
        assert!(matches!(report.items[1], ItemOutcome::Uploaded { index: 1, .. }));
        assert!(store.calls()[0].pathname.ends_with(".jpeg"));
    }

    #[tokio::test]
    async fn urls_follow_processing_order() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        let report = relay
            .upload_detailed(&[PNG, "data:image/png;base64", JPEG])
            .await
            .expect("report");

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].pathname.ends_with(".png"));
        assert!(calls[1].pathname.ends_with(".jpeg"));
        assert_eq!(
            report.urls,
            vec![
                format!("https://blob.test/{}", calls[0].pathname),
                format!("https://blob.test/{}", calls[1].pathname),
            ]
        );

        let indices: Vec<usize> = report
            .items
            .iter()
            .map(|item| match item {
                ItemOutcome::Uploaded { index, .. } | ItemOutcome::Skipped { index, .. } => *index,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            report.items[1],
            ItemOutcome::Skipped {
                index: 1,
                reason: SkipReason::Malformed
            }
        );
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_upload() {
        for token in [None, Some(""), Some("   ")] {
            let store = Arc::new(MemoryStore::default());
            let relay = relay_with(store.clone(), token);

            let result = relay.upload(&[PNG]).await;
            assert_eq!(
                result,
                UploadResult {
                    error: Some(
                        "File upload service is not configured correctly. Missing token."
                            .to_string()
                    ),
                    ..UploadResult::default()
                }
            );
            assert!(store.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn storage_failure_aborts_remaining_images() {
        let store = Arc::new(MemoryStore::failing_at(
            1,
            BlobError::Network("connection reset".to_string()),
        ));
        let relay = relay_with(store.clone(), Some("tok"));

        let result = relay.upload(&[PNG, JPEG, PNG]).await;
        assert!(result.urls.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to upload images: network error: connection reset")
        );
        // 第三张不会被尝试
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn storage_token_errors_become_configuration_messages() {
        let store = Arc::new(MemoryStore::failing_at(0, BlobError::MissingToken));
        let err = relay_with(store, Some("tok"))
            .upload_detailed(&[PNG])
            .await
            .expect_err("missing token");
        assert_eq!(
            err.to_string(),
            "File upload configuration error: The server is missing the required access token."
        );

        let store = Arc::new(MemoryStore::failing_at(0, BlobError::Forbidden));
        let err = relay_with(store, Some("tok"))
            .upload_detailed(&[PNG])
            .await
            .expect_err("rejected");
        assert_eq!(err, UploadError::StorageRejectedToken);
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn invalid_base64_aborts_batch() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        let err = relay
            .upload_detailed(&["data:image/png;base64,@@@@", PNG])
            .await
            .expect_err("decode error");
        assert!(matches!(err, UploadError::Decode { index: 0, .. }));
        assert!(err.to_string().starts_with("Failed to upload images: "));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_header_uploads_as_jpeg() {
        let store = Arc::new(MemoryStore::default());
        let relay = relay_with(store.clone(), Some("tok"));

        relay
            .upload_detailed(&["data:image/png,aGk="])
            .await
            .expect("report");
        let calls = store.calls();
        assert_eq!(calls[0].content_type, "image/jpeg");
        assert!(calls[0].pathname.ends_with(".jpeg"));
    }
}
