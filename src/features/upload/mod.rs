pub mod data_uri;
pub mod handler;
pub mod models;
pub mod naming;
pub mod relay;

// Re-exports for external use (main.rs, OpenAPI, etc.)
pub use handler::{create_upload_router, upload_images};
pub use models::{ItemOutcome, SkipReason, UploadError, UploadImagesRequest, UploadReport, UploadResult};
pub use relay::{RelayConfig, UploadRelay};
