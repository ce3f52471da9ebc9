use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};

/// 为 Swagger UI 提供正确的“业务接口前缀”Servers 配置。
///
/// - 业务接口默认前缀为 `/api/v1`（对应 `config.api.prefix` / `APP_API__PREFIX`）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl utoipa::Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api/v1）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api/v1")
                    .description(Some(
                        "业务接口前缀：对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::upload::handler::upload_images,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::features::upload::models::UploadImagesRequest,
        crate::features::upload::models::UploadResult,
        crate::features::upload::models::ItemOutcome,
        crate::features::upload::models::SkipReason,
    )),
    modifiers(&ApiServers),
    tags(
        (
            name = "Upload",
            description = "图片上传：批量接收 base64 data URI，写入对象存储并返回公开 URL。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Image Relay API",
        version = env!("CARGO_PKG_VERSION"),
        description = "图片上传中转服务（Axum + utoipa）。业务接口挂载在 `config.api.prefix`（默认 /api/v1）下，OpenAPI 的 paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_lists_upload_and_health_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/uploads/images"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn upload_422_documents_both_body_shapes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).expect("serialize openapi");
        let content = &doc["paths"]["/uploads/images"]["post"]["responses"]["422"]["content"];
        assert!(content.get("application/json").is_some());
        assert!(content.get("application/problem+json").is_some());
    }
}
