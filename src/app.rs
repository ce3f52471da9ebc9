use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::health::health_check;
use crate::features::upload::create_upload_router;
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整路由（main 与集成测试共用）
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    // base64 图片请求体较大，放宽 axum 默认的 2MB 限制
    let api_router = Router::<AppState>::new()
        .merge(create_upload_router())
        .layer(DefaultBodyLimit::max(config.upload.max_body_bytes));

    // axum 不允许 nest 到根路径，前缀为空时直接合并
    let prefix = config.api.prefix.trim_end_matches('/');
    let base = Router::<AppState>::new().route("/health", get(health_check));
    let base = if prefix.is_empty() {
        base.merge(api_router)
    } else {
        base.nest(prefix, api_router)
    };

    let mut app = base
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    // JSON 响应压缩；request_id 放在最外层，保证所有响应都带 x-request-id
    app.layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
