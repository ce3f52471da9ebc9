//! 图片上传 API 处理模块（features/upload）
use axum::{
    Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};

use crate::error::{AppError, ProblemDetails};
use crate::state::AppState;

use super::models::{UploadError, UploadImagesRequest, UploadQuery, UploadResult};

#[utoipa::path(
    post,
    path = "/uploads/images",
    summary = "批量上传 base64 图片",
    description = "接收一组 `data:image/<type>;base64,<payload>` 字符串，逐张解码后写入对象存储并返回公开 URL。格式不合格的项会被跳过；解码或存储失败会中止整批。",
    request_body = UploadImagesRequest,
    params(UploadQuery),
    responses(
        (status = 200, description = "上传完成（可能少于输入数量）", body = UploadResult),
        (status = 413, description = "请求体过大", body = ProblemDetails),
        (status = 422, description = "批次超限（ProblemDetails），或解码失败、没有任何图片上传成功（UploadResult）", content(
            (UploadResult = "application/json"),
            (ProblemDetails = "application/problem+json")
        )),
        (status = 502, description = "对象存储返回错误", body = UploadResult),
        (status = 503, description = "存储令牌缺失或被拒绝", body = UploadResult)
    ),
    tag = "Upload"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    payload: Result<Json<UploadImagesRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Json(rejection.body_text())
        }
    })?;

    // 令牌缺失时由中转器返回配置错误，优先于批次上限校验
    let max = state.upload_limits.max_images;
    if state.relay.is_configured() && max > 0 && payload.images.len() > max {
        return Err(AppError::Validation(format!(
            "单批最多 {} 张图片，实际 {} 张",
            max,
            payload.images.len()
        )));
    }

    let images: Vec<String> = payload
        .images
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();

    let response = match state.relay.upload_detailed(&images).await {
        Ok(report) => {
            let body = UploadResult {
                items: query.detail.then_some(report.items),
                ..UploadResult::success(report.urls)
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    };
    Ok(response)
}

impl UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::MissingToken
            | UploadError::StorageMissingToken
            | UploadError::StorageRejectedToken => StatusCode::SERVICE_UNAVAILABLE,
            UploadError::NoneSucceeded | UploadError::Decode { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            UploadError::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// 上传失败仍返回 `{ "error": "..." }` 结构，调用方无需区分两种错误格式
impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(UploadResult::failure(&self))).into_response()
    }
}

pub fn create_upload_router() -> Router<AppState> {
    Router::<AppState>::new().route("/uploads/images", post(upload_images))
}
