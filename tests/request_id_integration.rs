use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    routing::{get, post},
};
use tower::ServiceExt;

async fn ok_handler() -> &'static str {
    "ok"
}

async fn fail_handler() -> Result<&'static str, image_relay::AppError> {
    Err(image_relay::AppError::Validation("单批最多 1 张图片".into()))
}

fn build_app() -> Router {
    Router::new()
        .route("/ok", get(ok_handler))
        .route("/fail", post(fail_handler))
        .layer(axum::middleware::from_fn(
            image_relay::request_id::request_id_middleware,
        ))
}

fn header_value(resp: &axum::response::Response) -> String {
    resp.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn request_id_is_generated_when_missing_or_invalid() {
    for incoming in [None, Some("has space"), Some("")] {
        let mut builder = Request::builder().uri("/ok");
        if let Some(v) = incoming {
            builder = builder.header("x-request-id", v);
        }
        let resp = build_app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .expect("request /ok");

        assert_eq!(resp.status(), StatusCode::OK);
        let request_id = header_value(&resp);
        assert!(
            request_id.starts_with("req_"),
            "generated id expected, got {request_id:?}"
        );
    }
}

#[tokio::test]
async fn request_id_uses_client_value_when_valid() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header("x-request-id", "client.req-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /ok");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp), "client.req-001");
}

#[tokio::test]
async fn problem_details_contains_request_id() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/fail")
                .header("x-request-id", "err.req-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /fail");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let request_id_header = header_value(&resp);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("parse json");
    assert_eq!(json["requestId"].as_str(), Some(request_id_header.as_str()));
    assert_eq!(json["code"], "VALIDATION_FAILED");
}
