use axum::{
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Liveness probe. The monitor has no external dependency worth failing on.
pub async fn health() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
