//! Status server: health and Prometheus metrics.

pub mod health;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::metrics::AppMetrics;

pub fn create_status_router(metrics: Arc<AppMetrics>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<AppMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .expect("metrics response should be valid"),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("error"))
                .expect("error response should be valid")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok_json() {
        let app = create_status_router(Arc::new(AppMetrics::new().unwrap()));
        let resp = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn metrics_endpoint_uses_prometheus_content_type() {
        let metrics = Arc::new(AppMetrics::new().unwrap());
        metrics.cycles_total.inc_by(3.0);
        let app = create_status_router(metrics);

        let resp = app.oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert_eq!(ct, "text/plain; version=0.0.4");

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("vaccine_monitor_cycles_total 3"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = create_status_router(Arc::new(AppMetrics::new().unwrap()));
        let resp = app.oneshot(get_request("/fees")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
