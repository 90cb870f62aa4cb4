use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
struct Endpoint {
    path: &'static str,
    methods: &'static [&'static str],
    description: &'static str,
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        path: "/health",
        methods: &["GET"],
        description: "health",
    },
    Endpoint {
        path: "/tool_call",
        methods: &["POST"],
        description: "Handle the tool call",
    },
];

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "scout tool server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": ENDPOINTS,
    }))
}

pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = routes()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"][0]["path"], "/health");
        assert_eq!(body["endpoints"][1]["path"], "/tool_call");
        assert_eq!(body["endpoints"][1]["methods"], json!(["POST"]));
    }
}
