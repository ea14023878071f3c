//! HTTP surface consumed by the browser extension.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::{domain::ClassificationRequest, pipeline::ClassificationPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClassificationPipeline>,
}

pub fn routes(pipeline: Arc<ClassificationPipeline>) -> Router {
    Router::new()
        // Whole mail bodies are accepted without a size cap.
        .route("/api/classify", post(classify).layer(DefaultBodyLimit::disable()))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(AppState { pipeline })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "phish-triage",
        "keywords": state.pipeline.scanner().table().len(),
        "credentials": state.pipeline.credentials().len(),
    }))
}

async fn classify(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(request) = parse_request(&body) else {
        warn!(target: "server", bytes = body.len(), "rejected classify request without data");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No data provided" })),
        )
            .into_response();
    };

    debug!(target: "server", text_len = request.text.len(), "classify request");
    let result = state.pipeline.classify(&request).await;
    (StatusCode::OK, Json(result)).into_response()
}

/// Missing, unparseable, non-object and empty-object bodies carry no data.
/// Non-string fields are treated as absent.
pub fn parse_request(body: &[u8]) -> Option<ClassificationRequest> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let fields = value.as_object().filter(|fields| !fields.is_empty())?;
    let field = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);
    Some(ClassificationRequest::new(
        field("sender_email"),
        field("text"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UNKNOWN_SENDER;

    #[test]
    fn rejects_bodies_without_data() {
        assert!(parse_request(b"").is_none());
        assert!(parse_request(b"not json").is_none());
        assert!(parse_request(b"{}").is_none());
        assert!(parse_request(b"null").is_none());
        assert!(parse_request(b"[1, 2]").is_none());
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let request = parse_request(br#"{"text": "hello"}"#).unwrap();
        assert_eq!(request.sender, UNKNOWN_SENDER);
        assert_eq!(request.text, "hello");

        let request = parse_request(br#"{"sender_email": "a@b.c", "text": 42}"#).unwrap();
        assert_eq!(request.sender, "a@b.c");
        assert_eq!(request.text, "");
    }
}
