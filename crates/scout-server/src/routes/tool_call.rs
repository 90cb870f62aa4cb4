use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use scout::tools::{ToolCallOutcome, ToolCallRequest};
use serde_json::Value;

use crate::state::AppState;

const INVALID_REQUEST: &str = "invalid request";

async fn tool_call_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(Value::Object(request))) if !request.is_empty() => request,
        Ok(_) => {
            return bad_request(ToolCallOutcome::error(INVALID_REQUEST));
        }
        Err(rejection) => {
            tracing::warn!("Rejected tool call body: {}", rejection);
            return bad_request(ToolCallOutcome::error(INVALID_REQUEST));
        }
    };

    let request: ToolCallRequest = match serde_json::from_value(Value::Object(request)) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected tool call body: {}", e);
            return bad_request(ToolCallOutcome::error(INVALID_REQUEST));
        }
    };

    tracing::info!(tool = %request.name, parameters = %request.parameters, "Received tool call");
    let outcome = state
        .dispatcher
        .dispatch(&request.name, &request.parameters)
        .await;

    if outcome.is_error() {
        bad_request(outcome)
    } else {
        (StatusCode::OK, Json(outcome)).into_response()
    }
}

fn bad_request(outcome: ToolCallOutcome) -> Response {
    (StatusCode::BAD_REQUEST, Json(outcome)).into_response()
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/tool_call", post(tool_call_handler))
        .with_state(state)
}
