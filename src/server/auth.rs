//! Bearer-token check for the completions route.

use super::AppState;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Reject requests whose `Authorization: Bearer <token>` does not match
/// the configured key.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == state.api_key.as_ref() => next.run(request).await,
        _ => {
            error!("invalid API key attempted");
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Invalid API Key" })),
            )
                .into_response()
        }
    }
}
