//! Route handlers and error-to-status mapping.

use super::AppState;
use crate::types::request::ChatRequest;
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{future, stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use tracing::error;

/// Literal terminal sentinel closing every event stream.
const DONE_SENTINEL: &str = "[DONE]";

pub async fn health() -> &'static str {
    "OK"
}

/// `POST /v1/chat/completions`, the one endpoint of the gateway.
///
/// The body is parsed leniently into JSON first so that schema
/// violations (bad role, bad `stop` shape) surface as 400s with the
/// serde message, per the validation taxonomy.
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let request: ChatRequest = serde_json::from_value(payload)
        .map_err(|e| Error::validation(format!("malformed chat request: {e}")))?;

    if request.stream {
        let chunks = state.adapter.process_stream(&request).await?;

        // Each chunk becomes one `data:` event the moment it arrives. A
        // backend failure mid-stream cannot change the status line any
        // more; it is logged and the stream is cut at the sentinel.
        let events = chunks
            .inspect(|result| {
                if let Err(e) = result {
                    error!("terminating stream after backend error: {e}");
                }
            })
            .take_while(|result| future::ready(result.is_ok()))
            .filter_map(|result| async move {
                let chunk = result.ok()?;
                let json = serde_json::to_string(&chunk).ok()?;
                Some(Ok::<Event, Infallible>(Event::default().data(json)))
            })
            .chain(stream::once(async {
                Ok(Event::default().data(DONE_SENTINEL))
            }));

        Ok(Sse::new(events).into_response())
    } else {
        let envelope = state.adapter.process(&request).await?;
        Ok(Json(envelope).into_response())
    }
}

/// Maps the error taxonomy onto HTTP statuses: validation → 400,
/// everything else → 500, body shaped as `{"detail": <message>}`.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("chat completion failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
