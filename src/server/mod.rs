//! HTTP boundary: routing, auth, CORS, and response shaping.
//!
//! Everything schema-shaped happens in the adapter; this layer only parses
//! bodies, enforces the bearer token, wraps chunks into SSE events and
//! appends the terminal sentinel, and maps the error taxonomy onto HTTP
//! statuses.

mod auth;
mod handlers;

pub use handlers::ApiError;

use crate::adapter::ChatAdapter;
use crate::config::GatewayConfig;
use axum::http::HeaderValue;
use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared per-process state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ChatAdapter>,
    pub api_key: Arc<str>,
}

/// Build the gateway router.
pub fn router(adapter: Arc<ChatAdapter>, config: &GatewayConfig) -> Router {
    let state = AppState {
        adapter,
        api_key: config.api_key.as_str().into(),
    };

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Mirrored methods/headers keep the layer compatible with
    // allow_credentials; wildcards are rejected by tower-http there.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
