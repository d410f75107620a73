//! # tgi-gateway
//!
//! 面向 Text Generation Inference 后端的 OpenAI 兼容聊天补全网关。
//!
//! An OpenAI-compatible chat-completion gateway for Text Generation
//! Inference (TGI) backends.
//!
//! ## Overview
//!
//! The gateway exposes the `POST /v1/chat/completions` endpoint and
//! translates each request into the prompt format and call sequence the
//! backend expects, then translates the backend's response (or its token
//! stream) back into the OpenAI wire format. The backend itself is a
//! swappable collaborator behind the [`backend::TextGeneration`] trait.
//!
//! ## Core Philosophy
//!
//! - **Pure translation**: no retries, no conversation state, no partial
//!   failure recovery; requests go in, OpenAI-shaped responses come out
//! - **Streaming-First**: token events are forwarded as chunks the moment
//!   they arrive; nothing buffers the full completion
//! - **Type-Safe**: the request schema and its invariants live in the type
//!   layer, with descriptive errors for everything a client can get wrong
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Request/response wire records and validation |
//! | [`prompt`] | Deterministic prompt compilation with a bounded memo |
//! | [`backend`] | Text-generation capability trait and the TGI client |
//! | [`adapter`] | Request → backend call → response/chunk translation |
//! | [`server`] | HTTP boundary: routing, auth, CORS, SSE assembly |
//! | [`config`] | Environment-derived gateway configuration |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tgi_gateway::{adapter::ChatAdapter, backend::TgiClient, config::GatewayConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GatewayConfig::from_env()?;
//!     let backend = TgiClient::new(config.tgi_url.as_str())?;
//!     let adapter = Arc::new(ChatAdapter::new(Arc::new(backend)));
//!
//!     let app = server::router(adapter, &config);
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod prompt;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use adapter::ChatAdapter;
pub use backend::{TextGeneration, TgiClient};
pub use error::{Error, ErrorContext};
pub use types::message::{Message, MessageRole};
pub use types::request::ChatRequest;
pub use types::response::{CompletionChunk, CompletionEnvelope};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;
