//! Backend text-generation capability.
//!
//! The inference service is an external collaborator hidden behind the
//! narrow [`TextGeneration`] trait: a prompt and a token limit go in,
//! either one completed result or a sequence of token events comes out.
//! The translation layer never sees transport details, so backends are
//! swappable without touching it.

pub mod tgi;
pub use tgi::TgiClient;

use crate::BoxStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised while talking to the inference backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend sent an unreadable frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend stream error: {0}")]
    Stream(String),
}

/// Cause of generation termination, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Length,
    EosToken,
    StopSequence,
}

impl FinishReason {
    /// Textual form used on the OpenAI side of the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Length => "length",
            FinishReason::EosToken => "eos_token",
            FinishReason::StopSequence => "stop_sequence",
        }
    }
}

/// Terminal bookkeeping of a completed generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationDetails {
    pub finish_reason: FinishReason,
    pub generated_tokens: u32,
}

/// One completed (non-streaming) generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResult {
    pub generated_text: String,
    pub details: GenerationDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub text: String,
}

/// One event of a generation stream. Only the final event carries
/// `details`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEvent {
    pub token: Token,
    #[serde(default)]
    pub details: Option<GenerationDetails>,
}

/// Ordered, single-pass, non-restartable sequence of token events.
/// Transport errors surface in-band. Dropping the stream closes the
/// underlying backend connection.
pub type TokenEventStream = BoxStream<'static, Result<TokenEvent, BackendError>>;

/// The capability the translation layer consumes.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Generate one complete result for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<GenerationResult, BackendError>;

    /// Generate a stream of token events for `prompt`, one per token.
    async fn generate_stream(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<TokenEventStream, BackendError>;
}
