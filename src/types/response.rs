//! Output-side wire records (OpenAI completion schema).
//!
//! These are produced by the adapter and serialized by the HTTP boundary.
//! Field names and `object` tags are fixed by the OpenAI schema and must
//! not drift.

use serde::{Deserialize, Serialize};

/// Model identifier reported in responses (display only; the gateway
/// serves exactly one model).
pub const DISPLAY_MODEL: &str = "meta-llama/Llama-2-70b-hf";

/// Object tag of a non-streaming completion.
pub const OBJECT_COMPLETION: &str = "chat.completion";

/// Object tag of one streamed chunk.
pub const OBJECT_CHUNK: &str = "chat.completion.chunk";

/// Non-streaming response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEnvelope {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: AssistantMessage,
    /// Textual finish reason; serialized as `null` when absent.
    pub finish_reason: Option<String>,
}

/// The generated turn. Role is always `assistant` on the output side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Token accounting block.
///
/// `prompt_tokens` is the whitespace approximation documented in the
/// adapter; `total_tokens` is always the exact sum of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One unit of a streamed completion. Every chunk of a stream carries the
/// same `id` and `created` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    /// `null` on every chunk except the terminal one.
    pub finish_reason: Option<String>,
}

/// Incremental payload: the chunk's token text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDelta {
    pub content: String,
}
