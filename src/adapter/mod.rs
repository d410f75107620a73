//! OpenAI to backend translation.
//!
//! The adapter is the pure mapping layer between the two wire formats:
//! it validates the request, compiles the prompt, invokes the backend
//! capability, and shapes the result into the OpenAI envelope or chunk
//! stream. It holds no per-conversation state; the only thing shared
//! across requests is the prompt memo.

use crate::backend::{GenerationResult, TextGeneration, TokenEvent};
use crate::prompt::PromptCompiler;
use crate::types::message::Message;
use crate::types::request::{ChatRequest, DEFAULT_MAX_TOKENS};
use crate::types::response::{
    AssistantMessage, ChunkChoice, ChunkDelta, CompletionChoice, CompletionChunk,
    CompletionEnvelope, Usage, DISPLAY_MODEL, OBJECT_CHUNK, OBJECT_COMPLETION,
};
use crate::{BoxStream, Error, Result};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Identifier prefix distinguishing chat completions.
const COMPLETION_ID_PREFIX: &str = "chatcmpl-";

/// Translates chat-completion requests into backend calls and backend
/// results into OpenAI-shaped responses.
pub struct ChatAdapter {
    backend: Arc<dyn TextGeneration>,
    compiler: PromptCompiler,
}

impl ChatAdapter {
    pub fn new(backend: Arc<dyn TextGeneration>) -> Self {
        Self {
            backend,
            compiler: PromptCompiler::new(),
        }
    }

    /// The shared prompt memo (stats are observable for tests and logs).
    pub fn compiler(&self) -> &PromptCompiler {
        &self.compiler
    }

    fn prompt_for(&self, request: &ChatRequest) -> Result<String> {
        let serialized = request.canonical_json()?;
        let prompt = self.compiler.compile_cached(&serialized, &request.messages);
        debug!(prompt_len = prompt.len(), "compiled prompt");
        Ok(prompt)
    }

    /// Whitespace-split token count of a message's content.
    ///
    /// An approximation inherited from the upstream adapter, kept as-is
    /// for wire-level compatibility of the usage block. Not a tokenizer.
    fn approximate_tokens(message: &Message) -> u32 {
        message.content.split_whitespace().count() as u32
    }

    /// Handle a non-streaming request end to end.
    ///
    /// Validation runs before any backend work; backend failures
    /// propagate as server errors.
    pub async fn process(&self, request: &ChatRequest) -> Result<CompletionEnvelope> {
        request.validate()?;

        let prompt = self.prompt_for(request)?;
        let id = completion_id();
        let created = unix_timestamp();
        let max_new_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

        let result = self.backend.generate(&prompt, max_new_tokens).await?;
        info!(
            id = %id,
            generated_tokens = result.details.generated_tokens,
            finish_reason = result.details.finish_reason.as_str(),
            "completion finished"
        );

        let prompt_tokens = request
            .messages
            .last()
            .map(Self::approximate_tokens)
            .unwrap_or(0);

        Ok(envelope(result, id, created, prompt_tokens))
    }

    /// Handle a streaming request: translate the backend token sequence
    /// into completion chunks.
    ///
    /// One identifier/timestamp pair is fixed up front and shared by
    /// every chunk. Each token event is forwarded as soon as it is
    /// translated; the terminal `[DONE]` sentinel belongs to the HTTP
    /// boundary, not to this mapping.
    pub async fn process_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<CompletionChunk>>> {
        request.validate()?;

        let prompt = self.prompt_for(request)?;
        let id = completion_id();
        let created = unix_timestamp();
        let max_new_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

        let tokens = self.backend.generate_stream(&prompt, max_new_tokens).await?;
        info!(id = %id, "streaming completion started");

        let chunks = tokens.map(move |event| {
            event
                .map(|event| chunk(event, id.clone(), created))
                .map_err(Error::from)
        });
        Ok(Box::pin(chunks))
    }
}

fn envelope(
    result: GenerationResult,
    id: String,
    created: u64,
    prompt_tokens: u32,
) -> CompletionEnvelope {
    let completion_tokens = result.details.generated_tokens;
    CompletionEnvelope {
        id,
        object: OBJECT_COMPLETION.to_string(),
        created,
        model: DISPLAY_MODEL.to_string(),
        choices: vec![CompletionChoice {
            index: 0,
            message: AssistantMessage::new(result.generated_text),
            finish_reason: Some(result.details.finish_reason.as_str().to_string()),
        }],
        usage: Usage::new(prompt_tokens, completion_tokens),
    }
}

fn chunk(event: TokenEvent, id: String, created: u64) -> CompletionChunk {
    CompletionChunk {
        id,
        object: OBJECT_CHUNK.to_string(),
        created,
        model: DISPLAY_MODEL.to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: ChunkDelta {
                content: event.token.text,
            },
            finish_reason: event
                .details
                .map(|details| details.finish_reason.as_str().to_string()),
        }],
    }
}

fn completion_id() -> String {
    format!("{}{}", COMPLETION_ID_PREFIX, uuid::Uuid::new_v4())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
