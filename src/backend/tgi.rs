//! HTTP client for a Text Generation Inference endpoint.
//!
//! Speaks TGI's native API: `POST /generate` for one-shot results and
//! `POST /generate_stream` for an SSE token stream. Decoding splits the
//! byte stream into `data:` frames incrementally, so tokens reach the
//! translator as soon as the backend flushes them.

use super::{BackendError, GenerationResult, TextGeneration, TokenEvent, TokenEventStream};
use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

/// SSE frame delimiter and payload prefix used by TGI.
const SSE_DELIMITER: &str = "\n\n";
const SSE_DATA_PREFIX: &str = "data:";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    details: bool,
}

/// In-band error frame TGI emits when generation fails mid-stream.
#[derive(Debug, Deserialize)]
struct ErrorFrame {
    error: String,
}

/// Reqwest-backed [`TextGeneration`] implementation.
pub struct TgiClient {
    client: reqwest::Client,
    base_url: String,
}

impl TgiClient {
    /// Build a client for the endpoint at `base_url`.
    ///
    /// Connection behavior is env-overridable (`TGI_CONNECT_TIMEOUT_SECS`,
    /// `TGI_POOL_MAX_IDLE_PER_HOST`). No overall request timeout:
    /// generation can take minutes and the stream variant stays open for
    /// its whole lifetime.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let connect_timeout = env::var("TGI_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .pool_max_idle_per_host(
                env::var("TGI_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn post(
        &self,
        path: &str,
        body: &GenerateRequest<'_>,
    ) -> Result<reqwest::Response, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, max_new_tokens = body.parameters.max_new_tokens, "calling backend");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl TextGeneration for TgiClient {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<GenerationResult, BackendError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens,
                details: true,
            },
        };
        let response = self.post("/generate", &body).await?;
        Ok(response.json().await?)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<TokenEventStream, BackendError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens,
                details: true,
            },
        };
        let response = self.post("/generate_stream", &body).await?;
        let bytes = response.bytes_stream().map_err(BackendError::from);
        Ok(decode_sse(Box::pin(bytes)))
    }
}

/// Incrementally split a byte stream into SSE frames and parse each
/// `data:` payload as a token event.
///
/// Frames may arrive split across arbitrary byte boundaries; the buffer
/// holds at most one partial frame. EOF flushes whatever remains.
pub(crate) fn decode_sse(input: BoxStream<'static, Result<Bytes, BackendError>>) -> TokenEventStream {
    let stream = stream::unfold((input, String::new()), |(mut input, mut buf)| async move {
        loop {
            if let Some(idx) = buf.find(SSE_DELIMITER) {
                let frame = buf[..idx].to_string();
                buf = buf[idx + SSE_DELIMITER.len()..].to_string();
                if let Some(event) = parse_frame(&frame) {
                    return Some((event, (input, buf)));
                }
                // Comment or empty frame; keep scanning.
                continue;
            }

            match input.next().await {
                Some(Ok(bytes)) => {
                    buf.push_str(&String::from_utf8_lossy(&bytes));
                }
                Some(Err(e)) => return Some((Err(e), (input, buf))),
                None => {
                    // EOF: flush a trailing frame without delimiter, if any.
                    let rest = std::mem::take(&mut buf);
                    return parse_frame(&rest).map(|event| (event, (input, buf)));
                }
            }
        }
    });
    Box::pin(stream)
}

fn parse_frame(frame: &str) -> Option<Result<TokenEvent, BackendError>> {
    let trimmed = frame.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }
    let payload = trimmed
        .strip_prefix(SSE_DATA_PREFIX)
        .map(str::trim_start)
        .unwrap_or(trimmed);

    match serde_json::from_str::<TokenEvent>(payload) {
        Ok(event) => Some(Ok(event)),
        Err(decode_err) => {
            // TGI reports mid-stream failures as an in-band error object.
            if let Ok(err) = serde_json::from_str::<ErrorFrame>(payload) {
                return Some(Err(BackendError::Stream(err.error)));
            }
            Some(Err(BackendError::Decode(decode_err)))
        }
    }
}
