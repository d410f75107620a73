//! 类型系统模块：定义请求、消息与响应的线格式数据类型。
//!
//! # Types Module
//!
//! This module defines the wire-format type system of the gateway: the
//! accepted request schema with its invariants, and the OpenAI-shaped
//! output records.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Conversation message with role and content |
//! | [`MessageRole`] | Message role (system or user; input side only) |
//! | [`ChatRequest`] | The chat-completion request and its validation |
//! | [`CompletionEnvelope`] | Non-streaming response envelope |
//! | [`CompletionChunk`] | One unit of a streamed completion |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`message`] | Message and role types |
//! | [`request`] | Request schema, defaults and validation |
//! | [`response`] | Output-side records (OpenAI completion schema) |

pub mod message;
pub mod request;
pub mod response;

pub use message::{Message, MessageRole};
pub use request::{ChatRequest, StopSequences};
pub use response::{CompletionChunk, CompletionEnvelope, Usage};
