//! Role-tagged conversation messages.

use serde::{Deserialize, Serialize};

/// A single turn of the incoming conversation.
///
/// Immutable once deserialized. Only `system` and `user` roles exist on the
/// input side; `assistant` appears solely in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }
}

/// Message role.
///
/// The two-variant enum is the role invariant: anything else (including
/// "assistant") is rejected during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}
