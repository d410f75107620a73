//! Chat-completion request schema, defaults and validation.

use super::message::Message;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single model identifier this gateway accepts.
pub const SUPPORTED_MODEL: &str = "llama2-70b-chat";

/// Maximum number of stop sequences the OpenAI schema allows.
pub const MAX_STOP_SEQUENCES: usize = 4;

/// `max_new_tokens` handed to the backend when the request leaves
/// `max_tokens` unset.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// The chat-completion request body.
///
/// Unknown JSON fields are ignored (configuration-object semantics).
/// Range invariants are enforced by [`ChatRequest::validate`]; shape
/// invariants (roles, `stop` variants) by the types themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default = "defaults::temperature")]
    pub temperature: Option<f64>,
    #[serde(default = "defaults::top_p")]
    pub top_p: Option<f64>,
    #[serde(default = "defaults::n")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default = "defaults::penalty")]
    pub presence_penalty: Option<f64>,
    #[serde(default = "defaults::penalty")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<i64, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

mod defaults {
    pub fn temperature() -> Option<f64> {
        Some(1.0)
    }
    pub fn top_p() -> Option<f64> {
        Some(1.0)
    }
    pub fn n() -> Option<u32> {
        Some(1)
    }
    pub fn max_tokens() -> Option<u32> {
        Some(super::DEFAULT_MAX_TOKENS)
    }
    pub fn penalty() -> Option<f64> {
        Some(0.0)
    }
}

/// `stop` accepts a single string or a list of up to four strings.
/// No other shape deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    One(String),
    Many(Vec<String>),
}

impl ChatRequest {
    /// Enforce every range invariant of the schema.
    ///
    /// Runs all checks for fields that are present; the first violation is
    /// reported with its field path. Failures are client errors, never
    /// server errors.
    pub fn validate(&self) -> Result<()> {
        if self.model != SUPPORTED_MODEL {
            return Err(Error::validation_with_context(
                format!("Only '{}' is supported.", SUPPORTED_MODEL),
                ErrorContext::new()
                    .with_field_path("model")
                    .with_details(format!("got '{}'", self.model)),
            ));
        }

        if self.messages.is_empty() {
            return Err(Error::validation_with_context(
                "messages must contain at least one entry",
                ErrorContext::new().with_field_path("messages"),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::validation_with_context(
                    "temperature must be between 0 and 2",
                    ErrorContext::new()
                        .with_field_path("temperature")
                        .with_details(format!("got {t}")),
                ));
            }
        }

        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::validation_with_context(
                    "top_p must be between 0 and 1",
                    ErrorContext::new()
                        .with_field_path("top_p")
                        .with_details(format!("got {p}")),
                ));
            }
        }

        if let Some(n) = self.n {
            if n < 1 {
                return Err(Error::validation_with_context(
                    "n must be greater than 0",
                    ErrorContext::new().with_field_path("n"),
                ));
            }
        }

        for (field, value) in [
            ("presence_penalty", self.presence_penalty),
            ("frequency_penalty", self.frequency_penalty),
        ] {
            if let Some(v) = value {
                if !(-2.0..=2.0).contains(&v) {
                    return Err(Error::validation_with_context(
                        "penalties must be between -2.0 and 2.0",
                        ErrorContext::new()
                            .with_field_path(field)
                            .with_details(format!("got {v}")),
                    ));
                }
            }
        }

        if let Some(StopSequences::Many(sequences)) = &self.stop {
            if sequences.len() > MAX_STOP_SEQUENCES {
                return Err(Error::validation_with_context(
                    format!(
                        "stop sequence list can have up to {} sequences",
                        MAX_STOP_SEQUENCES
                    ),
                    ErrorContext::new()
                        .with_field_path("stop")
                        .with_details(format!("got {}", sequences.len())),
                ));
            }
        }

        Ok(())
    }

    /// Canonical serialized form of the request.
    ///
    /// Serde writes struct fields in declaration order, so two requests
    /// that parsed equal serialize byte-identically regardless of the
    /// field order of the incoming JSON. This is the prompt-memo key.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_request() -> serde_json::Value {
        json!({
            "model": SUPPORTED_MODEL,
            "messages": [{"role": "user", "content": "Hello!"}]
        })
    }

    fn parse(value: serde_json::Value) -> ChatRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn applies_documented_defaults() {
        let req = parse(base_request());
        assert!(!req.stream);
        assert_eq!(req.temperature, Some(1.0));
        assert_eq!(req.top_p, Some(1.0));
        assert_eq!(req.n, Some(1));
        assert_eq!(req.max_tokens, Some(DEFAULT_MAX_TOKENS));
        assert_eq!(req.presence_penalty, Some(0.0));
        assert_eq!(req.frequency_penalty, Some(0.0));
        assert!(req.stop.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn ignores_unknown_fields() {
        let mut value = base_request();
        value["response_format"] = json!({"type": "json_object"});
        assert!(parse(value).validate().is_ok());
    }

    #[test]
    fn rejects_unsupported_model() {
        let mut value = base_request();
        value["model"] = json!("gpt-4");
        let err = parse(value).validate().unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains(SUPPORTED_MODEL));
    }

    #[test]
    fn rejects_empty_messages() {
        let mut value = base_request();
        value["messages"] = json!([]);
        assert!(parse(value).validate().is_err());
    }

    #[test]
    fn temperature_boundaries() {
        for (t, ok) in [(0.0, true), (2.0, true), (2.0001, false), (-0.0001, false)] {
            let mut value = base_request();
            value["temperature"] = json!(t);
            assert_eq!(parse(value).validate().is_ok(), ok, "temperature {t}");
        }
    }

    #[test]
    fn top_p_boundaries() {
        for (p, ok) in [(0.0, true), (1.0, true), (1.01, false), (-0.5, false)] {
            let mut value = base_request();
            value["top_p"] = json!(p);
            assert_eq!(parse(value).validate().is_ok(), ok, "top_p {p}");
        }
    }

    #[test]
    fn n_must_be_positive() {
        let mut value = base_request();
        value["n"] = json!(0);
        assert!(parse(value).validate().is_err());
    }

    #[test]
    fn penalty_boundaries() {
        for field in ["presence_penalty", "frequency_penalty"] {
            for (v, ok) in [(-2.0, true), (2.0, true), (-2.5, false), (2.5, false)] {
                let mut value = base_request();
                value[field] = json!(v);
                assert_eq!(parse(value).validate().is_ok(), ok, "{field} {v}");
            }
        }
    }

    #[test]
    fn stop_accepts_string_and_short_lists() {
        let mut value = base_request();
        value["stop"] = json!("\n");
        let req = parse(value);
        assert_eq!(req.stop, Some(StopSequences::One("\n".into())));
        assert!(req.validate().is_ok());

        let mut value = base_request();
        value["stop"] = json!(["a", "b", "c", "d"]);
        assert!(parse(value).validate().is_ok());
    }

    #[test]
    fn stop_rejects_five_sequences() {
        let mut value = base_request();
        value["stop"] = json!(["a", "b", "c", "d", "e"]);
        assert!(parse(value).validate().is_err());
    }

    #[test]
    fn stop_rejects_other_shapes() {
        let mut value = base_request();
        value["stop"] = json!({"sequence": "x"});
        assert!(serde_json::from_value::<ChatRequest>(value).is_err());
    }

    #[test]
    fn logit_bias_parses_integer_keys() {
        let mut value = base_request();
        value["logit_bias"] = json!({"50256": -100.0});
        let req = parse(value);
        assert_eq!(req.logit_bias.unwrap().get(&50256), Some(&-100.0));
    }

    #[test]
    fn canonical_json_normalizes_field_order() {
        let a: ChatRequest = serde_json::from_str(
            r#"{"model":"llama2-70b-chat","messages":[{"role":"user","content":"x"}],"user":"u1"}"#,
        )
        .unwrap();
        let b: ChatRequest = serde_json::from_str(
            r#"{"user":"u1","messages":[{"content":"x","role":"user"}],"model":"llama2-70b-chat"}"#,
        )
        .unwrap();
        assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
    }
}
