//! Wire types for OpenAI-compatible chat completions.

use serde::{Deserialize, Serialize};

/// Output token cap sent with every request.
pub const MAX_TOKENS: u32 = 1000;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.7;

/// Reply used when a well-formed response carries no content.
pub const NO_RESPONSE: &str = "No response";

/// A chat completion request (OpenAI-compatible format).
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a single-turn request carrying one user message.
    pub fn user(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message {
                role: Role::User,
                content: content.into(),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// A message in a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a message sender. Requests only ever carry the user turn.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A chat completion response.
///
/// Only `choices` is required; everything below it is optional so that
/// a missing reply degrades to [`NO_RESPONSE`] instead of failing.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, or [`NO_RESPONSE`] when absent or empty.
    pub fn reply_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string())
    }
}
