//! Chat message types for the conversation transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned in creation order; never reused within a store.
pub type MessageId = u64;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// True only while an assistant message waits for its reply.
    pub pending: bool,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            pending: false,
        }
    }

    /// Empty assistant placeholder awaiting a reply.
    pub fn pending_assistant(id: MessageId) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text: String::new(),
            timestamp: Utc::now(),
            pending: true,
        }
    }
}
