//! Conversation state and its transitions.

use super::message::{Message, MessageId};

/// Ordered transcript plus the in-flight and error flags.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    busy: bool,
    last_error: Option<String>,
    next_id: MessageId,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            busy: false,
            last_error: None,
            next_id: 1,
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Append the user message and its pending assistant placeholder.
    ///
    /// Returns `(user_id, assistant_id)`. Appending clears `last_error`.
    pub(crate) fn begin_exchange(&mut self, text: &str) -> (MessageId, MessageId) {
        let user_id = self.allocate_id();
        self.messages.push(Message::user(user_id, text));

        let assistant_id = self.allocate_id();
        self.messages.push(Message::pending_assistant(assistant_id));

        self.last_error = None;
        (user_id, assistant_id)
    }

    /// Settle a pending message with its final text.
    ///
    /// Returns false, leaving the transcript untouched, if `id` no longer exists.
    pub(crate) fn resolve(&mut self, id: MessageId, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text = text.to_string();
                message.pending = false;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Drop all messages and the last error. Ids keep counting up.
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.last_error = None;
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
