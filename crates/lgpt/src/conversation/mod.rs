//! The conversation transcript and the send workflow around it.

mod error;
mod message;
mod state;
mod store;

pub use error::StoreError;
pub use message::{Message, MessageId, Sender};
pub use state::ConversationState;
pub use store::{ConversationStore, FAILURE_NOTICE, MISSING_CREDENTIAL, SubmitOutcome};
