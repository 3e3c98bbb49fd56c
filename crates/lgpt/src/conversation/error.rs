//! Conversation store errors.

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors returned by [`super::ConversationStore`] operations.
///
/// Provider failures are not represented here; they are absorbed into the
/// transcript and `last_error`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or blank credential.
    #[error("{0}")]
    Configuration(String),

    /// Another exchange is still waiting on the provider.
    #[error("a request is already in flight")]
    Busy,

    /// Settings could not be loaded or saved.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
