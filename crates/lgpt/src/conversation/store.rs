//! Conversation store: owns the transcript and drives one send at a time.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::StoreError;
use super::message::{Message, MessageId};
use super::state::ConversationState;
use crate::llm::{LLMProvider, ProviderConfig, Vendor};
use crate::settings::{SettingsError, SettingsStore};

/// Text shown in place of a reply when the provider call fails.
pub const FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

/// Error recorded when a send is attempted without a credential.
pub const MISSING_CREDENTIAL: &str = "Please set your API key first";

/// Result of a [`ConversationStore::submit`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended or sent.
    Ignored,
    /// The provider answered; `message_id` now holds `reply`.
    Replied { message_id: MessageId, reply: String },
    /// The provider failed; `message_id` now holds [`FAILURE_NOTICE`].
    Failed { message_id: MessageId, error: String },
}

/// Shared handle to a conversation and its provider configuration.
///
/// Cloning is cheap; all clones see the same transcript.
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<RwLock<ConversationState>>,
    config: Arc<RwLock<ProviderConfig>>,
    provider: Arc<dyn LLMProvider>,
    settings: Option<Arc<dyn SettingsStore>>,
}

impl ConversationStore {
    /// Create a store with an explicit configuration and no persistence.
    pub fn new(provider: Arc<dyn LLMProvider>, config: ProviderConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConversationState::new())),
            config: Arc::new(RwLock::new(config)),
            provider,
            settings: None,
        }
    }

    /// Load the configuration from `settings` and save back to it on change.
    ///
    /// `env` is consulted for a credential when none has been saved.
    /// Unparseable settings fall back to defaults so that the next
    /// `configure` can overwrite them; I/O failures are still errors.
    pub async fn from_settings(
        provider: Arc<dyn LLMProvider>,
        settings: Arc<dyn SettingsStore>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, StoreError> {
        let loaded = match settings.load().await {
            Ok(config) => config,
            Err(e @ SettingsError::Yaml(_)) => {
                warn!(error = %e, "Ignoring unreadable settings; using defaults");
                ProviderConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        let config = loaded.with_credential_fallback(env);
        debug!(
            vendor = %config.vendor,
            has_credential = config.has_credential(),
            "Loaded provider settings"
        );

        let mut store = Self::new(provider, config);
        store.settings = Some(settings);
        Ok(store)
    }

    /// Send `text` to the configured vendor and record the exchange.
    ///
    /// Appends the user message and a pending assistant message, awaits the
    /// provider, then settles the assistant message by id. Provider failures
    /// are reported through [`SubmitOutcome::Failed`] and `last_error`.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        let config = self.config.read().await.clone();
        if !config.has_credential() {
            self.state
                .write()
                .await
                .set_error(Some(MISSING_CREDENTIAL.to_string()));
            return Err(StoreError::Configuration(MISSING_CREDENTIAL.to_string()));
        }

        let message_id = {
            let mut state = self.state.write().await;
            if state.is_busy() {
                return Err(StoreError::Busy);
            }
            let (_, assistant_id) = state.begin_exchange(text);
            state.set_busy(true);
            assistant_id
        };

        debug!(message_id, vendor = %config.vendor, "Submitting message");
        let result = self.provider.send(text, &config).await;

        let mut state = self.state.write().await;
        state.set_busy(false);
        match result {
            Ok(reply) => {
                if !state.resolve(message_id, &reply) {
                    debug!(message_id, "Reply arrived for a cleared message; dropped");
                }
                state.set_error(None);
                Ok(SubmitOutcome::Replied { message_id, reply })
            }
            Err(e) => {
                warn!(message_id, vendor = %config.vendor, error = %e, "Provider request failed");
                state.resolve(message_id, FAILURE_NOTICE);
                let error = e.to_string();
                state.set_error(Some(error.clone()));
                Ok(SubmitOutcome::Failed { message_id, error })
            }
        }
    }

    /// Empty the transcript and forget the last error.
    ///
    /// An in-flight request keeps running; its reply is dropped on arrival.
    pub async fn clear(&self) {
        self.state.write().await.clear();
    }

    /// Replace vendor and credential, persisting when settings are attached.
    pub async fn configure(&self, vendor: Vendor, credential: &str) -> Result<(), StoreError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(StoreError::Configuration(
                "Please enter an API key".to_string(),
            ));
        }

        let config = ProviderConfig::new(vendor, Some(credential.to_string()));
        *self.config.write().await = config.clone();
        info!(%vendor, "Provider configuration updated");

        self.persist(&config).await
    }

    /// Switch vendor, keeping the current credential.
    pub async fn set_vendor(&self, vendor: Vendor) -> Result<(), StoreError> {
        let config = {
            let mut guard = self.config.write().await;
            guard.vendor = vendor;
            guard.clone()
        };
        info!(%vendor, "Provider vendor changed");

        self.persist(&config).await
    }

    pub async fn config(&self) -> ProviderConfig {
        self.config.read().await.clone()
    }

    pub async fn snapshot(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages().to_vec()
    }

    pub async fn message(&self, id: MessageId) -> Option<Message> {
        self.state.read().await.get(id).cloned()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.is_busy()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error().map(str::to_string)
    }

    async fn persist(&self, config: &ProviderConfig) -> Result<(), StoreError> {
        if let Some(settings) = &self.settings {
            settings.save(config).await?;
        }
        Ok(())
    }
}
