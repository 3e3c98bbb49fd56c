//! LLM provider client for chat completions.

mod error;
mod openai;
mod provider;
mod types;

pub use error::LLMError;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, ParseVendorError, ProviderConfig, Vendor};
pub use types::{ChatRequest, ChatResponse, MAX_TOKENS, Message, NO_RESPONSE, Role, TEMPERATURE};
