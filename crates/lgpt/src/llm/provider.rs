//! LLM provider trait, vendor catalog, and provider configuration.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::LLMError;

/// Trait for clients that turn one user message into one reply.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send `text` as a single user message using `config`, returning the reply.
    async fn send(&self, text: &str, config: &ProviderConfig) -> Result<String, LLMError>;
}

/// Supported completion vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    OpenAI,
    #[default]
    Groq,
}

impl Vendor {
    pub fn all() -> [Vendor; 2] {
        [Vendor::OpenAI, Vendor::Groq]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "openai",
            Vendor::Groq => "groq",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "OpenAI",
            Vendor::Groq => "Groq",
        }
    }

    /// Chat completions endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "https://api.openai.com/v1/chat/completions",
            Vendor::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "gpt-3.5-turbo",
            Vendor::Groq => "llama3-8b-8192",
        }
    }

    /// Where users obtain an API key.
    pub fn key_console_url(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "https://platform.openai.com/api-keys",
            Vendor::Groq => "https://console.groq.com/keys",
        }
    }

    /// Environment variable consulted when no credential has been saved.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "OPENAI_API_KEY",
            Vendor::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error)]
#[error("unknown vendor '{0}' (expected 'openai' or 'groq')")]
pub struct ParseVendorError(String);

impl FromStr for Vendor {
    type Err = ParseVendorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Vendor::OpenAI),
            "groq" => Ok(Vendor::Groq),
            _ => Err(ParseVendorError(s.to_string())),
        }
    }
}

/// Vendor selection plus the credential used to authorize requests.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub vendor: Vendor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl ProviderConfig {
    pub fn new(vendor: Vendor, credential: Option<String>) -> Self {
        Self { vendor, credential }
    }

    /// The credential, if one is set and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    /// Fill a missing credential from `lookup(vendor.credential_env_var())`.
    pub fn with_credential_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if !self.has_credential() {
            self.credential = lookup(self.vendor.credential_env_var())
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
        }
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("vendor", &self.vendor)
            .field("credential", &self.credential().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_endpoints_and_models() {
        assert_eq!(
            Vendor::OpenAI.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(Vendor::OpenAI.model(), "gpt-3.5-turbo");
        assert_eq!(
            Vendor::Groq.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(Vendor::Groq.model(), "llama3-8b-8192");
    }

    #[test]
    fn vendor_parse_is_case_insensitive() {
        assert_eq!("openai".parse::<Vendor>().unwrap(), Vendor::OpenAI);
        assert_eq!(" Groq ".parse::<Vendor>().unwrap(), Vendor::Groq);
        assert!("anthropic".parse::<Vendor>().is_err());
    }

    #[test]
    fn vendor_serde_names() {
        assert_eq!(serde_json::to_string(&Vendor::OpenAI).unwrap(), "\"openai\"");
        assert_eq!(serde_json::to_string(&Vendor::Groq).unwrap(), "\"groq\"");
        for vendor in Vendor::all() {
            assert_eq!(vendor.as_str().parse::<Vendor>().unwrap(), vendor);
        }
    }

    #[test]
    fn default_config_is_groq_without_credential() {
        let config = ProviderConfig::default();
        assert_eq!(config.vendor, Vendor::Groq);
        assert!(!config.has_credential());
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let config = ProviderConfig::new(Vendor::OpenAI, Some("   ".to_string()));
        assert!(config.credential().is_none());
    }

    #[test]
    fn credential_fallback_uses_vendor_variable() {
        let config = ProviderConfig::new(Vendor::OpenAI, None).with_credential_fallback(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        });
        assert_eq!(config.credential(), Some("sk-env"));
    }

    #[test]
    fn credential_fallback_keeps_saved_credential() {
        let config = ProviderConfig::new(Vendor::Groq, Some("saved".to_string()))
            .with_credential_fallback(|_| Some("env".to_string()));
        assert_eq!(config.credential(), Some("saved"));
    }

    #[test]
    fn debug_redacts_credential() {
        let config = ProviderConfig::new(Vendor::Groq, Some("gsk-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-secret"));
        assert!(debug.contains("redacted"));
    }
}
