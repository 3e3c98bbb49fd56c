//! OpenAI-compatible LLM provider.
//!
//! Both supported vendors speak the OpenAI chat completions dialect, so a
//! single client serves them; the vendor only selects endpoint and model.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::LLMError;
use super::provider::{LLMProvider, ProviderConfig, Vendor};
use super::types::{ChatRequest, ChatResponse};
use crate::config::ProviderClientConfig;

/// OpenAI-compatible provider (works for OpenAI and Groq).
pub struct OpenAICompatibleProvider {
    client: Client,
    endpoints: HashMap<Vendor, String>,
}

impl OpenAICompatibleProvider {
    pub fn new(timeout: Duration) -> Result<Self, LLMError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints: HashMap::new(),
        })
    }

    /// Build a provider from the `provider` section of the config file.
    pub fn from_config(config: &ProviderClientConfig) -> Result<Self, LLMError> {
        let mut provider = Self::new(Duration::from_secs(config.request_timeout_seconds))?;
        for vendor in Vendor::all() {
            if let Some(url) = config.endpoints.get(vendor) {
                provider = provider.with_endpoint(vendor, url);
            }
        }
        Ok(provider)
    }

    /// Override the endpoint used for `vendor`.
    pub fn with_endpoint(mut self, vendor: Vendor, url: impl Into<String>) -> Self {
        self.endpoints.insert(vendor, url.into());
        self
    }

    pub fn endpoint(&self, vendor: Vendor) -> &str {
        self.endpoints
            .get(&vendor)
            .map(String::as_str)
            .unwrap_or_else(|| vendor.endpoint())
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn send(&self, text: &str, config: &ProviderConfig) -> Result<String, LLMError> {
        let Some(credential) = config.credential() else {
            return Err(LLMError::Configuration("API key is required".to_string()));
        };

        let vendor = config.vendor;
        let url = self.endpoint(vendor);
        let request = ChatRequest::user(vendor.model(), text);

        debug!(%vendor, model = vendor.model(), url, "Sending chat completion request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", credential))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LLMError::from_status(vendor, status));
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::MalformedResponse(e.to_string()))?;

        debug!(%vendor, status = status.as_u16(), "Chat completion received");

        Ok(parsed.reply_text())
    }
}
