//! LLM error types.

use thiserror::Error;

use super::provider::Vendor;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No credential configured; no request was issued.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// API rejected the credential (401/403)
    #[error("{vendor} api error (status {status}): {status_text}")]
    Authentication {
        vendor: Vendor,
        status: u16,
        status_text: String,
    },

    /// API returned any other non-success status
    #[error("{vendor} api error (status {status}): {status_text}")]
    Upstream {
        vendor: Vendor,
        status: u16,
        status_text: String,
    },

    /// Response body did not have the chat completions shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl LLMError {
    /// Classify a non-success HTTP status.
    pub fn from_status(vendor: Vendor, status: reqwest::StatusCode) -> Self {
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        let status = status.as_u16();

        match status {
            401 | 403 => LLMError::Authentication {
                vendor,
                status,
                status_text,
            },
            _ => LLMError::Upstream {
                vendor,
                status,
                status_text,
            },
        }
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::Request(err)
        }
    }
}
