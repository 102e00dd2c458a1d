//! Error types for the Gemini integration

use thiserror::Error;

/// Errors that can occur while calling the language model
///
/// These never reach the caller of `Assistant::generate`; they are folded
/// into the displayable reply text.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// API key is not configured
    #[error("API key not configured. Run :ai-key <key> to configure")]
    ApiKeyNotFound,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// Invalid API key format
    #[error("Invalid API key format. Gemini keys start with 'AIza'")]
    InvalidApiKey,

    /// HTTP request failed before a response arrived
    #[error("{0}")]
    RequestError(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("API call failed with status: {0}")]
    Status(u16),

    /// The response body was not JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AssistantError {
    /// Check if this error requires a new API key
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AssistantError::ApiKeyNotFound
                | AssistantError::InvalidApiKey
                | AssistantError::Status(401 | 403)
        )
    }
}
