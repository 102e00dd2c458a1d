//! API key management using system keyring

use keyring::Entry;

use super::error::AssistantError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "cses-tracker";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "gemini-api-key";
/// Environment variable that takes precedence over the keyring
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Manages the Gemini API key
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Resolve the key to use: environment first, then keyring
    pub fn resolve() -> Result<String, AssistantError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Self::get_api_key(),
        }
    }

    /// Get the API key from system keyring
    pub fn get_api_key() -> Result<String, AssistantError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| AssistantError::KeyringError(e.to_string()))?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => AssistantError::ApiKeyNotFound,
            _ => AssistantError::KeyringError(e.to_string()),
        })
    }

    /// Store the API key in system keyring
    pub fn set_api_key(key: &str) -> Result<(), AssistantError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(AssistantError::InvalidApiKey);
        }

        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| AssistantError::KeyringError(e.to_string()))?;

        entry.set_password(key).map_err(|e| AssistantError::KeyringError(e.to_string()))
    }

    /// Delete the stored API key
    pub fn delete_api_key() -> Result<(), AssistantError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| AssistantError::KeyringError(e.to_string()))?;

        entry.delete_credential().map_err(|e| AssistantError::KeyringError(e.to_string()))
    }

    /// Validate API key format
    fn validate_key_format(key: &str) -> bool {
        key.starts_with("AIza")
            && key.len() >= 30
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Mask an API key for display (show first 6 and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 {
            return "*".repeat(key.len());
        }
        let prefix = &key[..6];
        let suffix = &key[key.len() - 4..];
        format!("{}...{}", prefix, suffix)
    }
}
