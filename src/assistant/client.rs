//! HTTP client for the Gemini API

use async_trait::async_trait;
use reqwest::Client;

use super::Assistant;
use super::auth::ApiKeyManager;
use super::error::AssistantError;
use super::models::{GeminiModel, GenerateContentRequest, GenerateContentResponse};

/// Public Gemini endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Message shown when the prompt was rejected by the content filter
pub fn blocked_message(reason: &str) -> String {
    format!("Error: The model blocked the response. Reason: {reason}.")
}

/// Message shown when the response carried no usable text
pub const UNEXPECTED_FORMAT: &str =
    "Error: Could not get a response from the AI. The response format was unexpected.";

/// Message shown for transport, HTTP and decoding failures
pub fn failure_message(error: &AssistantError) -> String {
    format!("An error occurred: {error}. Please check the log for more details.")
}

/// Gemini API client
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// Fixed key; `None` resolves one through `ApiKeyManager` on every call
    api_key: Option<String>,
    model: GeminiModel,
    base_url: String,
}

impl GeminiClient {
    /// Create a client that looks the key up when it is needed
    pub fn new(model: GeminiModel) -> Self {
        Self {
            client: Client::new(),
            api_key: None,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Use this key instead of the environment or keyring
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point the client at another host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model.model_id())
    }

    /// Send one prompt, returning the reply text or the reason it failed
    ///
    /// Content-filter blocks and malformed candidates are not errors: they
    /// come back as their displayable messages.
    pub async fn send_prompt(&self, prompt: &str) -> Result<String, AssistantError> {
        let key = match &self.api_key {
            Some(key) => key.clone(),
            None => ApiKeyManager::resolve()?,
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", key.as_str())])
            .header("content-type", "application/json")
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        interpret_body(&body)
    }
}

/// Turn a successful response body into the text to display
pub fn interpret_body(body: &str) -> Result<String, AssistantError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    if let Some(text) = response.first_text() {
        return Ok(text.to_string());
    }

    tracing::warn!("Unexpected Gemini response structure: {}", body);
    match response.prompt_feedback {
        Some(feedback) => {
            Ok(blocked_message(feedback.block_reason.as_deref().unwrap_or("unspecified")))
        }
        None => Ok(UNEXPECTED_FORMAT.to_string()),
    }
}

#[async_trait]
impl Assistant for GeminiClient {
    async fn generate(&self, prompt: &str) -> String {
        match self.send_prompt(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error calling Gemini API: {}", e);
                failure_message(&e)
            }
        }
    }
}
