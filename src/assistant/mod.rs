//! AI assistant integration
//!
//! Forwards a composed prompt to the Gemini `generateContent` endpoint and
//! normalizes whatever comes back into displayable text. Failures never
//! escape `Assistant::generate`; they become the reply.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod prompts;

use async_trait::async_trait;

pub use auth::ApiKeyManager;
pub use client::GeminiClient;
pub use error::AssistantError;
pub use models::GeminiModel;
pub use prompts::{AssistKind, AssistRequest};

/// Contract for the language-model collaborator
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Reply text, or a human-readable error message
    async fn generate(&self, prompt: &str) -> String;
}
