//! Data models for Gemini API requests and responses

use serde::{Deserialize, Serialize};

/// Available Gemini models
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.0 Flash - fast general model
    #[default]
    Flash20,
    /// Gemini 2.0 Flash-Lite - cheapest option
    FlashLite20,
    /// Gemini 2.5 Flash - newer fast model with thinking
    Flash25,
    /// Gemini 2.5 Pro - most capable
    Pro25,
}

impl GeminiModel {
    /// Get the API model identifier
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Flash20 => "gemini-2.0-flash",
            Self::FlashLite20 => "gemini-2.0-flash-lite",
            Self::Flash25 => "gemini-2.5-flash",
            Self::Pro25 => "gemini-2.5-pro",
        }
    }

    /// Get a human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Flash20 => "Gemini 2.0 Flash",
            Self::FlashLite20 => "Gemini 2.0 Flash-Lite",
            Self::Flash25 => "Gemini 2.5 Flash",
            Self::Pro25 => "Gemini 2.5 Pro",
        }
    }

    /// Parse model from a short name or a model id
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flash" | "flash20" | "flash2.0" | "gemini-2.0-flash" => Some(Self::Flash20),
            "lite" | "flash-lite" | "gemini-2.0-flash-lite" => Some(Self::FlashLite20),
            "flash25" | "flash2.5" | "gemini-2.5-flash" => Some(Self::Flash25),
            "pro" | "pro25" | "pro2.5" | "gemini-2.5-pro" => Some(Self::Pro25),
            _ => None,
        }
    }

    /// List all available models
    pub fn all() -> &'static [GeminiModel] {
        &[Self::Flash20, Self::FlashLite20, Self::Flash25, Self::Pro25]
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown model: {}. Options: flash, lite, flash25, pro", s))
    }
}

/// One text fragment of a message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A message in the conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user message holding one text part
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Some("user".to_string()), parts: vec![Part { text: Some(text.into()) }] }
    }
}

/// Request body for `generateContent`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request for one prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self { contents: vec![Content::user(prompt)] }
    }
}

/// One generated answer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Why the prompt was rejected
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Response body of `generateContent`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first()?.content.as_ref()?.parts.first()?.text.as_deref()
    }
}
