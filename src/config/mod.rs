//! Configuration management for the tracker

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::assistant::GeminiModel;
use crate::assistant::client::DEFAULT_BASE_URL;
use crate::theme::Theme;

/// Deployment namespace used when none is configured
pub const DEFAULT_APP_ID: &str = "dsa-tracker-app";

/// Environment variable overriding `app_id`
pub const APP_ID_ENV: &str = "CSES_TRACKER_APP_ID";
/// Environment variable overriding `auth_token`
pub const AUTH_TOKEN_ENV: &str = "CSES_TRACKER_AUTH_TOKEN";
/// Environment variable overriding `gemini_model`
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// Namespace for the catalog and progress collections
    pub app_id: String,

    /// Model used for hints and explanations
    pub gemini_model: GeminiModel,

    /// Gemini API host
    pub gemini_base_url: String,

    /// Bootstrap token exchanged for a principal on first sign-in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Tokyo Night".to_string(),
            custom_theme: None,
            app_id: DEFAULT_APP_ID.to_string(),
            gemini_model: GeminiModel::default(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Apply environment overrides, looked up through `var`
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(app_id) = non_empty(APP_ID_ENV) {
            self.app_id = app_id;
        }
        if let Some(token) = non_empty(AUTH_TOKEN_ENV) {
            self.auth_token = Some(token);
        }
        if let Some(model) = non_empty(GEMINI_MODEL_ENV) {
            match GeminiModel::parse(&model) {
                Some(model) => self.gemini_model = model,
                None => tracing::warn!("Ignoring unknown {}={}", GEMINI_MODEL_ENV, model),
            }
        }
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "cses-tracker")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "cses-tracker")
            .context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme.clone().unwrap_or_else(Theme::tokyo_night)
    }
}

/// Files kept under the data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Document store file
    pub fn store(&self) -> PathBuf {
        self.root.join("store.json")
    }

    /// Remembered principal
    pub fn identity(&self) -> PathBuf {
        self.root.join("identity.json")
    }

    /// Log file written while the TUI owns the terminal
    pub fn log(&self) -> PathBuf {
        self.root.join("cses-tracker.log")
    }
}
