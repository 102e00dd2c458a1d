//! Explicitly constructed collaborator handles
//!
//! Built once at startup and handed to the controller; dropping it (and the
//! controller) ends the session.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::assistant::{Assistant, GeminiClient};
use crate::config::{Config, DataPaths};
use crate::identity::{IdentityProvider, LocalIdentity};
use crate::store::{CollectionPath, DocumentStore, FileStore};

/// Store, identity and assistant clients for one session
#[derive(Clone)]
pub struct ClientContext {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub assistant: Arc<dyn Assistant>,
    /// Namespace for the collection paths
    pub app_id: String,
    /// Optional bootstrap token for the first sign-in
    pub auth_token: Option<String>,
}

impl ClientContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        assistant: Arc<dyn Assistant>,
        app_id: impl Into<String>,
    ) -> Self {
        Self { store, identity, assistant, app_id: app_id.into(), auth_token: None }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Open the on-disk store and identity and the Gemini client
    pub fn open(config: &Config, paths: &DataPaths) -> Result<Self> {
        std::fs::create_dir_all(&paths.root)
            .with_context(|| format!("Failed to create data directory {:?}", paths.root))?;

        let store = FileStore::open(paths.store())
            .with_context(|| format!("Failed to open store at {:?}", paths.store()))?;
        let identity = LocalIdentity::open(paths.identity())
            .with_context(|| format!("Failed to open identity at {:?}", paths.identity()))?;
        let assistant =
            GeminiClient::new(config.gemini_model).with_base_url(config.gemini_base_url.clone());

        tracing::info!(
            "Opened data directory {} (app {}, model {})",
            paths.root.display(),
            config.app_id,
            config.gemini_model.display_name()
        );

        Ok(Self::new(Arc::new(store), Arc::new(identity), Arc::new(assistant), config.app_id.clone())
            .with_auth_token(config.auth_token.clone()))
    }

    /// Shared catalog collection
    pub fn catalog_path(&self) -> CollectionPath {
        CollectionPath::catalog(&self.app_id)
    }

    /// Progress collection of one principal
    pub fn progress_path(&self, uid: &str) -> CollectionPath {
        CollectionPath::progress(&self.app_id, uid)
    }
}
