//! Identity provider
//!
//! Issues the principal whose id scopes the progress collection. The local
//! provider remembers the signed-in principal in `identity.json` so a later
//! run resumes the same session instead of minting a new anonymous id.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

/// Errors that can occur while signing in
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The bootstrap token cannot be exchanged for a principal
    #[error("Invalid custom token")]
    InvalidToken,

    /// The principal could not be persisted or restored
    #[error("Identity storage error: {0}")]
    Storage(String),
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user id
    pub uid: String,
    /// Whether the principal was created anonymously
    pub anonymous: bool,
}

/// Contract for the identity collaborator
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The principal already signed in, if any
    fn current(&self) -> Option<Principal>;

    /// Create a fresh anonymous principal
    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError>;

    /// Exchange a bootstrap token for a principal
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Principal, IdentityError>;

    /// Drop the current principal
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Observe principal changes (the receiver starts at the current value)
    fn on_auth_state_change(&self) -> watch::Receiver<Option<Principal>>;
}

/// Identity provider that lives on this machine
pub struct LocalIdentity {
    /// Where the principal is remembered; `None` keeps it in memory only
    path: Option<PathBuf>,
    state: Arc<Mutex<Option<Principal>>>,
    tx: watch::Sender<Option<Principal>>,
}

impl LocalIdentity {
    /// Open the provider, restoring a principal saved at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IdentityError> {
        let path = path.into();
        let principal = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| IdentityError::Storage(e.to_string()))?;
            Some(
                serde_json::from_str(&contents)
                    .map_err(|e| IdentityError::Storage(e.to_string()))?,
            )
        } else {
            None
        };
        Ok(Self::build(Some(path), principal))
    }

    /// Provider with no persistence
    pub fn ephemeral() -> Self {
        Self::build(None, None)
    }

    fn build(path: Option<PathBuf>, principal: Option<Principal>) -> Self {
        let (tx, _rx) = watch::channel(principal.clone());
        Self { path, state: Arc::new(Mutex::new(principal)), tx }
    }

    /// Record the new principal, persist it, and notify observers
    fn switch_to(&self, principal: Option<Principal>) -> Result<(), IdentityError> {
        if let Some(path) = &self.path {
            match &principal {
                Some(p) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| IdentityError::Storage(e.to_string()))?;
                    }
                    let contents = serde_json::to_string_pretty(p)
                        .map_err(|e| IdentityError::Storage(e.to_string()))?;
                    std::fs::write(path, contents)
                        .map_err(|e| IdentityError::Storage(e.to_string()))?;
                }
                None if path.exists() => {
                    std::fs::remove_file(path)
                        .map_err(|e| IdentityError::Storage(e.to_string()))?;
                }
                None => {}
            }
        }

        let mut guard =
            self.state.lock().map_err(|_| IdentityError::Storage("lock poisoned".into()))?;
        *guard = principal.clone();
        drop(guard);

        self.tx.send_replace(principal);
        Ok(())
    }

    /// Validate a custom token and turn it into a user id
    fn uid_from_token(token: &str) -> Result<String, IdentityError> {
        let token = token.trim();
        if token.is_empty() || token.contains('/') || token.chars().any(char::is_whitespace) {
            return Err(IdentityError::InvalidToken);
        }
        Ok(token.to_string())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn current(&self) -> Option<Principal> {
        self.state.lock().ok().and_then(|guard| guard.clone())
    }

    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError> {
        let principal = Principal { uid: Uuid::new_v4().simple().to_string(), anonymous: true };
        self.switch_to(Some(principal.clone()))?;
        tracing::info!("Signed in anonymously as {}", principal.uid);
        Ok(principal)
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Principal, IdentityError> {
        let principal = Principal { uid: Self::uid_from_token(token)?, anonymous: false };
        self.switch_to(Some(principal.clone()))?;
        tracing::info!("Signed in with custom token as {}", principal.uid);
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.switch_to(None)?;
        tracing::info!("Signed out");
        Ok(())
    }

    fn on_auth_state_change(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn anonymous_sign_in_mints_new_ids() {
        let identity = LocalIdentity::ephemeral();
        assert!(identity.current().is_none());

        let first = identity.sign_in_anonymously().await.unwrap();
        assert!(first.anonymous);
        assert_eq!(first.uid.len(), 32);
        assert_eq!(identity.current(), Some(first.clone()));

        let second = identity.sign_in_anonymously().await.unwrap();
        assert_ne!(first.uid, second.uid);
    }

    #[tokio::test]
    async fn custom_token_becomes_uid() {
        let identity = LocalIdentity::ephemeral();
        let principal = identity.sign_in_with_custom_token(" user-42 ").await.unwrap();
        assert_eq!(principal.uid, "user-42");
        assert!(!principal.anonymous);
    }

    #[tokio::test]
    async fn malformed_tokens_are_rejected() {
        let identity = LocalIdentity::ephemeral();
        for token in ["", "   ", "a/b", "two words"] {
            assert!(matches!(
                identity.sign_in_with_custom_token(token).await,
                Err(IdentityError::InvalidToken)
            ));
        }
        assert!(identity.current().is_none());
    }

    #[tokio::test]
    async fn principal_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("identity.json");

        let uid = {
            let identity = LocalIdentity::open(&path).unwrap();
            identity.sign_in_anonymously().await.unwrap().uid
        };

        let reopened = LocalIdentity::open(&path).unwrap();
        assert_eq!(reopened.current().map(|p| p.uid), Some(uid));

        reopened.sign_out().await.unwrap();
        assert!(!path.exists());
        assert!(LocalIdentity::open(&path).unwrap().current().is_none());
    }

    #[tokio::test]
    async fn observers_see_changes() {
        let identity = LocalIdentity::ephemeral();
        let mut rx = identity.on_auth_state_change();
        assert!(rx.borrow().is_none());

        let principal = identity.sign_in_with_custom_token("abc").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().clone(), Some(principal));
    }
}
