//! API key storage for the completion service.
//!
//! The key lives in memory as a [`SecretString`] and is never logged. It is
//! seeded from the `OPENAI_API_KEY` environment variable, or outside
//! production from a key file in the data directory. Keys set at runtime
//! through the admin API are written back to that file when persistence is
//! enabled.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;

/// Prefix every accepted OpenAI key carries.
pub const API_KEY_PREFIX: &str = "sk-";

/// Environment variable the key is read from at startup.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("invalid API key: must start with 'sk-'")]
    Invalid,

    #[error("failed to persist API key: {0}")]
    Persist(String),
}

/// In-memory API key holder with optional file persistence.
pub struct ApiKeyStore {
    key: RwLock<Option<SecretString>>,
    persist_path: Option<PathBuf>,
}

impl ApiKeyStore {
    pub fn new(initial: Option<SecretString>, persist_path: Option<PathBuf>) -> Self {
        Self {
            key: RwLock::new(initial),
            persist_path,
        }
    }

    /// Build the store from the environment value or, failing that, the key
    /// file at `persist_path`.
    pub async fn load(env_key: Option<String>, persist_path: Option<PathBuf>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            tracing::info!("API key loaded from environment");
            return Self::new(Some(SecretString::from(key.trim().to_string())), persist_path);
        }

        let mut initial = None;
        if let Some(path) = &persist_path {
            match tokio::fs::read_to_string(path).await {
                Ok(content) if !content.trim().is_empty() => {
                    tracing::info!(path = %path.display(), "API key loaded from file");
                    initial = Some(SecretString::from(content.trim().to_string()));
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!(
                        path = %path.display(),
                        env = API_KEY_ENV,
                        "no API key file; set the environment variable or use the admin API"
                    );
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read API key file");
                }
            }
        }

        Self::new(initial, persist_path)
    }

    pub async fn has_key(&self) -> bool {
        self.key.read().await.is_some()
    }

    /// Current key, if configured.
    pub async fn get(&self) -> Option<SecretString> {
        self.key
            .read()
            .await
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_string()))
    }

    /// Replace the key. Memory is updated before the file is written.
    pub async fn set(&self, key: &str) -> Result<(), ApiKeyError> {
        let key = key.trim();
        if !key.starts_with(API_KEY_PREFIX) {
            return Err(ApiKeyError::Invalid);
        }

        *self.key.write().await = Some(SecretString::from(key.to_string()));

        match &self.persist_path {
            Some(path) => {
                tokio::fs::write(path, key).await.map_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "failed to persist API key");
                    ApiKeyError::Persist(e.to_string())
                })?;
                tracing::info!(path = %path.display(), "API key updated and persisted");
            }
            None => tracing::info!("API key updated (not persisted)"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_prefers_environment() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api_key.txt");
        tokio::fs::write(&path, "sk-from-file").await.unwrap();

        let store = ApiKeyStore::load(Some("sk-from-env".to_string()), Some(path)).await;
        assert_eq!(store.get().await.unwrap().expose_secret(), "sk-from-env");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api_key.txt");
        tokio::fs::write(&path, "sk-from-file\n").await.unwrap();

        let store = ApiKeyStore::load(None, Some(path)).await;
        assert_eq!(store.get().await.unwrap().expose_secret(), "sk-from-file");
    }

    #[tokio::test]
    async fn test_load_without_sources_has_no_key() {
        let tmp = TempDir::new().unwrap();
        let store = ApiKeyStore::load(Some("  ".to_string()), Some(tmp.path().join("missing.txt"))).await;
        assert!(!store.has_key().await);
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_set_rejects_bad_prefix() {
        let store = ApiKeyStore::new(None, None);
        assert!(matches!(store.set("pk-123").await, Err(ApiKeyError::Invalid)));
        assert!(!store.has_key().await);
    }

    #[tokio::test]
    async fn test_set_persists_when_enabled() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api_key.txt");
        let store = ApiKeyStore::new(None, Some(path.clone()));

        store.set("sk-new").await.unwrap();

        assert!(store.has_key().await);
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "sk-new");
    }

    #[tokio::test]
    async fn test_set_without_persistence_stays_in_memory() {
        let store = ApiKeyStore::new(None, None);
        store.set("sk-memory").await.unwrap();
        assert_eq!(store.get().await.unwrap().expose_secret(), "sk-memory");
    }
}
