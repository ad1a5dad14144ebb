use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::StorageError;
use super::types::{TargetSelector, TokenStore};
use crate::token::Token;

impl TargetSelector {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Select `key` as the target.
    ///
    /// The store read guard is held while the target is written, so a concurrent
    /// delete of the same key either lands first (and this fails) or waits until
    /// the target is set.
    pub async fn set(&self, key: &str) -> Result<(), StorageError> {
        let mut current = self.current.lock().await;
        let entries = self.store.read().await;
        if !entries.contains(key) {
            return Err(StorageError::UnknownToken(key.to_string()));
        }
        *current = Some(key.to_string());
        tracing::info!(key = %key, "Target set");
        Ok(())
    }

    pub async fn get(&self) -> Option<String> {
        self.current.lock().await.clone()
    }

    pub async fn clear(&self) {
        *self.current.lock().await = None;
    }

    /// Clear the target only if it points at `key`.
    pub async fn clear_if(&self, key: &str) -> bool {
        let mut current = self.current.lock().await;
        if current.as_deref() == Some(key) {
            *current = None;
            tracing::info!(key = %key, "Target cleared");
            true
        } else {
            false
        }
    }

    /// Point the target at `new_key` if it currently names `old_key`.
    pub async fn follow_rename(&self, old_key: &str, new_key: &str) {
        let mut current = self.current.lock().await;
        if current.as_deref() == Some(old_key) {
            *current = Some(new_key.to_string());
        }
    }

    /// Resolve the target to its token for a module run.
    pub async fn resolve(&self) -> Result<Token, StorageError> {
        let key = self.get().await.ok_or(StorageError::NoTarget)?;
        self.store
            .get(&key)
            .await
            .map_err(|_| StorageError::StaleTarget(key))
    }
}
