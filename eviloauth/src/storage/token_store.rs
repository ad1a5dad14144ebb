use super::errors::StorageError;
use super::types::{Entries, TokenStore};
use crate::token::{Token, TokenError};

impl Entries {
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.tokens.contains_key(key)
    }

    /// Move the entry at `from` to `to`, keeping its list position.
    ///
    /// Any entry already at `to` is dropped. Returns the moved token.
    fn rekey(&mut self, from: &str, to: &str) -> Option<Token> {
        let token = self.tokens.remove(from)?;
        if self.tokens.remove(to).is_some() {
            self.order.retain(|k| k != to);
        }
        if let Some(slot) = self.order.iter_mut().find(|k| k.as_str() == from) {
            *slot = to.to_string();
        }
        Some(token)
    }

    fn check_conflict(&self, from: &str, to: &str, raw: &str) -> Result<(), StorageError> {
        match self.tokens.get(to) {
            Some(existing) if existing.raw() != raw => Err(StorageError::KeyConflict {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token under its derived key.
    ///
    /// An existing entry with the same key is replaced in place (last write wins).
    pub async fn add(&self, token: Token) -> String {
        let key = token.key();
        let mut entries = self.inner.write().await;
        if entries.tokens.insert(key.clone(), token).is_none() {
            entries.order.push(key.clone());
            tracing::info!(key = %key, "Token added to store");
        } else {
            tracing::info!(key = %key, "Token replaced in store");
        }
        key
    }

    /// Remove a token. Returns false when the key was not present.
    pub async fn delete(&self, key: &str) -> bool {
        let mut entries = self.inner.write().await;
        if entries.tokens.remove(key).is_none() {
            return false;
        }
        entries.order.retain(|k| k != key);
        tracing::info!(key = %key, "Token deleted from store");
        true
    }

    pub async fn get(&self, key: &str) -> Result<Token, StorageError> {
        self.inner
            .read()
            .await
            .tokens
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.tokens.contains_key(key)
    }

    /// Keys in insertion order.
    pub async fn list(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Move the token at `old_key` to `new_key` in a single write.
    ///
    /// Fails with `KeyConflict` when `new_key` holds a token with a different raw
    /// value; an entry carrying the same raw value is replaced. The moved token keeps
    /// the list position of `old_key`.
    pub async fn rename(&self, old_key: &str, new_key: &str) -> Result<(), StorageError> {
        let mut entries = self.inner.write().await;
        let raw = entries
            .tokens
            .get(old_key)
            .map(|t| t.raw().to_string())
            .ok_or_else(|| StorageError::NotFound(old_key.to_string()))?;

        if old_key == new_key {
            return Ok(());
        }
        entries.check_conflict(old_key, new_key, &raw)?;

        if let Some(token) = entries.rekey(old_key, new_key) {
            entries.tokens.insert(new_key.to_string(), token);
        }
        tracing::info!(from = %old_key, to = %new_key, "Token renamed");
        Ok(())
    }

    /// Apply `mutate` to the token at `key` and store it under its re-derived key.
    ///
    /// Mutation, conflict check and re-key happen under one write lock. On any error
    /// the stored token is left untouched. Returns the key the token ends up under.
    pub async fn update<F>(&self, key: &str, mutate: F) -> Result<String, StorageError>
    where
        F: FnOnce(&mut Token) -> Result<(), TokenError>,
    {
        let mut entries = self.inner.write().await;
        let mut updated = entries
            .tokens
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        mutate(&mut updated)?;

        let new_key = updated.key();
        if new_key != key {
            entries.check_conflict(key, &new_key, updated.raw())?;
            entries.rekey(key, &new_key);
            tracing::info!(from = %key, to = %new_key, "Token re-keyed after update");
        }
        entries.tokens.insert(new_key.clone(), updated);
        Ok(new_key)
    }

    pub(crate) async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, Entries> {
        self.inner.read().await
    }
}
