use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::token::Token;

/// Keyed tokens plus the order their keys were first inserted.
///
/// `order` and `tokens` always hold the same key set; both are only touched
/// while the store's write lock is held.
#[derive(Debug, Default)]
pub(crate) struct Entries {
    pub(super) order: Vec<String>,
    pub(super) tokens: HashMap<String, Token>,
}

/// Captured tokens shared between the capture endpoints and the console.
///
/// Cloning is cheap and every clone sees the same entries. Mutations are
/// serialized by a single writer lock; readers never observe half of a rename.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    pub(super) inner: Arc<RwLock<Entries>>,
}

/// The token currently selected as the credential for module runs.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    pub(super) store: TokenStore,
    pub(super) current: Arc<Mutex<Option<String>>>,
}
