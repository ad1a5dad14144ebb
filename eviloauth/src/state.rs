use crate::idp::IdpSessionHolder;
use crate::storage::{TargetSelector, TokenStore};

/// State shared by the capture listener and the console.
///
/// Each part guards itself; clones share the same underlying data.
#[derive(Debug, Clone)]
pub struct SharedState {
    pub tokens: TokenStore,
    pub target: TargetSelector,
    pub idp: IdpSessionHolder,
}

impl SharedState {
    pub fn new() -> Self {
        let tokens = TokenStore::new();
        let target = TargetSelector::new(tokens.clone());
        Self {
            tokens,
            target,
            idp: IdpSessionHolder::new(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
