use std::sync::{PoisonError, RwLock};

use super::types::SecurityToken;

/// Holder of the current [`SecurityToken`].
///
/// Every operation is a single short critical section, so readers never see a
/// value paired with the wrong header name.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<SecurityToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SecurityToken {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: SecurityToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Drops the token value; header and field names are kept.
    pub fn clear(&self) {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .value = None;
    }

    /// Back to the initial state, names included.
    pub fn reset(&self) {
        self.set(SecurityToken::default());
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_present()
    }
}
