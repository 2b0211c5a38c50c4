//! Global application state.
//!
//! Used for access to common resources such as the greeting store.

use crate::api::greeting::greeting_repository::GreetingStore;
use axum::extract::FromRef;

/// Global application state.
#[derive(Clone, Debug, FromRef)]
pub struct AppState {
    store: GreetingStore,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(store: GreetingStore) -> Self {
        Self { store }
    }

    /// Returns the greeting store.
    pub fn store(&self) -> &GreetingStore {
        &self.store
    }
}
