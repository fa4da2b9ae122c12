//! Global application state.
//!
//! Used for access to common resources such as the item repository.

use crate::feature::item::item_repository::ItemRepository;
use axum::extract::FromRef;
use std::sync::Arc;

/// A shared handle to whichever item repository the application runs with.
pub type ItemStore = Arc<dyn ItemRepository>;

/// Global application state.
#[derive(Clone, FromRef)]
pub struct AppState {
    items: ItemStore,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(items: impl ItemRepository + 'static) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}
