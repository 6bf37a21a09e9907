use pl_database::PriceStore;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

/// Shared state for the price handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self {
            store,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
