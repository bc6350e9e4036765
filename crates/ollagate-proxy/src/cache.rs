//! Last successful `/api/tags` listing.
//!
//! The listing is computed outside the lock and swapped in whole, so no
//! reader ever sees a half-written value. Readers take the same lock.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ollama_models::ListResponse;

#[derive(Debug, Default)]
pub struct ListingCache {
    last: Mutex<Option<Arc<ListResponse>>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached listing.
    pub async fn replace(&self, listing: Arc<ListResponse>) {
        *self.last.lock().await = Some(listing);
    }

    /// Snapshot of the last stored listing, if any.
    pub async fn last(&self) -> Option<Arc<ListResponse>> {
        self.last.lock().await.clone()
    }
}
