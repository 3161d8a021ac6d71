//! Manual refresh: local invalidation plus backend cache clearing.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::error::RefreshError;
use crate::key::KeyMatcher;
use crate::traits::RemoteCache;

pub struct RefreshController {
    store: Arc<CacheStore>,
    remote: Arc<dyn RemoteCache>,
}

impl RefreshController {
    pub fn new(store: Arc<CacheStore>, remote: Arc<dyn RemoteCache>) -> Self {
        Self { store, remote }
    }

    /// Mark matching entries stale. Their data stays visible until the
    /// refetch lands.
    pub fn invalidate(&self, matcher: &KeyMatcher) -> usize {
        self.store.invalidate(matcher)
    }

    /// Clear the backend cache, then invalidate matching entries locally.
    ///
    /// Local invalidation happens whatever the backend answers. A backend
    /// failure is reported as [`RefreshError::RemotePurgeFailed`] carrying
    /// the number of entries invalidated.
    pub async fn purge_remote(&self, matcher: &KeyMatcher) -> Result<usize, RefreshError> {
        let remote = self.remote.clear_remote_cache().await;
        let invalidated = self.store.invalidate(matcher);

        match remote {
            Ok(()) => {
                info!(invalidated, "Refreshed query cache");
                Ok(invalidated)
            }
            Err(source) => {
                warn!(invalidated, error = %source, "Backend cache clear failed, cache clearing may be incomplete");
                Err(RefreshError::RemotePurgeFailed {
                    invalidated,
                    source,
                })
            }
        }
    }
}
