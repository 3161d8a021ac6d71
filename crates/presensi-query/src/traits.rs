//! Seams between the cache layer and the network.

use async_trait::async_trait;

use crate::error::QueryResult;
use crate::key::QueryKey;
use crate::models::QueryPage;

/// Issues the network request for one query key.
///
/// Implementations perform exactly one request per call and classify
/// failures into [`crate::QueryError`]; they never touch the cache.
#[async_trait]
pub trait FetchExecutor: Send + Sync {
    async fn execute(&self, key: &QueryKey) -> QueryResult<QueryPage>;
}

/// Backend-side cache that can be asked to drop its copy of the dataset.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn clear_remote_cache(&self) -> QueryResult<()>;
}
