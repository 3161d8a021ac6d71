//! HTTP client for the attendance API

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::QueryConfig;
use crate::error::{QueryError, QueryResult};
use crate::key::QueryKey;
use crate::models::{NameDirectory, NamesResponse, QueryPage, QueryRequest, QueryResponse};
use crate::traits::{FetchExecutor, RemoteCache};

/// Client for the attendance backend (or the edge proxy in front of it).
///
/// Every method performs exactly one request. Retries and caching belong
/// to [`crate::CacheStore`].
#[derive(Clone)]
pub struct PresenceClient {
    client: Client,
    base_url: String,
}

impl PresenceClient {
    pub fn new(config: &QueryConfig) -> QueryResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| QueryError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Run one attendance query.
    pub async fn query(&self, request: &QueryRequest) -> QueryResult<QueryPage> {
        let url = self.url("data/query");
        debug!(
            url = %url,
            page = request.page,
            page_size = request.page_size,
            year = ?request.year,
            "Querying attendance records"
        );

        let response = self.client.post(&url).json(request).send().await?;
        let body: QueryResponse = decode(response).await?;
        Ok(body.into())
    }

    /// Tutor names keyed by id.
    pub async fn tutors(&self) -> QueryResult<NameDirectory> {
        self.names("tutors").await
    }

    /// Student names keyed by id.
    pub async fn students(&self) -> QueryResult<NameDirectory> {
        self.names("students").await
    }

    async fn names(&self, path: &str) -> QueryResult<NameDirectory> {
        let response = self.client.get(self.url(path)).send().await?;
        let body: NamesResponse = decode(response).await?;
        Ok(body.into())
    }

    /// Ask the backend to drop its cached copy of the dataset.
    pub async fn clear_remote_cache(&self) -> QueryResult<()> {
        let response = self.client.post(self.url("cache/clear")).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::from_response(status, &body));
        }
        info!("Backend cache cleared");
        Ok(())
    }
}

/// Decode a JSON body, classifying non-success statuses first.
async fn decode<T: DeserializeOwned>(response: Response) -> QueryResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(QueryError::from_response(status, &body));
    }

    serde_json::from_str(&body).map_err(Into::into)
}

#[async_trait]
impl FetchExecutor for PresenceClient {
    async fn execute(&self, key: &QueryKey) -> QueryResult<QueryPage> {
        self.query(&key.to_request()).await
    }
}

#[async_trait]
impl RemoteCache for PresenceClient {
    async fn clear_remote_cache(&self) -> QueryResult<()> {
        PresenceClient::clear_remote_cache(self).await
    }
}
