//! presensi Query Layer
//!
//! Client-side query and cache layer for paginated, searchable attendance
//! records.
//!
//! # Modules
//!
//! - [`coordinator`] - Draft/active search state, year and page
//! - [`key`] - Cache keys and search filter parsing
//! - [`cache`] - In-memory store with request deduplication and expiry
//! - [`client`] - HTTP client for the attendance API
//! - [`refresh`] - Local invalidation and backend cache clearing
//! - [`session`] - Everything above wired together for one user
//!
//! # Example
//!
//! ```no_run
//! use presensi_query::{PresenceSession, QueryConfig, QueryView};
//!
//! # async fn run() -> presensi_query::QueryResult<()> {
//! let mut session = PresenceSession::connect(&QueryConfig::from_env())?;
//! session.change_year("2024");
//! session.submit_search("Jane");
//!
//! if let QueryView::Ready(results) = session.load().await {
//!     println!("{} rows", results.page.items.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod dates;
pub mod debounce;
pub mod error;
pub mod key;
pub mod models;
pub mod privacy;
pub mod refresh;
pub mod session;
pub mod traits;

pub use cache::{CacheConfig, CacheSnapshot, CacheStats, CacheStore};
pub use client::PresenceClient;
pub use config::{QueryConfig, RetryConfig};
pub use coordinator::{Phase, SearchCoordinator, SearchState};
pub use dates::{available_years, current_available_years, FIRST_DATA_YEAR};
pub use debounce::Debouncer;
pub use error::{QueryError, QueryResult, RefreshError};
pub use key::{build_key, KeyMatcher, QueryKey, SearchFilter};
pub use models::{
    DurationBand, NameDirectory, PaginationInfo, PresenceRecord, QueryPage, QueryRequest,
};
pub use refresh::RefreshController;
pub use session::{PresenceSession, QueryView, ResultsView};
pub use traits::{FetchExecutor, RemoteCache};
