//! HTTP routes of the proxy.

pub mod forward;
pub mod health;

pub use forward::forward_routes;
pub use health::health_routes;
