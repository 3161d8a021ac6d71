//! CLI command implementations

pub mod live;
pub mod names;
pub mod query;
pub mod years;
