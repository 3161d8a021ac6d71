//! Forwarding to the attendance backend.

pub mod client;

pub use client::ProxyClient;
