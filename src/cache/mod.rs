//! Caching layer for API responses and images

pub mod cached_fetch;
pub mod store;

pub use cached_fetch::{fetch_cached, lookup_cached, Source};
pub use store::{CacheStore, Payload, PayloadKind};
