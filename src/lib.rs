//! ygo_lookup - Yu-Gi-Oh! card lookups with a response cache
//!
//! Builds validated YGOPRODeck query URLs, fetches card data and card images,
//! and memoizes both JSON and binary responses in a content-addressed
//! directory keyed by the SHA-256 of the request URL.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod request;

// Re-export commonly used items
pub use api::{Fetcher, HttpFetcher};
pub use cache::{fetch_cached, CacheStore, Payload, PayloadKind};
pub use client::{CardClient, CardImage, CardSet};
pub use config::LookupConfig;
pub use error::{LookupError, LookupResult};
pub use models::{CardRecord, ImageSize};
pub use params::{Field, ParameterValidator};
pub use request::{Filters, KeyOrder, RequestBuilder, RequestKey, Selector};
