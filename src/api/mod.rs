//! Upstream access behind the [`Fetcher`] boundary

pub mod ygoprodeck;

use crate::cache::{Payload, PayloadKind};
use crate::error::LookupResult;
use crate::request::RequestKey;

pub use ygoprodeck::{HttpFetcher, BASE_URL, DEFAULT_USER_AGENT, IMAGE_URL, RANDOM_URL};

/// Resolves a request key to a payload. Only consulted on a cache miss.
///
/// `kind` says how the response body should be read: parsed as JSON or
/// kept as raw bytes.
pub trait Fetcher {
    fn resolve(&self, key: &RequestKey, kind: PayloadKind) -> LookupResult<Payload>;
}
