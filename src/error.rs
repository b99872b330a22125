//! Error types for ygo_lookup

use crate::params::Field;
use thiserror::Error;

/// Unified error type for lookups, cache access and upstream fetches
#[derive(Debug, Error)]
pub enum LookupError {
    /// An enum-constrained field was given a value outside its domain,
    /// or an image size selector was not recognized
    #[error("Invalid {field} parameter: {value}")]
    InvalidParameter { field: String, value: String },
    /// A field name that is not part of the recognized set
    #[error("Unknown query field: {0}")]
    UnknownField(String),
    /// `name` or `fname` passed as a filter alongside (or instead of) the selector
    #[error("Primary selector '{0}' cannot be used as a filter")]
    ConflictingSelector(Field),
    /// Neither `name` nor `fname` was supplied where one is required
    #[error("Either 'name' or 'fname' is required")]
    MissingSelector,
    /// The upstream answered, but no record matched the selector
    #[error("Card with name '{0}' not found")]
    NotFound(String),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-success status without a readable error body
    #[error("HTTP error {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    /// Non-success status carrying an upstream error message
    #[error("API error {status}: {message}")]
    ApiResponse {
        status: reqwest::StatusCode,
        message: String,
    },
    /// Physical read/write failure in the cache root
    #[error("Cache storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// A structured cache object exists but does not parse
    #[error("Corrupt cache entry {digest}: {source}")]
    CorruptEntry {
        digest: String,
        #[source]
        source: serde_json::Error,
    },
    /// Failed to parse or serialize JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A cached or fetched payload has the other kind than the caller needs
    #[error("Expected {expected} payload, found {found}")]
    UnexpectedPayload {
        expected: &'static str,
        found: &'static str,
    },
}

impl LookupError {
    /// Errors raised by the fetcher boundary (never cached, never retried)
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            LookupError::Network(_)
                | LookupError::HttpStatus { .. }
                | LookupError::ApiResponse { .. }
        )
    }

    /// Errors raised by the cache's physical storage
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            LookupError::Storage(_) | LookupError::CorruptEntry { .. }
        )
    }

    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        LookupError::InvalidParameter {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result alias for ygo_lookup operations
pub type LookupResult<T> = std::result::Result<T, LookupError>;
