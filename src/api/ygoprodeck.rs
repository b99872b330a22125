//! YGOPRODeck HTTP client
//!
//! Uses the blocking reqwest client; one request per call, no retries.

use super::Fetcher;
use crate::cache::{Payload, PayloadKind};
use crate::error::{LookupError, LookupResult};
use crate::request::RequestKey;
use serde::Deserialize;

/// Card info endpoint
pub const BASE_URL: &str = "https://db.ygoprodeck.com/api/v7/cardinfo.php";
/// Random card endpoint, also used verbatim as its cache key
pub const RANDOM_URL: &str = "https://db.ygoprodeck.com/api/v7/randomcard.php";
/// Root of the card image host
pub const IMAGE_URL: &str = "https://images.ygoprodeck.com/images";

/// User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("ygo_lookup/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the card info endpoint, e.g. on a query with no matches
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// [`Fetcher`] backed by HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            user_agent: user_agent.into(),
        }
    }

    fn get(&self, url: &str) -> LookupResult<reqwest::blocking::Response> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The API reports "no card matching your query" as a JSON error body
        let body = response.text().unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(api_error) => Err(LookupError::ApiResponse {
                status,
                message: api_error.error,
            }),
            Err(_) => Err(LookupError::HttpStatus {
                url: url.to_string(),
                status,
            }),
        }
    }

    /// Fetch and parse a JSON document
    pub fn fetch_json(&self, url: &str) -> LookupResult<serde_json::Value> {
        log::info!("Fetching JSON: {}", url);
        Ok(self.get(url)?.json::<serde_json::Value>()?)
    }

    /// Fetch raw bytes (card images)
    pub fn fetch_bytes(&self, url: &str) -> LookupResult<Vec<u8>> {
        log::info!("Fetching image: {}", url);
        Ok(self.get(url)?.bytes()?.to_vec())
    }

    /// Check that the API answers with a success status
    pub fn check_reachable(&self, url: &str) -> LookupResult<()> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()?;

        let status = response.status();
        if status.is_success() {
            log::debug!("{} reachable ({})", url, status);
            Ok(())
        } else {
            Err(LookupError::HttpStatus {
                url: url.to_string(),
                status,
            })
        }
    }
}

impl Fetcher for HttpFetcher {
    fn resolve(&self, key: &RequestKey, kind: PayloadKind) -> LookupResult<Payload> {
        match kind {
            PayloadKind::Structured => self.fetch_json(key.as_str()).map(Payload::Structured),
            PayloadKind::Binary => self.fetch_bytes(key.as_str()).map(Payload::Binary),
        }
    }
}

#[cfg(test)]
#[path = "ygoprodeck_tests.rs"]
mod tests;
