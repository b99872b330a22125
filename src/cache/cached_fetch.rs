use crate::api::Fetcher;
use crate::cache::{CacheStore, Payload, PayloadKind};
use crate::error::LookupResult;
use crate::request::RequestKey;

/// Where a payload returned by [`lookup_cached`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fetched,
}

/// Resolve a key, checking the cache first.
///
/// On a miss the fetcher is called exactly once and its payload is stored
/// before being returned. Fetch failures are returned as-is and nothing is
/// cached for them.
pub fn fetch_cached<F: Fetcher + ?Sized>(
    cache: &CacheStore,
    fetcher: &F,
    key: &RequestKey,
    kind: PayloadKind,
) -> LookupResult<Payload> {
    lookup_cached(cache, fetcher, key, kind).map(|(payload, _)| payload)
}

/// Same as [`fetch_cached`], also reporting whether the fetcher was used
pub fn lookup_cached<F: Fetcher + ?Sized>(
    cache: &CacheStore,
    fetcher: &F,
    key: &RequestKey,
    kind: PayloadKind,
) -> LookupResult<(Payload, Source)> {
    // Check cache first
    if let Some(payload) = cache.get(key)? {
        return Ok((payload, Source::Cache));
    }

    log::info!("Cache miss for {}, fetching", key);
    let payload = fetcher.resolve(key, kind)?;

    cache.set(key, &payload)?;

    Ok((payload, Source::Fetched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use serde_json::json;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Returns a fixed payload and counts calls
    struct StubFetcher {
        payload: Option<Payload>,
        calls: Cell<usize>,
    }

    impl StubFetcher {
        fn returning(payload: Payload) -> Self {
            Self {
                payload: Some(payload),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                payload: None,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn resolve(&self, key: &RequestKey, _kind: PayloadKind) -> LookupResult<Payload> {
            self.calls.set(self.calls.get() + 1);
            self.payload.clone().ok_or_else(|| LookupError::HttpStatus {
                url: key.to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        }
    }

    fn create_test_cache() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheStore::open(temp_dir.path()).unwrap();
        (cache, temp_dir)
    }

    #[test]
    fn test_miss_fetches_once_then_hits() {
        let (cache, _temp_dir) = create_test_cache();
        let fetcher = StubFetcher::returning(Payload::Structured(json!({"data": []})));
        let key = RequestKey::from_url("https://example.com/cardinfo.php?name=X");

        let first = fetch_cached(&cache, &fetcher, &key, PayloadKind::Structured).unwrap();
        let second = fetch_cached(&cache, &fetcher, &key, PayloadKind::Structured).unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[test]
    fn test_prepopulated_entry_never_fetches() {
        let (cache, _temp_dir) = create_test_cache();
        let fetcher = StubFetcher::failing();
        let key = RequestKey::from_url("https://example.com/cards/1.jpg");
        cache.set(&key, &Payload::Binary(vec![7, 7, 7])).unwrap();

        let payload = fetch_cached(&cache, &fetcher, &key, PayloadKind::Binary).unwrap();

        assert_eq!(payload, Payload::Binary(vec![7, 7, 7]));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[test]
    fn test_fetch_failure_is_not_cached() {
        let (cache, _temp_dir) = create_test_cache();
        let fetcher = StubFetcher::failing();
        let key = RequestKey::from_url("https://example.com/cards/2.jpg");

        let err = fetch_cached(&cache, &fetcher, &key, PayloadKind::Binary).unwrap_err();
        assert!(err.is_fetch_error());
        assert!(cache.get(&key).unwrap().is_none());

        // A second attempt goes back to the fetcher
        let _ = fetch_cached(&cache, &fetcher, &key, PayloadKind::Binary);
        assert_eq!(fetcher.calls.get(), 2);
    }

    #[test]
    fn test_lookup_reports_source() {
        let (cache, _temp_dir) = create_test_cache();
        let fetcher = StubFetcher::returning(Payload::Binary(vec![1]));
        let key = RequestKey::from_url("https://example.com/cards/3.jpg");

        let (_, first) = lookup_cached(&cache, &fetcher, &key, PayloadKind::Binary).unwrap();
        let (_, second) = lookup_cached(&cache, &fetcher, &key, PayloadKind::Binary).unwrap();

        assert_eq!(first, Source::Fetched);
        assert_eq!(second, Source::Cache);
    }
}
