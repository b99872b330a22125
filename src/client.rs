//! Card and image lookups composed from the request builder, the cache and a fetcher.

use crate::api::{Fetcher, HttpFetcher};
use crate::cache::{fetch_cached, lookup_cached, CacheStore, PayloadKind, Source};
use crate::config::LookupConfig;
use crate::error::{LookupError, LookupResult};
use crate::models::{CardRecord, ImageSize};
use crate::request::{Filters, RequestBuilder, RequestKey, Selector};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Cache-first client for card data and card images
pub struct CardClient<F: Fetcher = HttpFetcher> {
    builder: RequestBuilder,
    cache: CacheStore,
    fetcher: F,
    random_url: String,
    image_url: String,
    image_save_dir: Option<PathBuf>,
}

impl CardClient<HttpFetcher> {
    /// Create a client that talks HTTP to the configured endpoints
    pub fn new(config: LookupConfig) -> LookupResult<Self> {
        let fetcher = HttpFetcher::with_user_agent(config.user_agent.clone());
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> CardClient<F> {
    /// Create a client around any [`Fetcher`]
    pub fn with_fetcher(config: LookupConfig, fetcher: F) -> LookupResult<Self> {
        let cache = CacheStore::open(&config.cache_dir)?.clear_on_close(config.clear_on_close);
        let builder = RequestBuilder::new(config.base_url).with_order(config.key_order);

        Ok(Self {
            builder,
            cache,
            fetcher,
            random_url: config.random_url,
            image_url: config.image_url,
            image_save_dir: config.image_save_dir,
        })
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Look up cards matching a selector and filters
    pub fn cards(&self, selector: &Selector, filters: &Filters) -> LookupResult<CardSet> {
        let key = self.builder.build(selector, filters)?;
        let response =
            fetch_cached(&self.cache, &self.fetcher, &key, PayloadKind::Structured)?
                .into_structured()?;
        Ok(CardSet { key, response })
    }

    /// Fetch a random card, optionally keeping only `fields`.
    ///
    /// The random endpoint is a fixed key, so within one cache lifetime
    /// repeated calls return the same card.
    pub fn random(&self, fields: Option<&[&str]>) -> LookupResult<Value> {
        let key = RequestKey::from_url(self.random_url.as_str());
        let card = fetch_cached(&self.cache, &self.fetcher, &key, PayloadKind::Structured)?
            .into_structured()?;
        Ok(match fields {
            Some(fields) => project(&card, fields),
            None => card,
        })
    }

    /// Resolve the card a selector points at, ready for image fetches.
    ///
    /// `Name` matches the first record whose name is equal ignoring case,
    /// `FName` the first whose name contains the value ignoring case.
    pub fn image(&self, selector: &Selector) -> LookupResult<CardImage<'_, F>> {
        let wanted = selector.value().ok_or(LookupError::MissingSelector)?;
        let card_set = self.cards(selector, &Filters::new())?;

        let wanted_lower = wanted.to_lowercase();
        let record = card_set
            .records()
            .into_iter()
            .find(|record| {
                let name = record.name.to_lowercase();
                match selector {
                    Selector::Name(_) => name == wanted_lower,
                    _ => name.contains(&wanted_lower),
                }
            })
            .ok_or_else(|| LookupError::NotFound(wanted.to_string()))?;

        log::debug!("Resolved '{}' to card id {}", wanted, record.id);
        Ok(CardImage {
            client: self,
            selector: selector.clone(),
            record,
            save_dir: self.image_save_dir.clone(),
        })
    }

    /// Remove every cached entry
    pub fn clear_cache(&self) -> LookupResult<()> {
        self.cache.clear()
    }

    /// Close the client, wiping the cache if configured to
    pub fn close(self) -> LookupResult<()> {
        self.cache.close()
    }
}

/// Response of a card info lookup
#[derive(Debug, Clone)]
pub struct CardSet {
    key: RequestKey,
    response: Value,
}

impl CardSet {
    /// The request key this response is cached under
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// The raw response document
    pub fn response(&self) -> &Value {
        &self.response
    }

    /// Card records from the `data` list, optionally reduced to `fields`.
    /// Names missing from a record are skipped.
    pub fn data(&self, fields: Option<&[&str]>) -> Vec<Value> {
        let Some(items) = self.response.get("data").and_then(Value::as_array) else {
            return Vec::new();
        };
        match fields {
            Some(fields) => items.iter().map(|item| project(item, fields)).collect(),
            None => items.clone(),
        }
    }

    /// Records that carry at least an id and a name
    pub fn records(&self) -> Vec<CardRecord> {
        self.data(None)
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }
}

/// A resolved card whose images can be fetched
pub struct CardImage<'a, F: Fetcher = HttpFetcher> {
    client: &'a CardClient<F>,
    selector: Selector,
    record: CardRecord,
    save_dir: Option<PathBuf>,
}

impl<F: Fetcher> CardImage<'_, F> {
    pub fn id(&self) -> u64 {
        self.record.id
    }

    pub fn record(&self) -> &CardRecord {
        &self.record
    }

    /// Write freshly fetched images into `dir` as `<selector>.jpg`
    pub fn save_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    /// Path an image would be saved at, if saving is enabled.
    ///
    /// Always a direct child of the save directory.
    pub fn save_path(&self) -> Option<PathBuf> {
        let stem = self.selector.value()?;
        self.save_dir
            .as_ref()
            .map(|dir| dir.join(image_file_name(stem)))
    }

    /// Image bytes for `size`, cache first
    pub fn fetch(&self, size: ImageSize) -> LookupResult<Vec<u8>> {
        let key = size.image_key(&self.client.image_url, self.record.id);
        let (payload, source) = lookup_cached(
            &self.client.cache,
            &self.client.fetcher,
            &key,
            PayloadKind::Binary,
        )?;
        let bytes = payload.into_binary()?;

        if source == Source::Fetched {
            if let Some(path) = self.save_path() {
                save_image(&path, &bytes);
            }
        }

        Ok(bytes)
    }
}

/// `<stem>.jpg` with path separators replaced, e.g. "D/D/D" -> "D_D_D.jpg"
fn image_file_name(stem: &str) -> String {
    format!("{}.jpg", stem.replace(['/', '\\'], "_"))
}

fn save_image(path: &Path, bytes: &[u8]) {
    if let Err(e) = std::fs::write(path, bytes) {
        log::warn!("Failed to save image to {}: {}", path.display(), e);
    } else {
        log::info!("Saved image to {}", path.display());
    }
}

/// Keep only `fields` of a JSON object; non-objects become an empty object
fn project(item: &Value, fields: &[&str]) -> Value {
    let mut out = Map::new();
    if let Some(object) = item.as_object() {
        for field in fields {
            if let Some(value) = object.get(*field) {
                out.insert(field.to_string(), value.clone());
            }
        }
    }
    Value::Object(out)
}
