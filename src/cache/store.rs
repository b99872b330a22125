//! Content-addressed response store.
//!
//! Each entry lives in the cache root as `<sha256(key)>.json` (structured)
//! or `<sha256(key)>.bin` (binary). Writes go through a temp file in the
//! same directory followed by a rename, so readers never see half an object.

use crate::error::{LookupError, LookupResult};
use crate::request::RequestKey;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const STRUCTURED_EXT: &str = "json";
const BINARY_EXT: &str = "bin";
const TEMP_PREFIX: &str = ".tmp";

/// A cached or fetched response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON response
    Structured(serde_json::Value),
    /// Raw bytes, e.g. a card image
    Binary(Vec<u8>),
}

/// Which representation a payload uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Structured,
    Binary,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Structured => "structured",
            PayloadKind::Binary => "binary",
        }
    }
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Structured(_) => PayloadKind::Structured,
            Payload::Binary(_) => PayloadKind::Binary,
        }
    }

    pub fn into_structured(self) -> LookupResult<serde_json::Value> {
        match self {
            Payload::Structured(value) => Ok(value),
            other => Err(other.mismatch(PayloadKind::Structured)),
        }
    }

    pub fn into_binary(self) -> LookupResult<Vec<u8>> {
        match self {
            Payload::Binary(bytes) => Ok(bytes),
            other => Err(other.mismatch(PayloadKind::Binary)),
        }
    }

    fn mismatch(&self, expected: PayloadKind) -> LookupError {
        LookupError::UnexpectedPayload {
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }
}

/// Persistent store for request payloads, keyed by request key digest
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
    clear_on_close: bool,
}

impl CacheStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> LookupResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        log::info!("Cache directory: {:?}", root);
        Ok(Self {
            root,
            clear_on_close: false,
        })
    }

    /// Wipe every entry when [`CacheStore::close`] is called
    pub fn clear_on_close(mut self, enabled: bool) -> Self {
        self.clear_on_close = enabled;
        self
    }

    /// Get the cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, digest: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{}.{}", digest, ext))
    }

    /// Look up a key.
    ///
    /// The structured object wins if both forms exist for the digest.
    /// `Ok(None)` means a miss; unreadable objects are errors.
    pub fn get(&self, key: &RequestKey) -> LookupResult<Option<Payload>> {
        let digest = key.digest();

        if let Some(text) = read_if_exists(&self.object_path(&digest, STRUCTURED_EXT))? {
            let value = serde_json::from_slice(&text)
                .map_err(|source| LookupError::CorruptEntry {
                    digest: digest.clone(),
                    source,
                })?;
            log::debug!("Cache hit (structured) for {}", key);
            return Ok(Some(Payload::Structured(value)));
        }

        if let Some(bytes) = read_if_exists(&self.object_path(&digest, BINARY_EXT))? {
            log::debug!("Cache hit (binary) for {}", key);
            return Ok(Some(Payload::Binary(bytes)));
        }

        Ok(None)
    }

    /// Store a payload, fully replacing any object of the same kind.
    ///
    /// An object of the other kind under the same digest is left in place.
    pub fn set(&self, key: &RequestKey, payload: &Payload) -> LookupResult<()> {
        let digest = key.digest();
        match payload {
            Payload::Structured(value) => {
                let content = serde_json::to_vec_pretty(value)?;
                self.write_atomic(&self.object_path(&digest, STRUCTURED_EXT), &content)?;
            }
            Payload::Binary(bytes) => {
                self.write_atomic(&self.object_path(&digest, BINARY_EXT), bytes)?;
            }
        }
        log::debug!("Cached {} payload for {}", payload.kind().as_str(), key);
        Ok(())
    }

    /// Evict one key, both forms. Missing objects are not an error.
    pub fn remove(&self, key: &RequestKey) -> LookupResult<()> {
        let digest = key.digest();
        for ext in [STRUCTURED_EXT, BINARY_EXT] {
            match std::fs::remove_file(self.object_path(&digest, ext)) {
                Ok(()) => log::debug!("Evicted {}.{}", digest, ext),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Remove every cache object under the root: `<digest>.json`,
    /// `<digest>.bin` and leftover temp files from interrupted writes.
    ///
    /// Any other file, subdirectories and anything outside the root are untouched.
    pub fn clear(&self) -> LookupResult<()> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() || !is_cache_object(&entry.file_name()) {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        log::info!("Cleared {} cached objects from {:?}", removed, self.root);
        Ok(())
    }

    /// End the store's lifetime, wiping it if configured to
    pub fn close(self) -> LookupResult<()> {
        if self.clear_on_close {
            self.clear()?;
        }
        Ok(())
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> LookupResult<()> {
        let mut temp_file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)?;
        temp_file.write_all(content)?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Whether a file name is one the store itself creates
fn is_cache_object(name: &std::ffi::OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    // Leftover from an interrupted write_atomic
    if name.starts_with(TEMP_PREFIX) {
        return true;
    }
    match name.rsplit_once('.') {
        Some((digest, ext)) if ext == STRUCTURED_EXT || ext == BINARY_EXT => {
            digest.len() == 64
                && digest
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        }
        _ => false,
    }
}

fn read_if_exists(path: &Path) -> LookupResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
