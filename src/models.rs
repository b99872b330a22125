use crate::error::{LookupError, LookupResult};
use crate::request::RequestKey;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The parts of a card record needed to locate its image
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CardRecord {
    pub id: u64,
    pub name: String,
}

/// Image size variants served by the image host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    #[default]
    Normal,
    Small,
    Cropped,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Normal => "normal",
            ImageSize::Small => "small",
            ImageSize::Cropped => "cropped",
        }
    }

    /// Sub-path of the image host holding this size
    pub fn suffix(&self) -> &'static str {
        match self {
            ImageSize::Normal => "cards",
            ImageSize::Small => "cards_small",
            ImageSize::Cropped => "cards_cropped",
        }
    }

    /// Image path relative to the host root, e.g. `cards_small/40640057.jpg`
    pub fn sub_path(&self, id: u64) -> String {
        format!("{}/{}.jpg", self.suffix(), id)
    }

    /// Full image URL, used as the cache key for the image bytes
    pub fn image_key(&self, image_url: &str, id: u64) -> RequestKey {
        RequestKey::from_url(format!(
            "{}/{}",
            image_url.trim_end_matches('/'),
            self.sub_path(id)
        ))
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = LookupError;

    fn from_str(s: &str) -> LookupResult<Self> {
        match s {
            "normal" => Ok(ImageSize::Normal),
            "small" => Ok(ImageSize::Small),
            "cropped" => Ok(ImageSize::Cropped),
            other => Err(LookupError::invalid("size", other)),
        }
    }
}
