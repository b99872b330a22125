//! Request key construction.
//!
//! A [`RequestKey`] is the full query URL for a lookup. It doubles as the
//! cache identity, so identical inputs must always produce identical keys.

use crate::error::{LookupError, LookupResult};
use crate::params::{Field, ParameterValidator};
use sha2::{Digest, Sha256};
use std::fmt;

/// Primary selector anchoring a card lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exact card name (`name=`)
    Name(String),
    /// Partial card name (`fname=`)
    FName(String),
    None,
}

impl Selector {
    pub fn field(&self) -> Option<Field> {
        match self {
            Selector::Name(_) => Some(Field::Name),
            Selector::FName(_) => Some(Field::Fname),
            Selector::None => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selector::Name(v) | Selector::FName(v) => Some(v.as_str()),
            Selector::None => None,
        }
    }
}

/// Filter parameters in insertion order.
///
/// Behaves like an ordered map: inserting a field that is already present
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: Vec<(Field, String)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Parse `(name, value)` string pairs, rejecting unknown field names
    pub fn from_pairs<I, K, V>(pairs: I) -> LookupResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filters = Self::new();
        for (name, value) in pairs {
            filters.insert(name.as_ref().parse()?, value);
        }
        Ok(filters)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.entries.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How filters are ordered inside a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// Filters appear in the order the caller supplied them. Differently
    /// ordered call sites miss each other's cache entries.
    #[default]
    Insertion,
    /// Filters are sorted by field name, so ordering never affects the key
    Sorted,
}

/// Canonical textual request identity (the query URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    /// Wrap an already-complete URL, e.g. a fixed endpoint or an image path
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hex SHA-256 of the key, used as the storage identifier
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a selector plus filters into a validated [`RequestKey`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_endpoint: String,
    validator: ParameterValidator,
    order: KeyOrder,
}

impl RequestBuilder {
    pub fn new(base_endpoint: impl Into<String>) -> Self {
        Self {
            base_endpoint: base_endpoint.into(),
            validator: ParameterValidator::default(),
            order: KeyOrder::default(),
        }
    }

    pub fn with_validator(mut self, validator: ParameterValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_order(mut self, order: KeyOrder) -> Self {
        self.order = order;
        self
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    pub fn validator(&self) -> &ParameterValidator {
        &self.validator
    }

    /// Build the key `base?selector=v&field=value...`.
    ///
    /// Every filter is validated before any text is produced, so a failure
    /// here happens ahead of any storage or network access.
    pub fn build(&self, selector: &Selector, filters: &Filters) -> LookupResult<RequestKey> {
        let mut params: Vec<(Field, &str)> = Vec::with_capacity(filters.len());
        for (field, value) in filters.iter() {
            if field.is_selector() {
                return Err(LookupError::ConflictingSelector(field));
            }
            self.validator.validate(field, value)?;
            params.push((field, value));
        }

        if self.order == KeyOrder::Sorted {
            params.sort_by_key(|(field, _)| field.as_str());
        }

        let mut key = format!("{}?", self.base_endpoint);
        if let (Some(field), Some(value)) = (selector.field(), selector.value()) {
            key.push_str(&format!("{}={}", field, value));
        }
        for (field, value) in params {
            key.push_str(&format!("&{}={}", field, value));
        }

        log::debug!("Built request key: {}", key);
        Ok(RequestKey(key))
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
