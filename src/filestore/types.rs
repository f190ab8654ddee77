//! Wire types for the file store API.
//!
//! The store is loose about shapes: listing data arrives as a bare array or a
//! paged object, entries as bare names or objects, link data as a string or a
//! field map. Each of these decodes into an explicit untagged variant instead
//! of being probed dynamically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `{code, data}` envelope wrapping every JSON response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: Option<T>,
}

/// One raw listing record; the store sends either a bare name or an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        modified: Option<String>,
    },
}

impl RawEntry {
    /// Entry name, when present and non-empty.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            RawEntry::Name(name) => name.as_str(),
            RawEntry::Object { name, .. } => name.as_deref()?,
        };
        (!name.is_empty()).then_some(name)
    }

    /// Raw modification timestamp, when the store sent one.
    pub fn modified(&self) -> Option<&str> {
        match self {
            RawEntry::Name(_) => None,
            RawEntry::Object { modified, .. } => modified.as_deref(),
        }
    }
}

/// Listing payload: a bare entry array or a paged `{content, total}` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListData {
    Entries(Vec<RawEntry>),
    Page {
        #[serde(default)]
        content: Option<Vec<RawEntry>>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl ListData {
    /// Normalize both shapes into entries plus an optional running total.
    pub fn into_parts(self) -> (Vec<RawEntry>, Option<u64>) {
        match self {
            ListData::Entries(entries) => (entries, None),
            ListData::Page { content, total } => (content.unwrap_or_default(), total),
        }
    }
}

/// The `data` field of a link response: a URL string or a field map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LinkPayload {
    Url(String),
    Fields(serde_json::Map<String, serde_json::Value>),
    Other(serde_json::Value),
}

impl LinkPayload {
    /// First usable URL, probing `keys` in the given order.
    ///
    /// A bare non-empty string is returned as-is; empty strings never count.
    pub fn find_url(&self, keys: &[&str]) -> Option<&str> {
        match self {
            LinkPayload::Url(url) => (!url.is_empty()).then_some(url.as_str()),
            LinkPayload::Fields(fields) => keys.iter().find_map(|key| {
                fields
                    .get(*key)
                    .and_then(|value| value.as_str())
                    .filter(|value| !value.is_empty())
            }),
            LinkPayload::Other(_) => None,
        }
    }
}

/// A normalized catalog row derived from one listing entry.
///
/// `path` is the natural key collaborators use to deduplicate rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRecord {
    pub path: String,
    pub source_url: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
}
