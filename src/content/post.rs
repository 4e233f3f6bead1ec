//! Post records as delivered by the content API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity field, stable across revisions of the same post.
pub const DOCUMENT_ID: &str = "documentId";
/// Revision timestamp, compared verbatim to detect changes.
pub const UPDATED_AT: &str = "updatedAt";
/// URL slug used for the sitemap path.
pub const SLUG: &str = "slug";
/// Publication timestamp, lastmod fallback.
pub const PUBLISHED_AT: &str = "publishedAt";

/// A single blog post record.
///
/// The record is opaque apart from the four fields the pipeline reads.
/// Everything else is carried through unchanged, in its original key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post {
    fields: Map<String, Value>,
}

/// Why a record was left out of the merge index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record is not a JSON object.
    NotAnObject,
    /// The record has no `documentId`.
    MissingDocumentId,
    /// `documentId` is present but not a non-empty string.
    InvalidDocumentId,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAnObject => "not an object",
            Self::MissingDocumentId => "missing documentId",
            Self::InvalidDocumentId => "documentId is not a non-empty string",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Post {
    /// Wrap an already-decoded JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Validate a raw record at the ingestion boundary.
    ///
    /// Only the identity field is required. Optional fields with the wrong
    /// type are kept in the record but read back as absent.
    pub fn ingest(value: Value) -> Result<Self, SkipReason> {
        let Value::Object(fields) = value else {
            return Err(SkipReason::NotAnObject);
        };

        match fields.get(DOCUMENT_ID) {
            None | Some(Value::Null) => Err(SkipReason::MissingDocumentId),
            Some(Value::String(id)) if !id.is_empty() => Ok(Self { fields }),
            Some(_) => Err(SkipReason::InvalidDocumentId),
        }
    }

    /// Stable identity, if present and well-formed.
    pub fn document_id(&self) -> Option<&str> {
        self.str_field(DOCUMENT_ID)
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.str_field(UPDATED_AT)
    }

    pub fn published_at(&self) -> Option<&str> {
        self.str_field(PUBLISHED_AT)
    }

    pub fn slug(&self) -> Option<&str> {
        self.str_field(SLUG)
    }

    /// Raw `updatedAt` value for staleness comparison.
    ///
    /// Absent, `null` and string values all compare distinct, so any change
    /// in the field marks the record as changed.
    pub fn raw_updated_at(&self) -> Option<&Value> {
        self.fields.get(UPDATED_AT)
    }

    /// Last modification time for the sitemap: `updatedAt`, else `publishedAt`.
    pub fn lastmod(&self) -> Option<&str> {
        self.updated_at().or_else(|| self.published_at())
    }

    /// Look up any field of the record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Non-empty string field, `None` for anything else.
    fn str_field(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
