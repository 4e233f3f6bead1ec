//! Content API access.
//!
//! [`ContentSource`] is the seam between pagination logic and transport:
//! the sync pipeline only ever asks for "page n of size s". The production
//! implementation is [`HttpSource`]; tests script pages in memory.

pub(crate) mod http;

pub use http::HttpSource;

use serde_json::Value;
use thiserror::Error;

/// One page of records from the content API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw records, unvalidated.
    pub records: Vec<Value>,
    /// Advertised total number of pages (`meta.pagination.pageCount`).
    pub page_count: Option<u32>,
}

/// Errors fetching a page. Any of them aborts the sync run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request for page {page} failed")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page} returned HTTP {status}{}", format_body(.body))]
    Status { page: u32, status: u16, body: String },

    #[error("page {page} returned a malformed body")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },
}

fn format_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// A paginated source of post records.
pub trait ContentSource {
    /// Fetch a single page (1-based).
    fn fetch_page(&self, page: u32, page_size: u32) -> Result<Page, SourceError>;

    /// Human-readable location, for logging.
    fn describe(&self) -> String;
}
