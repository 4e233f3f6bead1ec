//! Blog post records and the ingestion schema.
//!
//! Records arrive as untyped JSON from the content API and from the
//! snapshot file. [`Post::ingest`] is the single validation point: it either
//! yields a [`Post`] with a usable identity or a [`SkipReason`].

mod post;

pub use post::{DOCUMENT_ID, Post, SkipReason};

use serde_json::Value;

/// Outcome of validating a batch of raw records.
#[derive(Debug, Default)]
pub struct Ingested {
    /// Records with a usable identity, in input order.
    pub posts: Vec<Post>,
    /// Records left out, with the reason.
    pub skipped: Vec<SkipReason>,
}

impl Ingested {
    /// Total number of raw records seen.
    pub fn seen(&self) -> usize {
        self.posts.len() + self.skipped.len()
    }
}

/// Validate every record of a batch, keeping input order.
pub fn ingest_all(records: impl IntoIterator<Item = Value>) -> Ingested {
    let mut out = Ingested::default();
    for record in records {
        match Post::ingest(record) {
            Ok(post) => out.posts.push(post),
            Err(reason) => out.skipped.push(reason),
        }
    }
    out
}
