//! Content synchronization: fetch all pages, merge, replace the snapshot.
//!
//! # Pipeline
//!
//! ```text
//! snapshot ──load──▶ MergeIndex ◀──merge── Pages(source) ── page 1..=pageCount
//!                        │
//!                        └──replace──▶ snapshot
//! ```
//!
//! Loading is lenient (a missing or broken snapshot starts empty), fetching
//! is strict: the first failed page aborts the run before anything is
//! written, leaving the previous snapshot in place.

mod index;
mod paginate;

pub use index::{MergeIndex, MergeOutcome};
pub use paginate::Pages;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use crate::content::{SkipReason, ingest_all};
use crate::logger::ProgressLine;
use crate::snapshot::{SnapshotStore, WriteOutcome};
use crate::source::ContentSource;
use crate::utils::plural_count;
use crate::{debug, log};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Options for a single sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub page_size: u32,
    /// Fetch and merge, but leave the snapshot untouched.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            dry_run: false,
        }
    }
}

/// Counters for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pages requested.
    pub pages: u32,
    /// Raw records returned by the source, including skipped ones.
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Fetched records left out of the index, per reason.
    pub skipped: FxHashMap<&'static str, usize>,
    /// Snapshot entries without a usable identity, not carried forward.
    pub dropped: usize,
    /// Posts in the resulting snapshot.
    pub total: usize,
    /// `None` for dry runs.
    pub write: Option<WriteOutcome>,
}

impl SyncReport {
    /// New plus changed posts.
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }

    fn record_skips(&mut self, reasons: &[SkipReason]) {
        for reason in reasons {
            *self.skipped.entry(reason.as_str()).or_default() += 1;
        }
    }
}

/// Run one sync: load, fetch every page, merge, replace.
pub fn run<S>(source: &S, store: &SnapshotStore, options: &SyncOptions) -> Result<SyncReport>
where
    S: ContentSource + ?Sized,
{
    let mut report = SyncReport::default();

    let (mut index, dropped) = MergeIndex::from_snapshot(store.load_or_empty());
    report.dropped = dropped.len();
    if report.dropped > 0 {
        log!(
            "warning";
            "{} in {} without a documentId will not be kept",
            plural_count(report.dropped, "entry"),
            store.path().display()
        );
    }
    if index.is_empty() {
        debug!("sync"; "no known posts, starting from an empty snapshot");
    } else {
        debug!("sync"; "loaded {} from snapshot", plural_count(index.len(), "post"));
    }

    log!("sync"; "fetching {}", source.describe());
    let progress = ProgressLine::new("sync", &[("pages", 1)]);
    let mut pages = Pages::new(source, options.page_size);

    while let Some(result) = pages.next() {
        let (page, result) = result.context("sync aborted, snapshot left unchanged")?;
        progress.set_total("pages", pages.total() as usize);
        progress.inc("pages");

        report.pages = page;
        let batch = ingest_all(result.records);
        report.fetched += batch.seen();
        report.record_skips(&batch.skipped);
        for post in batch.posts {
            match index.merge(post) {
                MergeOutcome::Inserted => report.inserted += 1,
                MergeOutcome::Updated => report.updated += 1,
                MergeOutcome::Unchanged => report.unchanged += 1,
            }
        }
    }
    progress.finish();

    report.total = index.len();
    if options.dry_run {
        log!("sync"; "dry run, not writing {}", store.path().display());
        return Ok(report);
    }

    let outcome = store
        .replace(index.posts())
        .context("failed to replace snapshot")?;
    report.write = Some(outcome);
    Ok(report)
}
