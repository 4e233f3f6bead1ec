//! `blogsync sync`: pull the content API into the snapshot.

use anyhow::Result;

use crate::{
    cli::SyncArgs,
    config::SiteConfig,
    log,
    snapshot::{SnapshotStore, WriteOutcome},
    source::HttpSource,
    sync::{self, SyncOptions, SyncReport},
    utils::plural_count,
};

pub fn run_sync(args: &SyncArgs, config: &SiteConfig) -> Result<()> {
    let source = HttpSource::new(&config.api.url, config.api.timeout())?;
    let store = SnapshotStore::new(&config.snapshot.path);
    let options = SyncOptions {
        page_size: config.api.page_size,
        dry_run: args.dry_run,
    };

    let report = sync::run(&source, &store, &options)?;

    log!("sync"; "{}", summary(&report));
    if report.changed() == 0 {
        log!("sync"; "no new or changed posts");
    }
    match report.write {
        Some(WriteOutcome::Written) => log!("sync"; "wrote {}", store.path().display()),
        Some(WriteOutcome::Unchanged) => log!("sync"; "{} is up to date", store.path().display()),
        None => {}
    }
    Ok(())
}

/// One-line run summary, e.g.
/// `2 pages: fetched 150, new 3, changed 1, unchanged 146, skipped 0, total 212`.
fn summary(report: &SyncReport) -> String {
    let mut line = format!(
        "{}: fetched {}, new {}, changed {}, unchanged {}, skipped {}, total {}",
        plural_count(report.pages as usize, "page"),
        report.fetched,
        report.inserted,
        report.updated,
        report.unchanged,
        report.skipped_count(),
        report.total,
    );

    if !report.skipped.is_empty() {
        let mut reasons: Vec<_> = report.skipped.iter().collect();
        reasons.sort();
        let reasons: Vec<String> = reasons
            .into_iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect();
        line.push_str(&format!(" ({})", reasons.join(", ")));
    }
    line
}
