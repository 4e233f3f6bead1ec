//! Snapshot repository: the persisted set of known posts.
//!
//! The snapshot is a single JSON file and the only durable state of the
//! system. Access follows one cycle per run: [`SnapshotStore::load`] →
//! mutate in memory → [`SnapshotStore::replace`].
//!
//! # Format
//!
//! Written as a bare, 2-space-indented array of post records. On read, an
//! object with a `data` array is accepted as well:
//!
//! ```json
//! [{ "documentId": "a", "slug": "hello", "updatedAt": "..." }]
//! { "data": [{ "documentId": "a" }] }
//! ```
//!
//! # Concurrency
//!
//! One writer per invocation; runs are assumed not to overlap. Readers never
//! observe a partial file because `replace` writes a sibling temp file and
//! renames it over the target.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::content::Post;
use crate::{debug, log};

/// Snapshot access errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot `{0}` does not exist")]
    Missing(PathBuf),

    #[error("failed to read snapshot `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("snapshot `{0}` is not valid JSON")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("snapshot `{0}` must be an array or an object with a `data` array")]
    Shape(PathBuf),

    #[error("failed to write snapshot `{0}`")]
    Write(PathBuf, #[source] io::Error),

    #[error("failed to serialize snapshot")]
    Serialize(#[source] serde_json::Error),
}

/// Result of [`SnapshotStore::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was (re)written.
    Written,
    /// The file already had identical content.
    Unchanged,
}

/// File-backed snapshot repository.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse all raw records.
    pub fn load(&self) -> Result<Vec<Value>, SnapshotError> {
        let text = fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                SnapshotError::Missing(self.path.clone())
            } else {
                SnapshotError::Read(self.path.clone(), err)
            }
        })?;
        self.parse(&text)
    }

    /// Read all raw records, treating any failure as an empty snapshot.
    ///
    /// A missing file is expected before the first sync and only logged in
    /// verbose mode; anything else is reported as a warning.
    pub fn load_or_empty(&self) -> Vec<Value> {
        match self.load() {
            Ok(records) => records,
            Err(SnapshotError::Missing(path)) => {
                debug!("snapshot"; "{} not found, starting empty", path.display());
                Vec::new()
            }
            Err(err) => {
                log!("warning"; "{:#}, starting empty", anyhow::Error::new(err));
                Vec::new()
            }
        }
    }

    /// Parse snapshot text in either accepted shape.
    fn parse(&self, text: &str) -> Result<Vec<Value>, SnapshotError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| SnapshotError::Parse(self.path.clone(), err))?;

        match value {
            Value::Array(records) => Ok(records),
            Value::Object(mut object) => match object.remove("data") {
                Some(Value::Array(records)) => Ok(records),
                _ => Err(SnapshotError::Shape(self.path.clone())),
            },
            _ => Err(SnapshotError::Shape(self.path.clone())),
        }
    }

    /// Replace the snapshot with `posts`, atomically.
    ///
    /// Skips the write when the file already holds identical content.
    pub fn replace(&self, posts: &[Post]) -> Result<WriteOutcome, SnapshotError> {
        let json = serde_json::to_string_pretty(posts).map_err(SnapshotError::Serialize)?;

        if file_content_matches(&self.path, &json) {
            debug!("snapshot"; "content unchanged, skipping write");
            return Ok(WriteOutcome::Unchanged);
        }

        let temp_path = self.temp_path();
        let result = write_then_rename(&temp_path, &self.path, json.as_bytes());
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result.map_err(|err| SnapshotError::Write(self.path.clone(), err))?;

        debug!("snapshot"; "wrote {} posts to {}", posts.len(), self.path.display());
        Ok(WriteOutcome::Written)
    }

    /// Sibling temp file, so the final rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    fs::rename(temp_path, path)
}

/// Check if file content is the same as new content
fn file_content_matches(path: &Path, content: &str) -> bool {
    path.exists() && fs::read_to_string(path).is_ok_and(|existing| existing == content)
}
