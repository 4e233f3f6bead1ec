//! `[snapshot]` section configuration.
//!
//! ```toml
//! [snapshot]
//! path = "public/blogdata.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Relative to the project root until the config is finalized.
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "public/blogdata.json".into(),
        }
    }
}
