//! `[sitemap]` section configuration.
//!
//! ```toml
//! [sitemap]
//! path = "public/sitemap.xml"   # Written by `blogsync sitemap`
//! minify = false                # Strip indentation and newlines
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub path: PathBuf,
    pub minify: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            path: "public/sitemap.xml".into(),
            minify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_sitemap_config() {
        let config = test_parse_config("[sitemap]\nminify = true");
        assert!(config.sitemap.minify);
        assert_eq!(config.sitemap.path, Path::new("public/sitemap.xml"));
    }
}
