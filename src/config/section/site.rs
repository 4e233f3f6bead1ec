//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.com"   # Public origin used in sitemap URLs
//! base_path = "/"               # Mount point of the site under `url`
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigDiagnostics, FieldPath,
    util::{check_http_url, normalize_base_path},
};

/// Production site origin.
pub const DEFAULT_SITE_URL: &str = "https://johntamakloe.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    pub url: String,

    /// Always `/` or `/segment[/segment...]` once loaded.
    pub base_path: String,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_string(),
            base_path: "/".to_string(),
        }
    }
}

impl SiteSectionConfig {
    pub const URL: FieldPath = FieldPath::new("site.url");
    pub const BASE_PATH: FieldPath = FieldPath::new("site.base_path");

    pub fn normalize(&mut self) {
        self.base_path = normalize_base_path(&self.base_path);
    }

    /// Absolute public URL for a site path such as `/blog/hello`.
    pub fn absolute_url(&self, path: &str) -> String {
        let origin = self.url.trim_end_matches('/');
        format!("{origin}{}{path}", self.prefix())
    }

    /// Base path as a URL prefix: empty for `/`.
    pub fn prefix(&self) -> &str {
        if self.base_path == "/" {
            ""
        } else {
            &self.base_path
        }
    }

    /// Strip the base path from a request path.
    ///
    /// Returns the site-relative path (always starting with `/`), or `None`
    /// when the request lies outside the base path.
    pub fn strip_base<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        let prefix = self.prefix();
        if prefix.is_empty() {
            return Some(request_path);
        }
        match request_path.strip_prefix(prefix)? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check_http_url(diag, Self::URL, &self.url);
        if self.base_path.contains(['?', '#']) {
            diag.error(Self::BASE_PATH, "must be a plain path without query or fragment");
        }
    }
}
