//! `[api]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [api]
//! url = "https://cms.example.com/api"   # Content API base, fetched by `sync`
//! public_url = "https://cms.example.com/api"  # Exposed to browsers
//! page_size = 100                       # Records per page request
//! timeout = 30                          # Request timeout in seconds
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath, util::check_http_url};

/// Production content API.
pub const DEFAULT_API_URL: &str = "https://reliable-bubble-e0aafb3b9e.strapiapp.com/api";

/// Largest page size accepted before any request is made.
const MAX_PAGE_SIZE: u32 = 1000;

/// Strapi's default `api.rest.maxLimit`; larger pages are silently capped.
const STRAPI_MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,

    /// Browser-facing API URL. Falls back to `url` when unset.
    pub public_url: Option<String>,

    pub page_size: u32,

    /// Seconds.
    pub timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            public_url: None,
            page_size: crate::sync::DEFAULT_PAGE_SIZE,
            timeout: 30,
        }
    }
}

impl ApiConfig {
    pub const URL: FieldPath = FieldPath::new("api.url");
    pub const PUBLIC_URL: FieldPath = FieldPath::new("api.public_url");
    pub const PAGE_SIZE: FieldPath = FieldPath::new("api.page_size");
    pub const TIMEOUT: FieldPath = FieldPath::new("api.timeout");

    pub fn public_url(&self) -> &str {
        self.public_url.as_deref().unwrap_or(&self.url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check_http_url(diag, Self::URL, &self.url);
        if let Some(public_url) = &self.public_url {
            check_http_url(diag, Self::PUBLIC_URL, public_url);
        }

        match self.page_size {
            0 => diag.error(Self::PAGE_SIZE, "must be at least 1"),
            n if n > MAX_PAGE_SIZE => diag.error_with_hint(
                Self::PAGE_SIZE,
                format!("{n} exceeds the maximum of {MAX_PAGE_SIZE}"),
                format!("the content API returns at most {STRAPI_MAX_LIMIT} records per page by default"),
            ),
            n if n > STRAPI_MAX_LIMIT => diag.warn(
                Self::PAGE_SIZE,
                format!("{n} is above the API's default limit of {STRAPI_MAX_LIMIT}, pages may be capped"),
            ),
            _ => {}
        }

        if self.timeout == 0 {
            diag.error(Self::TIMEOUT, "must be at least 1 second");
        }
    }
}
