//! Request path to filesystem path resolution.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve a site-relative request path to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything that escapes the
/// root, directly or through a symlink, resolves to `None`.
pub fn resolve_path(request_path: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(request_path)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Split off the query string, percent-decode, and trim slashes.
///
/// Returns `None` for paths that don't decode to UTF-8.
pub fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}
