//! Configuration helpers.

use std::path::{Path, PathBuf};

use super::{ConfigDiagnostics, FieldPath};

/// Find the config file by searching upward from the current directory.
///
/// ```text
/// /home/user/site/public/img/   ← cwd
/// /home/user/site/blogsync.toml ← found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Record an error unless `value` is an absolute `http`/`https` URL with a host.
pub fn check_http_url(diag: &mut ConfigDiagnostics, field: FieldPath, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(url) => diag.error(
            field,
            format!("`{value}` uses unsupported scheme `{}`", url.scheme()),
        ),
        Err(err) => diag.error_with_hint(
            field,
            format!("`{value}` is not an absolute URL ({err})"),
            "include the scheme, e.g. https://example.com",
        ),
    }
}

/// Normalize a base path to `/` or `/a/b` (leading slash, no trailing slash).
///
/// Empty segments collapse: `""`, `"/"` and `"//"` all become `/`.
pub fn normalize_base_path(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
