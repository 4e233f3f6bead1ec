//! Configuration management for `blogsync.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [api] [site] [snapshot] [sitemap] [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config lookup, URL checks, base path normalization
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then `blogsync.toml`, then environment variables, then
//! command-line flags. The config file is optional.
//!
//! | Variable         | Field            |
//! |------------------|------------------|
//! | `STRAPI_API_URL` | `api.url`        |
//! | `PUBLIC_API_URL` | `api.public_url` |
//! | `SITE_URL`       | `site.url`       |
//! | `BASE_PATH`      | `site.base_path` |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    ApiConfig, DEFAULT_API_URL, DEFAULT_SITE_URL, ServeConfig, SiteSectionConfig, SitemapConfig,
    SnapshotConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, QueryArgs, ServeArgs, SitemapArgs, SyncArgs},
    debug, log,
    utils::path::{normalize_path, resolve_against},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "blogsync.toml";

pub const ENV_API_URL: &str = "STRAPI_API_URL";
pub const ENV_PUBLIC_API_URL: &str = "PUBLIC_API_URL";
pub const ENV_SITE_URL: &str = "SITE_URL";
pub const ENV_BASE_PATH: &str = "BASE_PATH";

/// Root configuration, one field per `blogsync.toml` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Config file in use, if one was found.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths resolve against: the config file's parent,
    /// or the working directory without a config file.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration for the given command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match Self::locate(cli)? {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(normalize_path).unwrap_or_else(|| cwd.clone());
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self {
                    root: cwd.clone(),
                    ..Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.resolve_paths();
        config.apply_command_options(&cli.command, &cwd);
        config.site.normalize();
        config.validate(&cli.command)?;

        Ok(config)
    }

    /// Find the config file. An explicit `--config` must exist.
    fn locate(cli: &Cli) -> Result<Option<PathBuf>> {
        match &cli.config {
            Some(path) => match find_config_file(path) {
                Some(found) => Ok(Some(found)),
                None => Err(ConfigError::NotFound(path.clone()).into()),
            },
            None => Ok(find_config_file(Path::new(DEFAULT_CONFIG_FILE))),
        }
    }

    /// Load configuration from a file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // layering
    // ========================================================================

    /// Apply environment overrides. Unset and blank variables are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = var(ENV_API_URL) {
            self.api.url = url;
        }
        if let Some(url) = var(ENV_PUBLIC_API_URL) {
            self.api.public_url = Some(url);
        }
        if let Some(url) = var(ENV_SITE_URL) {
            self.site.url = url;
        }
        if let Some(base_path) = var(ENV_BASE_PATH) {
            self.site.base_path = base_path;
        }
    }

    /// Resolve file-configured paths against the project root.
    fn resolve_paths(&mut self) {
        let root = self.root.clone();
        self.snapshot.path = resolve_against(&root, &self.snapshot.path);
        self.sitemap.path = resolve_against(&root, &self.sitemap.path);
        self.serve.root = resolve_against(&root, &self.serve.root);
    }

    /// Apply command-line flags. Paths given on the command line are
    /// relative to the working directory, not the project root.
    fn apply_command_options(&mut self, command: &Commands, cwd: &Path) {
        let path = |p: &Option<PathBuf>| p.as_deref().map(|p| resolve_against(cwd, p));

        match command {
            Commands::Sync(SyncArgs {
                api_url,
                snapshot,
                page_size,
                ..
            }) => {
                Self::update_option(&mut self.api.url, api_url.as_ref());
                Self::update_option(&mut self.snapshot.path, path(snapshot).as_ref());
                Self::update_option(&mut self.api.page_size, page_size.as_ref());
            }
            Commands::Sitemap(SitemapArgs {
                snapshot,
                output,
                site_url,
                minify,
                ..
            }) => {
                Self::update_option(&mut self.snapshot.path, path(snapshot).as_ref());
                Self::update_option(&mut self.sitemap.path, path(output).as_ref());
                Self::update_option(&mut self.site.url, site_url.as_ref());
                Self::update_option(&mut self.sitemap.minify, minify.as_ref());
            }
            Commands::Serve(ServeArgs {
                interface,
                port,
                root,
                ..
            }) => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.root, path(root).as_ref());
            }
            Commands::Query(QueryArgs { snapshot, .. }) => {
                Self::update_option(&mut self.snapshot.path, path(snapshot).as_ref());
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the sections `command` reads, reporting all errors at once.
    pub fn validate(&self, command: &Commands) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        match command {
            Commands::Sync(_) => self.api.validate(&mut diag),
            Commands::Sitemap(_) => self.site.validate(&mut diag),
            Commands::Serve(_) => {
                self.api.validate(&mut diag);
                self.site.validate(&mut diag);
                self.serve.validate(&mut diag);
            }
            Commands::Query(_) => {}
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rustc_hash::FxHashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn command(args: &[&str]) -> Commands {
        let argv = std::iter::once("blogsync").chain(args.iter().copied());
        Cli::parse_from(argv).command
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::parse_with_ignored("[api\nurl = 1").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[api]\npage_size = 50\nretries = 3\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.api.page_size, 50);
        assert!(ignored.iter().any(|f| f == "api.retries"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = test_parse_config(
            "[api]\nurl = \"https://file.example.com/api\"\n[site]\nurl = \"https://file.example.com\"",
        );
        config.apply_env(env(&[
            (ENV_API_URL, "https://env.example.com/api"),
            (ENV_SITE_URL, "https://env.example.com"),
            (ENV_PUBLIC_API_URL, "https://public.example.com/api"),
            (ENV_BASE_PATH, "/portfolio/"),
        ]));
        config.site.normalize();

        assert_eq!(config.api.url, "https://env.example.com/api");
        assert_eq!(config.api.public_url(), "https://public.example.com/api");
        assert_eq!(config.site.url, "https://env.example.com");
        assert_eq!(config.site.base_path, "/portfolio");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[(ENV_API_URL, "  "), (ENV_SITE_URL, "")]));

        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.site.url, DEFAULT_SITE_URL);
    }

    #[test]
    fn test_public_url_defaults_to_env_api_url() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[(ENV_API_URL, "http://localhost:1337/api")]));
        assert_eq!(config.api.public_url(), "http://localhost:1337/api");
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[(ENV_API_URL, "https://env.example.com/api")]));
        config.apply_command_options(
            &command(&["sync", "--api-url", "https://cli.example.com/api", "--page-size", "25"]),
            Path::new("/work"),
        );

        assert_eq!(config.api.url, "https://cli.example.com/api");
        assert_eq!(config.api.page_size, 25);
    }

    #[test]
    fn test_file_paths_resolve_against_root_cli_paths_against_cwd() {
        let mut config = SiteConfig {
            root: PathBuf::from("/site"),
            ..SiteConfig::default()
        };
        config.resolve_paths();
        config.apply_command_options(
            &command(&["sitemap", "--output", "out/sitemap.xml"]),
            Path::new("/work"),
        );

        assert_eq!(config.snapshot.path, Path::new("/site/public/blogdata.json"));
        assert_eq!(config.sitemap.path, Path::new("/work/out/sitemap.xml"));
        assert_eq!(config.serve.root, Path::new("/site/public"));
    }

    #[test]
    fn test_sitemap_flags() {
        let mut config = SiteConfig::default();
        config.apply_command_options(
            &command(&["sitemap", "--site-url", "https://preview.example.com", "--minify"]),
            Path::new("/work"),
        );

        assert_eq!(config.site.url, "https://preview.example.com");
        assert!(config.sitemap.minify);
    }

    #[test]
    fn test_serve_flags() {
        let mut config = SiteConfig::default();
        config.apply_command_options(
            &command(&["serve", "--port", "8080", "--interface", "0.0.0.0"]),
            Path::new("/work"),
        );

        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.interface.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = test_parse_config(
            "[api]\nurl = \"not a url\"\npage_size = 0\n[site]\nurl = \"ftp://example.com\"",
        );
        config.site.normalize();

        let err = config.validate(&command(&["serve"])).unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err:?}");
        };
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field).collect();
        assert_eq!(
            fields,
            [ApiConfig::URL, ApiConfig::PAGE_SIZE, SiteSectionConfig::URL]
        );
    }

    #[test]
    fn test_validation_follows_command() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[(ENV_SITE_URL, "johntamakloe.com")]));
        config.site.normalize();

        assert!(config.validate(&command(&["sync"])).is_ok());
        assert!(config.validate(&command(&["query"])).is_ok());
        assert!(config.validate(&command(&["sitemap"])).is_err());
        assert!(config.validate(&command(&["serve"])).is_err());

        let mut config = SiteConfig::default();
        config.api.page_size = 0;
        assert!(config.validate(&command(&["sitemap"])).is_ok());
        assert!(config.validate(&command(&["sync"])).is_err());
    }

    #[test]
    fn test_defaults_validate() {
        let config = SiteConfig::default();
        assert!(config.validate(&command(&["sitemap"])).is_ok());
    }
}
