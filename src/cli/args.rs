//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Sync blog posts from the content API and generate the sitemap
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: blogsync.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch all posts and merge them into the snapshot
    Sync(SyncArgs),

    /// Write the sitemap from the snapshot
    Sitemap(SitemapArgs),

    /// Serve the live sitemap and the public directory
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Print snapshot records as JSON
    #[command(visible_alias = "q")]
    Query(QueryArgs),
}

/// Flags shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SyncArgs {
    /// Content API base URL (overrides STRAPI_API_URL)
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub api_url: Option<String>,

    /// Snapshot file path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Records requested per page
    #[arg(short = 'n', long)]
    pub page_size: Option<u32>,

    /// Fetch and merge, but don't write the snapshot
    #[arg(short, long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SitemapArgs {
    /// Snapshot file to read posts from
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Sitemap output path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Override the public site URL (overrides SITE_URL)
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Minify the sitemap XML
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory served as static files
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Query command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// Snapshot file to read
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Filter out null/empty values from output
    #[arg(short = 'E', long)]
    pub filter_empty: bool,

    /// Filter output to specific fields (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Write output to file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Cli {
    pub const fn verbose(&self) -> bool {
        match &self.command {
            Commands::Sync(args) => args.common.verbose,
            Commands::Sitemap(args) => args.common.verbose,
            Commands::Serve(args) => args.common.verbose,
            Commands::Query(args) => args.common.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("blogsync").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_args() {
        let cli = parse(&["sync", "--api-url", "http://localhost:1337/api", "-n", "50", "--dry-run", "-V"]);
        let Commands::Sync(args) = &cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:1337/api"));
        assert_eq!(args.page_size, Some(50));
        assert!(args.dry_run);
        assert!(cli.verbose());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = parse(&["sitemap", "-C", "site/blogsync.toml", "--minify"]);
        assert_eq!(cli.config, Some(PathBuf::from("site/blogsync.toml")));
        let Commands::Sitemap(args) = &cli.command else {
            panic!("expected sitemap");
        };
        assert_eq!(args.minify, Some(true));
        assert!(!cli.verbose());
    }

    #[test]
    fn test_query_fields_split_on_comma() {
        let cli = parse(&["query", "--fields", "slug,title", "--pretty"]);
        let Commands::Query(args) = &cli.command else {
            panic!("expected query");
        };
        assert_eq!(
            args.fields.as_deref(),
            Some(["slug".to_string(), "title".to_string()].as_slice())
        );
        assert!(args.pretty);
    }

    #[test]
    fn test_serve_rejects_bad_interface() {
        let argv = ["blogsync", "serve", "--interface", "localhost"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
