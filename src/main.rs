//! blogsync - keeps a local snapshot of blog posts from a headless CMS and
//! derives the site's sitemap from it.

mod cli;
mod config;
mod content;
mod core;
mod generator;
mod logger;
mod snapshot;
mod source;
mod sync;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use std::sync::Arc;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose());

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Sync(args) => cli::sync::run_sync(args, &config),
        Commands::Sitemap(_) => cli::sitemap::run_sitemap(&config),
        Commands::Serve(_) => cli::serve::serve(Arc::new(config)),
        Commands::Query(args) => cli::query::run_query(args, &config),
    }
}
