//! Command-line interface module.

mod args;
pub mod query;
pub mod serve;
pub mod sitemap;
pub mod sync;

pub use args::{Cli, Commands, QueryArgs, ServeArgs, SitemapArgs, SyncArgs};
