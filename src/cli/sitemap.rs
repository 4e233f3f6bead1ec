//! `blogsync sitemap`: batch sitemap generation.

use anyhow::Result;

use crate::{
    config::SiteConfig, generator::sitemap::build_sitemap, log, utils::plural_count,
};

pub fn run_sitemap(config: &SiteConfig) -> Result<()> {
    let count = build_sitemap(config)?;
    log!(
        "sitemap";
        "wrote {} to {}",
        plural_count(count, "url"),
        config.sitemap.path.display()
    );
    Ok(())
}
