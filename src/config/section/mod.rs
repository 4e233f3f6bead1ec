//! Configuration sections.
//!
//! Each module corresponds to a table in `blogsync.toml`:
//!
//! | Module     | TOML Section   | Purpose                                |
//! |------------|----------------|----------------------------------------|
//! | `api`      | `[api]`        | Content API endpoint and paging        |
//! | `site`     | `[site]`       | Public hostname and base path          |
//! | `snapshot` | `[snapshot]`   | Local post snapshot                    |
//! | `sitemap`  | `[sitemap]`    | Batch sitemap output                   |
//! | `serve`    | `[serve]`      | Request-time handler                   |

mod api;
mod serve;
mod site;
mod sitemap;
mod snapshot;

pub use api::{ApiConfig, DEFAULT_API_URL};
pub use serve::ServeConfig;
pub use site::{DEFAULT_SITE_URL, SiteSectionConfig};
pub use sitemap::SitemapConfig;
pub use snapshot::SnapshotConfig;
