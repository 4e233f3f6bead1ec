//! Sitemap generation.
//!
//! Lists the site root, the blog index and one entry per post with a slug.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/blog/hello-world</loc>
//!     <lastmod>2025-01-01T00:00:00.000Z</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! The snapshot is read leniently: a missing or broken file yields a sitemap
//! with only the two fixed entries, never an error.

use crate::{
    config::SiteConfig, content::Post, debug, generator::minify_xml, snapshot::SnapshotStore,
    utils::plural_count,
};
use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quick_xml::escape::escape;
use serde_json::Value;
use std::fs;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Characters left as-is in a URL path component (`encodeURIComponent` set).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Blog index path; posts live below it.
pub const BLOG_PATH: &str = "/blog";

const ROOT_PRIORITY: f32 = 1.0;
const BLOG_PRIORITY: f32 = 0.9;
const POST_PRIORITY: f32 = 0.8;

/// Build the sitemap from the snapshot and write it to `sitemap.path`.
///
/// Returns the number of URL entries written.
pub fn build_sitemap(config: &SiteConfig) -> Result<usize> {
    let store = SnapshotStore::new(&config.snapshot.path);
    let sitemap = Sitemap::from_snapshot(config, &store);
    let count = sitemap.len();
    sitemap.write(config)?;
    Ok(count)
}

/// Render the sitemap for a live request, reading the snapshot afresh.
pub fn render_sitemap(config: &SiteConfig) -> Vec<u8> {
    let store = SnapshotStore::new(&config.snapshot.path);
    let xml = Sitemap::from_snapshot(config, &store).into_xml();
    minify_xml(xml.as_bytes(), config.sitemap.minify).into_owned()
}

/// Change frequency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: ChangeFreq,
    priority: f32,
}

impl Sitemap {
    /// Build from the snapshot file, falling back to no posts.
    pub fn from_snapshot(config: &SiteConfig, store: &SnapshotStore) -> Self {
        Self::from_records(config, store.load_or_empty())
    }

    /// Build from raw snapshot records. Non-object records are ignored.
    pub fn from_records(config: &SiteConfig, records: Vec<Value>) -> Self {
        let posts: Vec<Post> = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(fields) => Some(Post::from_map(fields)),
                _ => None,
            })
            .collect();
        Self::from_posts(config, &posts)
    }

    /// Build from posts already in memory.
    ///
    /// Post entries come first, followed by the root and the blog index.
    /// Posts whose `slug` is missing, empty or not a string are left out.
    pub fn from_posts(config: &SiteConfig, posts: &[Post]) -> Self {
        let mut unlisted = 0;
        let mut urls: Vec<UrlEntry> = posts
            .iter()
            .filter_map(|post| {
                let Some(slug) = post.slug() else {
                    unlisted += 1;
                    return None;
                };
                Some(UrlEntry {
                    loc: config.site.absolute_url(&post_path(slug)),
                    lastmod: post.lastmod().map(str::to_string),
                    changefreq: ChangeFreq::Monthly,
                    priority: POST_PRIORITY,
                })
            })
            .collect();

        if unlisted > 0 {
            debug!("sitemap"; "{} without a usable slug not listed", plural_count(unlisted, "post"));
        }

        urls.push(UrlEntry {
            loc: config.site.absolute_url("/"),
            lastmod: None,
            changefreq: ChangeFreq::Monthly,
            priority: ROOT_PRIORITY,
        });
        urls.push(UrlEntry {
            loc: config.site.absolute_url(BLOG_PATH),
            lastmod: None,
            changefreq: ChangeFreq::Weekly,
            priority: BLOG_PRIORITY,
        });

        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 160);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape(entry.loc.as_str()));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape(lastmod.as_str()));
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("    <changefreq>");
            xml.push_str(entry.changefreq.as_str());
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(&format!("{:.1}", entry.priority));
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    fn write(self, config: &SiteConfig) -> Result<()> {
        let sitemap_path = &config.sitemap.path;
        let xml = self.into_xml();
        let xml = minify_xml(xml.as_bytes(), config.sitemap.minify);

        if let Some(parent) = sitemap_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(sitemap_path, &*xml)
            .with_context(|| format!("Failed to write sitemap to {}", sitemap_path.display()))?;

        debug!("sitemap"; "{} bytes", xml.len());
        Ok(())
    }
}

/// Site path for a post: `/blog/<percent-encoded slug>`.
pub fn post_path(slug: &str) -> String {
    format!("{BLOG_PATH}/{}", utf8_percent_encode(slug, COMPONENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use serde_json::json;
    use tempfile::TempDir;

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.url = "https://example.com".into();
        config
    }

    fn post(value: Value) -> Post {
        match value {
            Value::Object(fields) => Post::from_map(fields),
            _ => unreachable!(),
        }
    }

    /// Collect `<loc>` values by walking the document with an XML reader.
    fn locs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut locs = Vec::new();
        let mut in_loc = false;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"loc" => in_loc = true,
                Event::End(e) if e.name().as_ref() == b"loc" => in_loc = false,
                Event::Text(t) if in_loc => {
                    locs.push(String::from_utf8(t.into_inner().into_owned()).unwrap())
                }
                Event::Eof => break,
                _ => {}
            }
        }
        locs
    }

    #[test]
    fn test_post_path_encodes_like_uri_component() {
        assert_eq!(post_path("hello-world"), "/blog/hello-world");
        assert_eq!(post_path("a b/c?d"), "/blog/a%20b%2Fc%3Fd");
        assert_eq!(post_path("it's (fine)!*~_."), "/blog/it's%20(fine)!*~_.");
        assert_eq!(post_path("café"), "/blog/caf%C3%A9");
    }

    #[test]
    fn test_only_posts_with_slug_are_listed() {
        let posts = [
            post(json!({"documentId": "a", "slug": "with-slug"})),
            post(json!({"documentId": "b"})),
            post(json!({"documentId": "c", "slug": ""})),
            post(json!({"documentId": "d", "slug": 42})),
            post(json!({"documentId": "e", "slug": ["nested"]})),
        ];
        let xml = Sitemap::from_posts(&config(), &posts).into_xml();

        assert_eq!(
            locs(&xml),
            [
                "https://example.com/blog/with-slug",
                "https://example.com/",
                "https://example.com/blog",
            ]
        );
    }

    #[test]
    fn test_numeric_slug_in_snapshot_is_not_listed() {
        let sitemap = Sitemap::from_records(
            &config(),
            vec![json!({"documentId": "a", "slug": 42})],
        );
        assert_eq!(sitemap.len(), 2);
    }

    #[test]
    fn test_entry_fields() {
        let posts = [post(json!({
            "slug": "hello",
            "updatedAt": "2025-02-01T10:00:00.000Z",
            "publishedAt": "2025-01-01T10:00:00.000Z"
        }))];
        let xml = Sitemap::from_posts(&config(), &posts).into_xml();

        assert!(xml.contains(
            "  <url>\n    <loc>https://example.com/blog/hello</loc>\n    \
             <lastmod>2025-02-01T10:00:00.000Z</lastmod>\n    \
             <changefreq>monthly</changefreq>\n    <priority>0.8</priority>\n  </url>\n"
        ));
        assert!(xml.contains(
            "<loc>https://example.com/</loc>\n    <changefreq>monthly</changefreq>\n    <priority>1.0</priority>"
        ));
        assert!(xml.contains(
            "<loc>https://example.com/blog</loc>\n    <changefreq>weekly</changefreq>\n    <priority>0.9</priority>"
        ));
    }

    #[test]
    fn test_lastmod_falls_back_to_published_at_then_absent() {
        let posts = [
            post(json!({"slug": "a", "publishedAt": "2025-01-01T00:00:00.000Z"})),
            post(json!({"slug": "b"})),
        ];
        let xml = Sitemap::from_posts(&config(), &posts).into_xml();

        assert!(xml.contains("<lastmod>2025-01-01T00:00:00.000Z</lastmod>"));
        assert_eq!(xml.matches("<lastmod>").count(), 1);
    }

    #[test]
    fn test_xml_structure() {
        let xml = Sitemap::from_posts(&config(), &[]).into_xml();
        let lines: Vec<&str> = xml.lines().collect();

        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert_eq!(lines[1], format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        assert_eq!(lines.last().unwrap().trim(), "</urlset>");
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_escapes_special_chars() {
        let mut config = config();
        config.site.url = "https://example.com/?a=1&b=2".into();
        let xml = Sitemap::from_posts(&config, &[]).into_xml();
        assert!(!xml.contains("&b"));
        assert!(xml.contains("&amp;"));
    }

    #[test]
    fn test_base_path_prefixes_every_url() {
        let mut config = config();
        config.site.base_path = "/portfolio".into();
        let posts = [post(json!({"slug": "x"}))];
        let xml = Sitemap::from_posts(&config, &posts).into_xml();

        assert_eq!(
            locs(&xml),
            [
                "https://example.com/portfolio/blog/x",
                "https://example.com/portfolio/",
                "https://example.com/portfolio/blog",
            ]
        );
    }

    #[test]
    fn test_missing_snapshot_yields_fixed_entries() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("missing.json"));

        let sitemap = Sitemap::from_snapshot(&config(), &store);
        assert_eq!(sitemap.len(), 2);
    }

    #[test]
    fn test_unparsable_snapshot_yields_fixed_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blogdata.json");
        fs::write(&path, "<<< definitely not json").unwrap();

        let xml = Sitemap::from_snapshot(&config(), &SnapshotStore::new(&path)).into_xml();
        assert_eq!(
            locs(&xml),
            ["https://example.com/", "https://example.com/blog"]
        );
    }

    #[test]
    fn test_snapshot_in_data_object_form() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blogdata.json");
        fs::write(&path, r#"{"data":[{"slug":"a"},null,{"slug":"b"}]}"#).unwrap();

        let sitemap = Sitemap::from_snapshot(&config(), &SnapshotStore::new(&path));
        assert_eq!(sitemap.len(), 4);
    }

    #[test]
    fn test_build_sitemap_writes_file() {
        let dir = TempDir::new().unwrap();
        let mut config = config();
        config.snapshot.path = dir.path().join("blogdata.json");
        config.sitemap.path = dir.path().join("public").join("sitemap.xml");
        fs::write(&config.snapshot.path, r#"[{"slug":"one"},{"title":"no slug"}]"#).unwrap();

        let count = build_sitemap(&config).unwrap();
        assert_eq!(count, 3);

        let xml = fs::read_to_string(&config.sitemap.path).unwrap();
        assert_eq!(locs(&xml).len(), 3);
    }

    #[test]
    fn test_render_sitemap_minified() {
        let dir = TempDir::new().unwrap();
        let mut config = config();
        config.snapshot.path = dir.path().join("missing.json");
        config.sitemap.minify = true;

        let xml = String::from_utf8(render_sitemap(&config)).unwrap();
        assert!(!xml.contains('\n'));
        assert_eq!(locs(&xml).len(), 2);
    }
}
