//! Output generation.

pub mod sitemap;

use std::borrow::Cow;

/// Strip indentation and line breaks from generated XML.
///
/// Text content is left alone apart from leading and trailing whitespace on
/// each line. Input that is not UTF-8 is returned untouched.
pub fn minify_xml(content: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if !enabled {
        return Cow::Borrowed(content);
    }
    let Ok(xml) = std::str::from_utf8(content) else {
        return Cow::Borrowed(content);
    };
    let minified: String = xml
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Cow::Owned(minified.into_bytes())
}
