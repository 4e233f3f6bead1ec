//! Sequential page iteration over a [`ContentSource`].

use crate::source::{ContentSource, Page, SourceError};

/// Iterator over all pages of a source, one request at a time.
///
/// Starts at page 1 and stops once the page counter exceeds the most
/// recently advertised page count. A response without pagination metadata
/// counts as a single page. Iteration ends after the first error.
pub struct Pages<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    page_size: u32,
    next: Option<u32>,
    total: u32,
}

impl<'a, S: ContentSource + ?Sized> Pages<'a, S> {
    pub fn new(source: &'a S, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            next: Some(1),
            total: 1,
        }
    }

    /// Page count as advertised by the last response.
    pub fn total(&self) -> u32 {
        self.total
    }
}

impl<S: ContentSource + ?Sized> Iterator for Pages<'_, S> {
    type Item = Result<(u32, Page), SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.next?;

        match self.source.fetch_page(page, self.page_size) {
            Ok(result) => {
                self.total = result.page_count.unwrap_or(1);
                self.next = page.checked_add(1).filter(|&n| n <= self.total);
                Some(Ok((page, result)))
            }
            Err(err) => {
                self.next = None;
                Some(Err(err))
            }
        }
    }
}
