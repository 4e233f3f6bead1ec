//! Blocking HTTP client for the content API.
//!
//! # Endpoint
//!
//! ```text
//! GET <base>/blog-posts?sort=createdAt:desc&pagination[page]=<n>&pagination[pageSize]=<size>
//! ```
//!
//! Response body:
//!
//! ```json
//! { "data": [ ... ], "meta": { "pagination": { "pageCount": 3 } } }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;

use super::{ContentSource, Page, SourceError};
use crate::debug;

/// Collection path under the API base URL.
const COLLECTION: &str = "blog-posts";

/// Newest first, matching the order the site lists posts in.
const SORT: &str = "createdAt:desc";

/// Content API client.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    /// Build a client for `base_url` (e.g. `https://cms.example.com/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_builder(base_url, timeout, Client::builder())
    }

    /// Client for a loopback test server, bypassing any `*_PROXY` settings.
    #[cfg(test)]
    pub(crate) fn local(base_url: &str) -> Result<Self> {
        Self::with_builder(base_url, Duration::from_secs(5), Client::builder().no_proxy())
    }

    fn with_builder(base_url: &str, timeout: Duration, builder: ClientBuilder) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = builder
            .timeout(timeout)
            .user_agent(concat!("blogsync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("failed to build content API client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full request URL for one page.
    pub fn page_url(&self, page: u32, page_size: u32) -> String {
        format!(
            "{}/{COLLECTION}?sort={SORT}&pagination[page]={page}&pagination[pageSize]={page_size}",
            self.base_url
        )
    }
}

impl ContentSource for HttpSource {
    fn fetch_page(&self, page: u32, page_size: u32) -> Result<Page, SourceError> {
        let url = self.page_url(page, page_size);
        debug!("fetch"; "GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| SourceError::Transport { page, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SourceError::Status {
                page,
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .map_err(|source| SourceError::Transport { page, source })?;
        let body: PageBody =
            serde_json::from_str(&text).map_err(|source| SourceError::Decode { page, source })?;

        Ok(body.into_page())
    }

    fn describe(&self) -> String {
        format!("{}/{COLLECTION}", self.base_url)
    }
}

/// Wire shape of a page response.
#[derive(Debug, Deserialize)]
struct PageBody {
    data: Vec<Value>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    #[serde(default)]
    page_count: Option<u32>,
}

impl PageBody {
    fn into_page(self) -> Page {
        let page_count = self
            .meta
            .and_then(|meta| meta.pagination)
            .and_then(|pagination| pagination.page_count);
        Page {
            records: self.data,
            page_count,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::{self, JoinHandle};
    use tiny_http::{Response, Server, StatusCode};

    /// Serve canned `(status, body)` responses in order on a loopback port.
    ///
    /// Returns the API base URL and a handle yielding the request URLs seen.
    pub(crate) fn serve_script(script: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in script {
                let request = server.recv().unwrap();
                seen.push(request.url().to_string());
                let response = Response::from_string(body).with_status_code(StatusCode(status));
                request.respond(response).unwrap();
            }
            seen
        });

        (format!("http://{addr}/api"), handle)
    }

    pub(crate) fn page_body(records: Value, page_count: u32) -> String {
        json!({
            "data": records,
            "meta": { "pagination": { "page": 1, "pageSize": 100, "pageCount": page_count } }
        })
        .to_string()
    }

    fn source(base: &str) -> HttpSource {
        HttpSource::local(base).unwrap()
    }

    #[test]
    fn test_page_url() {
        let source = source("https://cms.example.com/api/");
        assert_eq!(
            source.page_url(2, 100),
            "https://cms.example.com/api/blog-posts?sort=createdAt:desc&pagination[page]=2&pagination[pageSize]=100"
        );
        assert_eq!(source.describe(), "https://cms.example.com/api/blog-posts");
    }

    #[test]
    fn test_fetch_page_decodes_records_and_page_count() {
        let body = page_body(json!([{"documentId": "a"}, {"documentId": "b"}]), 3);
        let (base, server) = serve_script(vec![(200, body)]);

        let page = source(&base).fetch_page(1, 100).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.page_count, Some(3));

        let seen = server.join().unwrap();
        assert_eq!(
            seen,
            ["/api/blog-posts?sort=createdAt:desc&pagination[page]=1&pagination[pageSize]=100"]
        );
    }

    #[test]
    fn test_local_client_reaches_loopback_with_default_headers() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.to_string())
            };
            let seen = (header("Accept"), header("User-Agent"));
            request
                .respond(Response::from_string(r#"{"data":[]}"#))
                .unwrap();
            seen
        });

        source(&format!("http://{addr}/api")).fetch_page(1, 10).unwrap();

        let (accept, user_agent) = handle.join().unwrap();
        assert_eq!(accept.as_deref(), Some("application/json"));
        assert!(user_agent.unwrap().starts_with("blogsync/"));
    }

    #[test]
    fn test_fetch_page_without_meta() {
        let (base, server) = serve_script(vec![(200, r#"{"data":[]}"#.into())]);

        let page = source(&base).fetch_page(1, 100).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.page_count, None);
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_page_status_error_keeps_body() {
        let (base, server) = serve_script(vec![(500, "upstream exploded".into())]);

        let err = source(&base).fetch_page(2, 100).unwrap_err();
        match err {
            SourceError::Status { page, status, body } => {
                assert_eq!(page, 2);
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_page_rejects_body_without_data() {
        let (base, server) = serve_script(vec![(200, r#"{"error":"nope"}"#.into())]);

        let err = source(&base).fetch_page(1, 100).unwrap_err();
        assert!(matches!(err, SourceError::Decode { page: 1, .. }));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_page_transport_error() {
        // Bind then drop a listener to get a port nothing is listening on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = source(&format!("http://127.0.0.1:{port}/api"))
            .fetch_page(1, 100)
            .unwrap_err();
        assert!(matches!(err, SourceError::Transport { page: 1, .. }));
    }
}
