//! Request-time server.
//!
//! Routes, all relative to `site.base_path`:
//!
//! | Path            | Response                                      |
//! |-----------------|-----------------------------------------------|
//! | `/sitemap.xml`  | Sitemap regenerated from the snapshot         |
//! | `/_config.json` | Public runtime configuration                  |
//! | anything else   | Static file from `serve.root`, else 404       |

mod lifecycle;
mod path;
mod response;

use crate::{config::SiteConfig, debug, generator::sitemap::render_sitemap, log};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

const SITEMAP_ROUTE: &str = "/sitemap.xml";
const RUNTIME_CONFIG_ROUTE: &str = "/_config.json";

/// Request handler threads.
const POOL_THREADS: usize = 4;

/// Bind and serve until Ctrl+C.
pub fn serve(config: Arc<SiteConfig>) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_for_shutdown(&server);

    log!("serve"; "http://{}{}/", addr, config.site.prefix());
    debug!("serve"; "static files from {}", config.serve.root.display());

    run_request_loop(&server, config)
}

fn run_request_loop(server: &Server, config: Arc<SiteConfig>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .thread_name(|i| format!("serve-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Route {
    Sitemap,
    RuntimeConfig,
    Static(PathBuf),
    NotFound,
}

/// Map a raw request URL to a route.
fn route(url: &str, config: &SiteConfig) -> Route {
    let request_path = url.split(['?', '#']).next().unwrap_or_default();
    let Some(site_path) = config.site.strip_base(request_path) else {
        return Route::NotFound;
    };

    match site_path {
        SITEMAP_ROUTE => Route::Sitemap,
        RUNTIME_CONFIG_ROUTE => Route::RuntimeConfig,
        _ => path::resolve_path(site_path, &config.serve.root).map_or(Route::NotFound, Route::Static),
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match route(request.url(), config) {
        Route::Sitemap => {
            let body = render_sitemap(config);
            response::respond_xml(request, body)
        }
        Route::RuntimeConfig => response::respond_json(request, runtime_config(config)?),
        Route::Static(path) => response::respond_file(request, &path),
        Route::NotFound => response::respond_not_found(request, &config.serve.root),
    }
}

/// Browser-facing configuration. Only public values belong here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeConfig<'a> {
    site_url: &'a str,
    api_url: &'a str,
    base_path: &'a str,
}

fn runtime_config(config: &SiteConfig) -> Result<Vec<u8>> {
    let body = RuntimeConfig {
        site_url: &config.site.url,
        api_url: config.api.public_url(),
        base_path: &config.site.base_path,
    };
    serde_json::to_vec(&body).context("failed to serialize runtime config")
}
