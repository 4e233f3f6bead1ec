//! HTTP response helpers.

use crate::utils::mime::types::{HTML, JSON, PLAIN, XML};
use anyhow::{Context, Result};
use std::{fs, io::Read, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with the generated sitemap document.
pub fn respond_xml(request: Request, body: Vec<u8>) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, XML);
    }
    send_body(request, 200, XML, body)
}

pub fn respond_json(request: Request, body: Vec<u8>) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, JSON);
    }
    send_body(request, 200, JSON, body)
}

/// Respond with 404, using `404.html` from the public directory if present.
pub fn respond_not_found(request: Request, serve_root: &Path) -> Result<()> {
    let custom_404 = serve_root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { HTML } else { PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom
        && let Ok(body) = fs::read(&custom_404)
    {
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET and HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = with_header(
        with_header(
            Response::from_data(b"405 Method Not Allowed".to_vec()).with_status_code(StatusCode(405)),
            "Content-Type",
            PLAIN,
        ),
        "Allow",
        "GET, HEAD",
    );
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = with_header(
        Response::empty(StatusCode(status)),
        "Content-Type",
        content_type,
    );
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = with_header(
        Response::from_data(body).with_status_code(StatusCode(status)),
        "Content-Type",
        content_type,
    );
    request.respond(response)?;
    Ok(())
}

/// Attach a header; values that aren't valid header bytes are skipped.
fn with_header<R: Read>(response: Response<R>, key: &str, value: &str) -> Response<R> {
    match Header::from_bytes(key, value) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
