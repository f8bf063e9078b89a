//! Local preview server with clean URLs and live rebuild.
//!
//! A lightweight HTTP server built on `tiny_http`:
//!
//! - serves files from the `public` directory
//! - resolves clean URLs: `/about` falls back to `about.html`
//! - serves `index.html` for directories
//! - optional file watcher thread triggering full rebuilds
//! - graceful shutdown on Ctrl+C
//!
//! The watcher rewrites the output tree the server reads from. A shared
//! single-writer lock keeps requests from observing a partially written
//! tree: the watcher holds it exclusively for the duration of a rebuild,
//! requests hold it shared while resolving and reading files.

use crate::config::SiteDirs;
use crate::log;
use crate::watch::watch_and_rebuild;
use anyhow::{Context, Result, bail};
use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Start the preview server, blocking until Ctrl+C.
pub fn serve_site(dirs: &SiteDirs, port: u16, reload: bool) -> Result<()> {
    if !dirs.public.is_dir() {
        bail!("public folder not found. Run `ht build` before serving");
    }

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let server =
        Server::http(addr).map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "Serving at http://0.0.0.0:{port}");

    let build_lock = Arc::new(RwLock::new(()));

    if reload {
        let watch_dirs = dirs.clone();
        let watch_lock = Arc::clone(&build_lock);
        std::thread::spawn(move || {
            if let Err(err) = watch_and_rebuild(&watch_dirs, &watch_lock) {
                log!("watch"; "{err:#}");
            }
        });
    }

    for request in server.incoming_requests() {
        let guard = build_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let result = handle_request(request, &dirs.public);
        drop(guard);

        if let Err(err) = result {
            log!("serve"; "request error: {err:#}");
        }
    }

    log!("serve"; "Local server stopped");
    Ok(())
}

/// Handle a single request: decode the URL, strip the query string, then
/// resolve against the output tree.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    let url = urlencoding::decode(request.url())
        .map(Cow::into_owned)
        .unwrap_or_default();
    let path = url.split('?').next().unwrap_or(&url).to_string();

    match resolve(root, &path) {
        Some(file) => serve_file(request, &file),
        None => serve_not_found(request),
    }
}

/// Clean URL resolution order:
/// 1. Exact file match
/// 2. Path with trailing slash stripped plus `.html`
/// 3. Directory's `index.html`
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_matches('/');
    let local = root.join(trimmed);

    if local.is_file() {
        return Some(local);
    }

    if !trimmed.is_empty() {
        let with_html = root.join(format!("{trimmed}.html"));
        if with_html.is_file() {
            return Some(with_html);
        }
    }

    let index = local.join("index.html");
    if local.is_dir() && index.is_file() {
        return Some(index);
    }

    None
}

fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", guess_content_type(path)).unwrap());
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}
