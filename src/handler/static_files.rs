//! Static file serving module
//!
//! Serves public assets and uploaded images for GET paths no page claims.

use std::path::{Path, PathBuf};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use crate::upload::PUBLIC_PREFIX;

/// Serve `ctx.path` from the uploads directory or the public root
pub async fn serve_public(state: &AppState, ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    let (root, relative) = match ctx
        .path
        .strip_prefix(PUBLIC_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(rest) => (state.uploads.dir(), rest),
        None => (Path::new(&state.config.storage.public_dir), ctx.path),
    };

    match load_from_directory(root, relative).await {
        Some((content, content_type)) => build_static_file_response(
            content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
        ),
        None => http::build_404_response(),
    }
}

/// Load a file below `root`, refusing anything that resolves outside it
pub async fn load_from_directory(root: &Path, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let relative = clean_relative_path(path)?;
    let file_path = root.join(&relative);

    let root_canonical = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    // Missing files are ordinary 404s
    let file_canonical = file_path.canonicalize().ok()?;
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            file_canonical.display()
        ));
        return None;
    }
    if !file_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Relative path made of plain segments only
///
/// Returns `None` for empty paths and paths with `..` segments.
fn clean_relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') => return None,
            s => relative.push(s),
        }
    }

    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Build static file response with `ETag` validation
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
