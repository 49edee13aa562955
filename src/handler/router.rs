//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route matching,
//! body limits, flash hand-off and access logging.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response, Version};

use crate::config::AppState;
use crate::error::AppError;
use crate::handler::{articles, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::session;
use crate::upload::UploadError;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub content_type: Option<String>,
    /// Value of the session cookie, live or not
    pub session_id: Option<String>,
}

/// Where a method and path lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Index,
    Compose,
    About,
    Show(&'a str),
    Edit(&'a str),
    Submit,
    Update(&'a str),
    Delete(&'a str),
    Static,
    Options,
    MethodNotAllowed,
}

impl<'a> Route<'a> {
    /// Match a request; trailing and repeated slashes are ignored
    fn resolve(method: &Method, path: &'a str) -> Self {
        if method == Method::OPTIONS {
            return Self::Options;
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let is_read = method == Method::GET || method == Method::HEAD;
        let is_write = method == Method::POST;

        let (route, writes) = match segments.as_slice() {
            [] => (Self::Index, false),
            ["compose"] => (Self::Compose, false),
            ["about"] => (Self::About, false),
            ["articles", id] => (Self::Show(*id), false),
            ["articles", id, "edit"] => (Self::Edit(*id), false),
            ["submit"] => (Self::Submit, true),
            ["articles", id, "update"] => (Self::Update(*id), true),
            ["articles", id, "delete"] => (Self::Delete(*id), true),
            _ => (Self::Static, false),
        };

        match (writes, is_read, is_write) {
            (false, true, _) | (true, _, true) => route,
            _ => Self::MethodNotAllowed,
        }
    }

    const fn is_write(self) -> bool {
        matches!(self, Self::Submit | Self::Update(_) | Self::Delete(_))
    }

    const fn takes_flash(self) -> bool {
        !matches!(self, Self::Static | Self::Options | Self::MethodNotAllowed)
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();
    let headers = parts.headers;

    let route = Route::resolve(&method, &path);
    let ctx = RequestContext {
        path: &path,
        is_head: method == Method::HEAD,
        if_none_match: header_string(&headers, "if-none-match"),
        content_type: header_string(&headers, "content-type"),
        session_id: session::session_id(&headers, &state.config.session.cookie_name),
    };

    let mut response = match route {
        Route::Options => http::build_options_response(),
        Route::MethodNotAllowed => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response()
        }
        Route::Static => static_files::serve_public(&state, &ctx).await,
        route => dispatch(route, &state, &ctx, &headers, body)
            .await
            .unwrap_or_else(AppError::into_response),
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr.ip().to_string(), method.to_string(), path.clone());
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.referer = header_string(&headers, "referer");
        entry.user_agent = header_string(&headers, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run a page or write route
async fn dispatch<B>(
    route: Route<'_>,
    state: &AppState,
    ctx: &RequestContext<'_>,
    headers: &hyper::HeaderMap,
    body: B,
) -> Result<Response<Full<Bytes>>, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let flash = if route.takes_flash() {
        state.sessions.take_flash(ctx.session_id.as_deref())
    } else {
        session::FlashMessages::default()
    };

    let body = if route.is_write() {
        read_body(headers, body, state.config.http.max_body_size).await?
    } else {
        Bytes::new()
    };

    match route {
        Route::Index => articles::index(state, ctx, flash).await,
        Route::Compose => articles::compose(state, ctx, flash).await,
        Route::About => articles::about(state, ctx, flash),
        Route::Show(id) => articles::show(state, ctx, id, flash).await,
        Route::Edit(id) => articles::edit(state, ctx, id, flash).await,
        Route::Submit => articles::submit(state, ctx, body).await,
        Route::Update(id) => articles::update(state, ctx, id, body).await,
        Route::Delete(id) => articles::delete(state, ctx, id).await,
        Route::Static | Route::Options | Route::MethodNotAllowed => Ok(http::build_404_response()),
    }
}

/// Buffer a request body, enforcing `max_body_size`
///
/// A declared `Content-Length` over the limit is refused before reading.
async fn read_body<B>(
    headers: &hyper::HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, UploadError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let too_large = UploadError::BodyTooLarge {
        limit: max_body_size,
    };

    if let Some(size_str) = header_string(headers, "content-length") {
        match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                return Err(too_large);
            }
            Ok(_) => {}
            Err(_) => logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', relying on streamed limit"
            )),
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(too_large),
        Err(e) => Err(UploadError::Malformed(format!("failed to read body: {e}"))),
    }
}

fn header_string(headers: &hyper::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
