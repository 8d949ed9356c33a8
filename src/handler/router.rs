//! Request dispatch module
//!
//! Entry point for HTTP request processing: resolve the path, classify it,
//! hand it to the matching responder and write the access log line.

use crate::config::AppState;
use crate::handler::directory::serve_directory;
use crate::handler::file::serve_file;
use crate::handler::icon::serve_icon;
use crate::handler::other::serve_other;
use crate::handler::{classify, RequestContext, RequestKind, ServeError};
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};
use crate::resolve::resolve;
use hyper::body::Incoming;
use hyper::header::CONTENT_LENGTH;
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// An `Err` makes hyper drop the connection without answering.
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<ResponseBody>, ServeError> {
    let started = Instant::now();
    let time = chrono::Local::now();
    let ctx = RequestContext::from_request(&req);

    match respond(&ctx, &state).await {
        Ok((kind, response)) => {
            logger::log_request(&ctx.method, &ctx.path, kind.as_str());
            if state.config.logging.access_log {
                let entry = AccessLogEntry {
                    remote_addr: peer.to_string(),
                    time,
                    method: ctx.method.to_string(),
                    path: ctx.path.clone(),
                    kind: kind.as_str(),
                    status: response.status().as_u16(),
                    body_bytes: content_length(&response),
                    request_time_us: u64::try_from(started.elapsed().as_micros())
                        .unwrap_or(u64::MAX),
                };
                logger::log_access(&entry, &state.config.logging.access_log_format);
            }
            Ok(response)
        }
        Err(ServeError::Shutdown) => {
            logger::log_debug(&format!("[Handler] Dropping {} {}: shutting down", ctx.method, ctx.path));
            Err(ServeError::Shutdown)
        }
        Err(e) => {
            logger::log_error(&format!("[Handler] {} {} failed: {e}", ctx.method, ctx.path));
            Err(e)
        }
    }
}

/// Classify one request and produce its response
///
/// Paths that cannot be resolved inside the root are answered with the
/// error page, never with a failure.
pub async fn respond(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<(RequestKind, Response<ResponseBody>), ServeError> {
    if state.shutdown.is_requested() {
        return Err(ServeError::Shutdown);
    }

    let path = match resolve(&ctx.path, &state.root) {
        Ok(path) => path,
        Err(rejected) => {
            logger::log_debug(&format!("[Handler] Rejected path '{}': {rejected}", ctx.path));
            return Ok((RequestKind::Other, serve_other(ctx, state)?));
        }
    };

    let kind = classify(&path, state.icon_name()).await;
    let response = match kind {
        RequestKind::Icon => serve_icon(ctx, state)?,
        RequestKind::File => serve_file(&path, ctx, state).await?,
        RequestKind::Directory => serve_directory(&path, ctx, state).await?,
        RequestKind::Other => serve_other(ctx, state)?,
    };
    Ok((kind, response))
}

fn content_length(response: &Response<ResponseBody>) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
