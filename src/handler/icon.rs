//! Icon responder
//!
//! Serves the icon cached at startup with long-lived public caching.

use hyper::body::Bytes;
use hyper::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::other::serve_other;
use super::{RequestContext, ServeError};
use crate::config::AppState;
use crate::http::encoding;
use crate::http::response::{self, ResponseBody};

/// Pick the cached icon variant the client accepts
fn select_variant(state: &AppState, accept_encoding: Option<&str>) -> Option<(Bytes, bool)> {
    let icon = state.assets.icon.as_ref()?;
    if encoding::accepts_gzip(accept_encoding) {
        if let Some(gz) = &state.assets.icon_gzip {
            return Some((gz.clone(), true));
        }
    }
    Some((icon.clone(), false))
}

/// Serve the cached icon, or the error page when none was loaded
pub fn serve_icon(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    let Some((body, gzipped)) = select_variant(state, ctx.accept_encoding.as_deref()) else {
        return serve_other(ctx, state);
    };

    let mut builder = response::builder(StatusCode::OK)
        .header(CONTENT_TYPE, "image/x-icon")
        .header(CONTENT_DISPOSITION, "inline; filename=\"favicon.ico\"")
        .header(
            CACHE_CONTROL,
            format!("public, max-age={}", state.config.assets.icon_max_age),
        )
        .header(CONTENT_LENGTH, body.len());
    if gzipped {
        builder = builder.header(CONTENT_ENCODING, "gzip");
    }

    Ok(response::finish(builder, response::full_body(body), "icon"))
}
