//! Error page responder
//!
//! Answers everything that is not an icon, a file or a directory. The
//! status defaults to 200 for compatibility with existing clients and is
//! configurable through `http.other_status`.

use html_escape::encode_text;
use hyper::header::{CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::{RequestContext, ServeError};
use crate::config::AppState;
use crate::html;
use crate::http::encoding;
use crate::http::response::{self, ResponseBody};
use crate::logger;

fn other_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or_else(|_| {
        logger::log_warning(&format!("Invalid http.other_status {code}, using 200"));
        StatusCode::OK
    })
}

/// Render the error template for the requested path
pub fn render_error_page(template: &str, requested: &str) -> String {
    html::fill_template(template, &[encode_text(requested).as_ref()])
}

/// Serve the error page naming the requested path
pub fn serve_other(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    let page = render_error_page(&state.assets.error_template, &ctx.decoded_path());
    let (body, gzipped) = encoding::negotiate(page.into_bytes(), ctx.accept_encoding.as_deref())?;

    let mut builder = response::builder(other_status(state.config.http.other_status))
        .header(CONTENT_TYPE, "text/html; charset=UTF-8")
        .header(CONTENT_LANGUAGE, "en")
        .header(CONTENT_DISPOSITION, "inline; filename=Error.html")
        .header(CONTENT_LENGTH, body.len());
    if gzipped {
        builder = builder.header(CONTENT_ENCODING, "gzip");
    }

    Ok(response::finish(builder, response::full_body(body), "error page"))
}
