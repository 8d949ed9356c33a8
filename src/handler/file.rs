//! File responder
//!
//! Streams a file, or one byte span of it, with range and metadata headers.

use hyper::header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED};
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs::File;

use super::{RequestContext, ServeError};
use crate::config::AppState;
use crate::http::body::file_body;
use crate::http::range::{parse_range_header, ByteRange};
use crate::http::response::{self, ResponseBody};
use crate::http::{build_416_response, mime};

/// Serve the file at `path`, honoring a single-range `Range` header
///
/// No header means the whole file (200). A satisfiable range is 206
/// unless it covers the whole file; an unsatisfiable one is 416 with no
/// body. File bodies are never compressed.
pub async fn serve_file(
    path: &Path,
    ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    let file_len = metadata.len();

    let span = match parse_range_header(ctx.range.as_deref()) {
        Some(spec) => match spec.satisfy(file_len) {
            Ok(range) => Some(range),
            Err(_) => return Ok(build_416_response(file_len)),
        },
        None if file_len == 0 => None,
        None => Some(ByteRange {
            start: 0,
            end: file_len - 1,
        }),
    };

    let status = match span {
        Some(range) if !range.is_full(file_len) => StatusCode::PARTIAL_CONTENT,
        _ => StatusCode::OK,
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut builder = response::builder(status)
        .header(CONTENT_TYPE, mime::content_type_for(path))
        .header(CONTENT_DISPOSITION, response::inline_disposition(&name))
        .header(ACCEPT_RANGES, "bytes")
        .header(CONTENT_LENGTH, span.map_or(0, ByteRange::len));
    if let Some(range) = span {
        builder = builder.header(
            CONTENT_RANGE,
            format!("bytes {}-{}/{file_len}", range.start, range.end),
        );
    }
    if let Ok(modified) = metadata.modified() {
        builder = builder.header(LAST_MODIFIED, response::http_date(modified));
    }

    let body = match span {
        Some(range) => {
            file_body(
                file,
                range.start,
                range.len(),
                state.config.http.chunk_size,
                state.shutdown.clone(),
            )
            .await?
        }
        None => response::empty_body(),
    };

    Ok(response::finish(builder, body, status.as_str()))
}
