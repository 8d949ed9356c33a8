//! HTTP response building module
//!
//! Shared body type and header helpers used by every responder.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONNECTION, CONTENT_RANGE, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::io;
use std::time::SystemTime;

/// Body type of every response: in-memory or streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body holding a fixed buffer
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body with no content
pub fn empty_body() -> ResponseBody {
    full_body(Bytes::new())
}

/// Builder with the headers every response carries
///
/// Connections are never kept alive.
pub fn builder(status: StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header(CONNECTION, "close")
}

/// Finish a builder, falling back to an empty response on invalid headers
pub fn finish(builder: Builder, body: ResponseBody, what: &str) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        log_build_error(what, &e);
        Response::new(empty_body())
    })
}

/// Build 416 Range Not Satisfiable response (no body)
pub fn build_416_response(file_len: u64) -> Response<ResponseBody> {
    let builder = builder(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_RANGE, format!("bytes */{file_len}"))
        .header("Content-Length", 0);
    finish(builder, empty_body(), "416")
}

/// `Content-Disposition: inline` value for a file name
///
/// Names are sent as raw UTF-8; a name with control characters gets no
/// filename parameter at all.
pub fn inline_disposition(filename: &str) -> HeaderValue {
    HeaderValue::from_bytes(format!("inline; filename={filename}").as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("inline"))
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate)
pub fn http_date(time: SystemTime) -> String {
    let utc: chrono::DateTime<chrono::Utc> = time.into();
    utc.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_http_date() {
        let t = UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_inline_disposition() {
        assert_eq!(inline_disposition("a.txt"), "inline; filename=a.txt");
        let utf8 = inline_disposition("r\u{e9}sum\u{e9}.pdf");
        assert_eq!(utf8.as_bytes(), "inline; filename=r\u{e9}sum\u{e9}.pdf".as_bytes());
        assert_eq!(inline_disposition("bad\nname"), "inline");
    }

    #[tokio::test]
    async fn test_416_response() {
        let resp = build_416_response(1000);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */1000");
        assert_eq!(resp.headers()[CONNECTION], "close");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
