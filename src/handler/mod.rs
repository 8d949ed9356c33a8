//! Request handler module
//!
//! Classifies each request against the served folder and produces the
//! response for its kind: icon, file, directory listing or error page.

pub mod classify;
pub mod directory;
pub mod file;
pub mod icon;
pub mod other;
pub mod router;

use html_escape::decode_html_entities;
use hyper::header::{HeaderName, ACCEPT_ENCODING, HOST, RANGE};
use hyper::{Method, Request};
use percent_encoding::percent_decode_str;
use std::io;
use thiserror::Error;


// Re-export main entry points
pub use classify::{classify, RequestKind};
pub use router::{handle_request, respond};

/// Per-request failure; the connection is dropped instead of answered
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("server is shutting down")]
    Shutdown,

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// What the responders need to know about one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Any method is answered as a read
    pub method: Method,
    /// URL path as received (still percent-encoded)
    pub path: String,
    pub range: Option<String>,
    pub accept_encoding: Option<String>,
    /// Host the client addressed, used for absolute links
    pub host: String,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        let host = header(HOST)
            .or_else(|| req.uri().authority().map(ToString::to_string))
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            range: header(RANGE),
            accept_encoding: header(ACCEPT_ENCODING),
            host,
        }
    }

    /// Context for a plain GET, mostly for tests and tools
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            range: None,
            accept_encoding: None,
            host: "localhost".to_string(),
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: &str) -> Self {
        self.range = Some(range.to_string());
        self
    }

    #[must_use]
    pub fn with_accept_encoding(mut self, accept_encoding: &str) -> Self {
        self.accept_encoding = Some(accept_encoding.to_string());
        self
    }

    /// Path with percent-encoding and HTML entities decoded, for display
    pub fn decoded_path(&self) -> String {
        decode_html_entities(&percent_decode_str(&self.path).decode_utf8_lossy()).into_owned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/movies/big%20file.mkv?x=1")
            .header("Host", "files.lan:8080")
            .header("Range", "bytes=0-99")
            .header("Accept-Encoding", "gzip, br")
            .body(())
            .unwrap();

        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.method, Method::HEAD);
        assert_eq!(ctx.path, "/movies/big%20file.mkv");
        assert_eq!(ctx.range.as_deref(), Some("bytes=0-99"));
        assert_eq!(ctx.accept_encoding.as_deref(), Some("gzip, br"));
        assert_eq!(ctx.host, "files.lan:8080");
        assert_eq!(ctx.decoded_path(), "/movies/big file.mkv");
    }

    #[test]
    fn test_context_without_host() {
        let req = Request::builder().uri("/").body(()).unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host, "localhost");
        assert!(ctx.range.is_none());
    }
}
