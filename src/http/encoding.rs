//! Gzip negotiation and compression for in-memory bodies
//!
//! File bodies are never compressed: ranges address bytes of the file on
//! disk, not of a compressed stream.

use flate2::write::GzEncoder;
use flate2::Compression;
use hyper::body::Bytes;
use std::io::{self, Write};

/// Whether `Accept-Encoding` mentions gzip anywhere
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    accept_encoding.is_some_and(|value| value.to_ascii_lowercase().contains("gzip"))
}

/// Gzip-compress a buffer in memory
pub fn gzip(raw: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()
}

/// Compress `raw` when the client accepts gzip
///
/// Returns the body to send and whether `Content-Encoding: gzip` applies.
pub fn negotiate(raw: Vec<u8>, accept_encoding: Option<&str>) -> io::Result<(Bytes, bool)> {
    if accepts_gzip(accept_encoding) {
        Ok((Bytes::from(gzip(&raw)?), true))
    } else {
        Ok((Bytes::from(raw), false))
    }
}
