//! HTTP Range request parsing module
//!
//! Parsing is split from validation: [`parse_range_header`] only reads the
//! grammar `bytes=<start>?-<end>?`, and [`RangeSpec::satisfy`] checks the
//! result against a concrete file length.

/// Range as written by the client, bounds not yet checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// First byte, 0 when omitted
    pub start: Option<u64>,
    /// Last byte (inclusive), end of file when omitted
    pub end: Option<u64>,
}

/// Inclusive byte span known to lie inside the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered
    #[inline]
    pub const fn len(self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether the span is the whole file
    #[inline]
    pub const fn is_full(self, file_len: u64) -> bool {
        self.start == 0 && self.end + 1 == file_len
    }
}

/// Range cannot be served for this file length (416)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsatisfiable;

impl RangeSpec {
    /// Resolve omitted bounds and check `0 <= start <= end < file_len`
    pub fn satisfy(self, file_len: u64) -> Result<ByteRange, Unsatisfiable> {
        let start = self.start.unwrap_or(0);
        let end = match self.end {
            Some(end) => end,
            None => file_len.checked_sub(1).ok_or(Unsatisfiable)?,
        };

        if start > end || end >= file_len {
            return Err(Unsatisfiable);
        }
        Ok(ByteRange { start, end })
    }
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end of file
/// - `bytes=-end` - From the first byte to `end`
///
/// `bytes start-end` (space instead of `=`) is accepted as well.
/// Multi-range and malformed headers yield `None` and are served as if
/// no Range header was sent.
///
/// # Examples
/// ```
/// use folder_server::http::range::{parse_range_header, RangeSpec};
///
/// let spec = parse_range_header(Some("bytes=0-99")).unwrap();
/// assert_eq!(spec, RangeSpec { start: Some(0), end: Some(99) });
///
/// assert!(parse_range_header(Some("bytes=0-10,20-30")).is_none());
/// assert!(parse_range_header(None).is_none());
/// ```
pub fn parse_range_header(range_header: Option<&str>) -> Option<RangeSpec> {
    let header = range_header?.trim();

    let rest = header.strip_prefix("bytes")?;
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(' '))?
        .trim();

    // Only support single range (not multi-range)
    if rest.contains(',') {
        return None;
    }

    let (start_str, end_str) = rest.split_once('-')?;
    Some(RangeSpec {
        start: parse_bound(start_str.trim())?,
        end: parse_bound(end_str.trim())?,
    })
}

/// Empty bound is `Some(None)`; anything but ASCII digits is `None`
fn parse_bound(s: &str) -> Option<Option<u64>> {
    if s.is_empty() {
        return Some(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok().map(Some)
}
