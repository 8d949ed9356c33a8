//! HTTP protocol layer module
//!
//! Range grammar, MIME lookup, gzip negotiation, response building and
//! streamed file bodies, independent of how requests are classified.

pub mod body;
pub mod encoding;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeSpec};
pub use response::{build_416_response, ResponseBody};
