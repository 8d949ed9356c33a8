//! Folder server
//!
//! Serves one folder tree over HTTP/1.1: files with single-range support,
//! generated directory listings, a cached icon and an error page for
//! everything else.

pub mod assets;
pub mod config;
pub mod handler;
pub mod html;
pub mod http;
pub mod logger;
pub mod resolve;
pub mod server;
