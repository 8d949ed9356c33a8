//! Request classification
//!
//! Decides which responder answers a resolved path, from filesystem
//! existence checks only.

use std::path::Path;

/// Which responder a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Icon,
    File,
    Directory,
    Other,
}

impl RequestKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::File => "file",
            Self::Directory => "directory",
            Self::Other => "other",
        }
    }
}

/// Classify a resolved path
///
/// The reserved icon name wins regardless of what exists on disk; then a
/// regular file, then a directory; anything else is `Other`.
pub async fn classify(path: &Path, icon_name: &str) -> RequestKind {
    if path.file_name().is_some_and(|name| name == icon_name) {
        return RequestKind::Icon;
    }

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => RequestKind::File,
        Ok(meta) if meta.is_dir() => RequestKind::Directory,
        _ => RequestKind::Other,
    }
}
