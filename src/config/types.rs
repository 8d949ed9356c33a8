// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub assets: AssetsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Listener and worker pool configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads (CPU cores when unset)
    #[serde(default)]
    pub workers: Option<usize>,
    /// Upper bound on requests handled at the same time
    pub max_concurrent_requests: usize,
    /// Listen backlog: connections waiting while the pool is saturated
    pub backlog: i32,
    /// Seconds allowed for a client to send its request headers
    pub header_read_timeout: u64,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_grace: u64,
}

/// Served folder configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilesConfig {
    pub root: String,
    /// Resolve `root` against `base_dir` instead of using it as is
    pub relative: bool,
    /// Base directory for relative roots (executable's directory when unset)
    #[serde(default)]
    pub base_dir: Option<String>,
    /// Show recursive folder sizes in listings
    pub show_folder_size: bool,
    /// Entries visited per folder-size walk before the sum is cut short
    pub folder_size_max_entries: usize,
}

/// Startup assets (icon and HTML templates)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    pub dir: String,
    pub icon_name: String,
    /// `Cache-Control` max-age for the icon, in seconds
    pub icon_max_age: u32,
}

/// HTTP response configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Status used for the error page. 200 keeps compatibility with
    /// existing clients; set 404 for the conventional status.
    pub other_status: u16,
    /// Bytes read from disk per streamed body frame
    pub chunk_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}
