// Configuration module entry point
// Loads the immutable server configuration and holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// Re-export public types
pub use state::AppState;
pub use types::{AssetsConfig, Config, FilesConfig, HttpConfig, LoggingConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the default `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    /// Missing file is not an error: defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("server.max_concurrent_requests", 256)?
            .set_default("server.backlog", 128)?
            .set_default("server.header_read_timeout", 30)?
            .set_default("server.shutdown_grace", 10)?
            .set_default("files.root", "Files")?
            .set_default("files.relative", true)?
            .set_default("files.show_folder_size", false)?
            .set_default("files.folder_size_max_entries", 100_000)?
            .set_default("assets.dir", ".")?
            .set_default("assets.icon_name", "favicon.ico")?
            .set_default("assets.icon_max_age", 86_400)? // 1 day
            .set_default("http.other_status", 200)?
            .set_default("http.chunk_size", 4096)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Absolute, canonical root folder
    ///
    /// Fails when the folder does not exist or is not a directory.
    pub fn root_path(&self) -> Result<PathBuf, String> {
        let root = Path::new(&self.files.root);
        let path = if self.files.relative {
            self.base_dir().join(root)
        } else {
            root.to_path_buf()
        };

        let canonical = path
            .canonicalize()
            .map_err(|e| format!("Root folder '{}' is not accessible: {e}", path.display()))?;
        if !canonical.is_dir() {
            return Err(format!("Root folder '{}' is not a directory", canonical.display()));
        }
        Ok(canonical)
    }

    fn base_dir(&self) -> PathBuf {
        if let Some(dir) = &self.files.base_dir {
            return PathBuf::from(dir);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Effective configuration rendered as TOML, for startup diagnostics
    pub fn render(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|e| format!("<unrenderable config: {e}>"))
    }
}
