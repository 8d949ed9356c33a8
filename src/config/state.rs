// Application state module
// Everything a request worker reads, shared without locks

use std::path::PathBuf;

use super::types::Config;
use crate::assets::CachedAssets;
use crate::server::Shutdown;

/// Application state
///
/// Built once at startup and shared read-only through an `Arc`.
pub struct AppState {
    pub config: Config,
    /// Canonical root folder
    pub root: PathBuf,
    pub assets: CachedAssets,
    pub shutdown: Shutdown,
}

impl AppState {
    pub const fn new(config: Config, root: PathBuf, assets: CachedAssets, shutdown: Shutdown) -> Self {
        Self {
            config,
            root,
            assets,
            shutdown,
        }
    }

    /// Reserved icon filename
    pub fn icon_name(&self) -> &str {
        &self.config.assets.icon_name
    }
}
