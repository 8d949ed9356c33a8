//! Startup asset loading
//!
//! The icon and the two HTML templates are read once, before the listener
//! starts, from an ordered list of sources. Workers only ever see the
//! resulting [`CachedAssets`] bytes.

use crate::http::encoding;
use crate::logger;
use hyper::body::Bytes;
use std::io;
use std::path::PathBuf;

pub const DIRECTORY_TEMPLATE: &str = "Directory.html";
pub const ERROR_TEMPLATE: &str = "Error.html";

/// A place startup assets can be read from
pub trait AssetSource {
    /// Short label used in log lines
    fn name(&self) -> &str;

    /// Read `file`; `Ok(None)` means this source does not have it
    fn load(&self, file: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Assets stored as plain files in a directory
pub struct DiskAssets {
    dir: PathBuf,
}

impl DiskAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetSource for DiskAssets {
    fn name(&self) -> &str {
        "disk"
    }

    fn load(&self, file: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.dir.join(file)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Default assets compiled into the binary
///
/// The bundled icon answers to the configured icon name, whatever it is.
pub struct BundledAssets {
    icon_name: String,
}

impl BundledAssets {
    pub fn new(icon_name: &str) -> Self {
        Self {
            icon_name: icon_name.to_string(),
        }
    }
}

impl AssetSource for BundledAssets {
    fn name(&self) -> &str {
        "bundled"
    }

    fn load(&self, file: &str) -> io::Result<Option<Vec<u8>>> {
        let bytes: &[u8] = match file {
            DIRECTORY_TEMPLATE => include_bytes!("../assets/Directory.html"),
            ERROR_TEMPLATE => include_bytes!("../assets/Error.html"),
            _ if file == self.icon_name => include_bytes!("../assets/favicon.ico"),
            _ => return Ok(None),
        };
        Ok(Some(bytes.to_vec()))
    }
}

/// Icon and templates held in memory for the whole server lifetime
#[derive(Debug, Clone)]
pub struct CachedAssets {
    pub icon: Option<Bytes>,
    pub icon_gzip: Option<Bytes>,
    pub directory_template: String,
    pub error_template: String,
}

impl CachedAssets {
    /// Load every asset from the first source that has it
    ///
    /// Templates are required; the icon is optional and its absence makes
    /// icon requests fall back to the error page.
    pub fn load(sources: &[&dyn AssetSource], icon_name: &str) -> io::Result<Self> {
        let icon = load_first(sources, icon_name)?.map(Bytes::from);
        let icon_gzip = match &icon {
            Some(bytes) => Some(Bytes::from(encoding::gzip(bytes)?)),
            None => {
                logger::log_warning(&format!("Icon '{icon_name}' not found in any asset source"));
                None
            }
        };

        Ok(Self {
            icon,
            icon_gzip,
            directory_template: load_template(sources, DIRECTORY_TEMPLATE)?,
            error_template: load_template(sources, ERROR_TEMPLATE)?,
        })
    }

    /// Disk directory first, bundled copies as fallback
    pub fn load_default(dir: impl Into<PathBuf>, icon_name: &str) -> io::Result<Self> {
        let disk = DiskAssets::new(dir);
        Self::load(&[&disk, &BundledAssets::new(icon_name)], icon_name)
    }
}

fn load_first(sources: &[&dyn AssetSource], file: &str) -> io::Result<Option<Vec<u8>>> {
    for source in sources {
        if let Some(bytes) = source.load(file)? {
            logger::log_info(&format!("Loaded {file} ({} bytes, {})", bytes.len(), source.name()));
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}

fn load_template(sources: &[&dyn AssetSource], file: &str) -> io::Result<String> {
    let bytes = load_first(sources, file)?.ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("template '{file}' not found"))
    })?;
    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("template '{file}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapAssets(HashMap<&'static str, &'static [u8]>);

    impl AssetSource for MapAssets {
        fn name(&self) -> &str {
            "map"
        }

        fn load(&self, file: &str) -> io::Result<Option<Vec<u8>>> {
            Ok(self.0.get(file).map(|b| b.to_vec()))
        }
    }

    #[test]
    fn test_bundled_has_all_assets() {
        let assets = CachedAssets::load(&[&BundledAssets::new("favicon.ico")], "favicon.ico").unwrap();
        assert!(assets.icon.is_some());
        assert!(assets.icon_gzip.is_some());
        assert!(assets.directory_template.contains("%4%"));
        assert!(assets.error_template.contains("%0%"));
    }

    #[test]
    fn test_bundled_icon_follows_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let assets = CachedAssets::load_default(dir.path(), "site.ico").unwrap();
        let default = CachedAssets::load_default(dir.path(), "favicon.ico").unwrap();
        assert!(assets.icon.is_some());
        assert_eq!(assets.icon, default.icon);

        let bundled = BundledAssets::new("site.ico");
        assert!(bundled.load("favicon.ico").unwrap().is_none());
    }

    #[test]
    fn test_disk_overrides_bundled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ERROR_TEMPLATE), "custom %0%").unwrap();

        let assets = CachedAssets::load_default(dir.path(), "favicon.ico").unwrap();
        assert_eq!(assets.error_template, "custom %0%");
        // Not on disk, so bundled
        assert!(assets.directory_template.contains("%1%"));
    }

    #[test]
    fn test_missing_icon_is_not_fatal() {
        let source = MapAssets(HashMap::from([
            (DIRECTORY_TEMPLATE, b"dir".as_slice()),
            (ERROR_TEMPLATE, b"err".as_slice()),
        ]));
        let assets = CachedAssets::load(&[&source], "favicon.ico").unwrap();
        assert!(assets.icon.is_none());
        assert!(assets.icon_gzip.is_none());
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let source = MapAssets(HashMap::from([(DIRECTORY_TEMPLATE, b"dir".as_slice())]));
        let err = CachedAssets::load(&[&source], "favicon.ico").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_icon_gzip_round_trip() {
        use std::io::Read;

        let assets = CachedAssets::load(&[&BundledAssets::new("favicon.ico")], "favicon.ico").unwrap();
        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(assets.icon_gzip.unwrap().as_ref())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, assets.icon.unwrap().to_vec());
    }
}
