//! Path resolution
//!
//! Maps request URL paths onto the served folder and back. Every path
//! handed out by [`resolve`] lies inside the root, both lexically and after
//! symlinks are followed.

use html_escape::{decode_html_entities, encode_double_quoted_attribute};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Characters percent-encoded inside one path segment of a link
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Why a URL path has no local counterpart
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("path is not valid percent-encoded UTF-8")]
    Encoding,
    #[error("path contains an invalid segment")]
    InvalidSegment,
    #[error("path escapes the root folder")]
    Escapes,
}

/// Map a request URL path to a local path under `root`
///
/// `root` must be canonical. The URL path is percent-decoded, then HTML
/// entities are decoded, surrounding whitespace and leading separators are
/// dropped, and `/` and `\` both split segments.
pub fn resolve(url_path: &str, root: &Path) -> Result<PathBuf, Rejected> {
    let decoded = percent_decode_str(url_path)
        .decode_utf8()
        .map_err(|_| Rejected::Encoding)?;
    let decoded = decode_html_entities(&decoded);
    let relative = decoded.trim().trim_start_matches(['/', '\\']);

    let mut path = root.to_path_buf();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if path == root {
                    return Err(Rejected::Escapes);
                }
                path.pop();
            }
            name => {
                if !is_plain_segment(name) {
                    return Err(Rejected::InvalidSegment);
                }
                path.push(name);
            }
        }
    }

    // Lexically inside the root; make sure symlinks do not lead out of it
    if path.symlink_metadata().is_ok() {
        let canonical = path.canonicalize().map_err(|_| Rejected::Escapes)?;
        if !canonical.starts_with(root) {
            return Err(Rejected::Escapes);
        }
        return Ok(canonical);
    }
    Ok(path)
}

/// A segment that names exactly one child (no drive prefixes, no NUL)
fn is_plain_segment(name: &str) -> bool {
    if name.contains('\0') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Inverse of [`resolve`], for links in directory listings
///
/// Returns the part of `local` below `root` with `/` separators, each
/// segment percent-encoded, the whole HTML-escaped. Empty when `local` is
/// the root itself or lies outside it.
pub fn to_url(local: &Path, root: &Path) -> String {
    let Ok(rest) = local.strip_prefix(root) else {
        return String::new();
    };

    let segments: Vec<String> = rest
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => {
                Some(utf8_percent_encode(&name.to_string_lossy(), SEGMENT).to_string())
            }
            _ => None,
        })
        .collect();

    encode_double_quoted_attribute(&segments.join("/")).into_owned()
}

/// Directory the "parent" link of a listing points to
///
/// The root is its own parent.
pub fn parent_of(dir: &Path, root: &Path) -> PathBuf {
    if dir == root {
        return root.to_path_buf();
    }
    dir.parent()
        .filter(|p| p.starts_with(root))
        .map_or_else(|| root.to_path_buf(), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("docs/sub")).unwrap();
        fs::write(root.join("docs/a b.txt"), b"x").unwrap();
        (dir, root)
    }

    #[test]
    fn test_resolve_plain() {
        let (_dir, root) = root();
        assert_eq!(resolve("/", &root).unwrap(), root);
        assert_eq!(resolve("/docs/sub", &root).unwrap(), root.join("docs/sub"));
        assert_eq!(resolve("docs/sub/", &root).unwrap(), root.join("docs/sub"));
    }

    #[test]
    fn test_resolve_decodes() {
        let (_dir, root) = root();
        assert_eq!(resolve("/docs/a%20b.txt", &root).unwrap(), root.join("docs/a b.txt"));
        assert_eq!(resolve("/x&amp;y&lt;1&gt;", &root).unwrap(), root.join("x&y<1>"));
        assert_eq!(resolve("/docs/a&#32;b.txt", &root).unwrap(), root.join("docs/a b.txt"));
        assert_eq!(resolve("  /docs\\sub ", &root).unwrap(), root.join("docs/sub"));
    }

    #[test]
    fn test_resolve_missing_stays_in_root() {
        let (_dir, root) = root();
        assert_eq!(resolve("/favicon.ico", &root).unwrap(), root.join("favicon.ico"));
        assert_eq!(resolve("/docs/../nope", &root).unwrap(), root.join("nope"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (_dir, root) = root();
        assert_eq!(resolve("/../../etc/passwd", &root), Err(Rejected::Escapes));
        assert_eq!(resolve("/docs/../../etc", &root), Err(Rejected::Escapes));
        assert_eq!(resolve("/%2e%2e/%2e%2e/etc", &root), Err(Rejected::Escapes));
        assert_eq!(resolve("/..\\..\\etc", &root), Err(Rejected::Escapes));
        assert_eq!(resolve("/docs/%00", &root), Err(Rejected::InvalidSegment));
        assert_eq!(resolve("/%ff%fe", &root), Err(Rejected::Encoding));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let (_dir, root) = root();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();
        assert_eq!(resolve("/link", &root), Err(Rejected::Escapes));
    }

    #[test]
    fn test_to_url() {
        let (_dir, root) = root();
        assert_eq!(to_url(&root.join("docs/sub"), &root), "docs/sub");
        assert_eq!(to_url(&root.join("docs/a b.txt"), &root), "docs/a%20b.txt");
        assert_eq!(to_url(&root.join("x&y#1"), &root), "x&amp;y%231");
        assert_eq!(to_url(&root, &root), "");
        assert_eq!(to_url(Path::new("/somewhere/else"), &root), "");
    }

    #[test]
    fn test_to_url_round_trip() {
        let (_dir, root) = root();
        let local = root.join("docs/a b.txt");
        let url = decode_html_entities(&to_url(&local, &root)).into_owned();
        assert_eq!(resolve(&url, &root).unwrap(), local);
    }

    #[test]
    fn test_parent_of() {
        let (_dir, root) = root();
        assert_eq!(parent_of(&root, &root), root);
        assert_eq!(parent_of(&root.join("docs"), &root), root);
        assert_eq!(parent_of(&root.join("docs/sub"), &root), root.join("docs"));
    }
}
