//! Directory responder
//!
//! Renders the immediate children of a directory into the listing
//! template: subdirectories first, then files, each group sorted by name
//! (ordinal, byte-wise comparison).

use chrono::{DateTime, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};
use hyper::header::{CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use hyper::{Response, StatusCode};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use super::{RequestContext, ServeError};
use crate::config::AppState;
use crate::html;
use crate::http::encoding;
use crate::http::response::{self, ResponseBody};
use crate::resolve;

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
    /// File size, or folder size (0 unless folder sizes are enabled)
    pub size: u64,
}

/// How folder sizes are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderSizes {
    /// Always report 0
    Off,
    /// Recursive sum, visiting at most this many entries per folder
    Bounded(usize),
}

/// Enumerate `dir`: subdirectories sorted by name, then files sorted by name
///
/// Children that disappear or cannot be inspected mid-enumeration are
/// skipped, and so are symlinks leading outside `root` and names a link
/// could not address (a `\` inside the name splits it on the way back in).
/// Symlinks inside the root are listed as what they point to.
pub fn list_directory(dir: &Path, root: &Path, sizes: FolderSizes) -> io::Result<Vec<ListingEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains('\\') {
            continue;
        }

        let path = entry.path();
        if !stays_inside(&path, root) {
            continue;
        }
        let Ok(meta) = std::fs::metadata(&path) else {
            continue;
        };

        let modified = meta.modified().ok();
        if meta.is_dir() {
            let size = match sizes {
                FolderSizes::Off => 0,
                FolderSizes::Bounded(max_entries) => folder_size(&path, max_entries),
            };
            dirs.push(ListingEntry {
                name,
                path,
                is_dir: true,
                modified,
                size,
            });
        } else if meta.is_file() {
            files.push(ListingEntry {
                name,
                path,
                is_dir: false,
                modified,
                size: meta.len(),
            });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    Ok(dirs)
}

/// Whether `path` is a plain child or a symlink whose target is under `root`
fn stays_inside(path: &Path, root: &Path) -> bool {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => path
            .canonicalize()
            .is_ok_and(|target| target.starts_with(root)),
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Sum of file sizes below `dir`, giving up after `max_entries` entries
///
/// Symlinks below `dir` are not followed; `dir` itself must already be
/// known to lie inside the root.
pub fn folder_size(dir: &Path, max_entries: usize) -> u64 {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .take(max_entries)
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Last-write time as shown in listings, e.g. `3/7/2024 4:05:09 PM`
fn format_listing_time(time: Option<SystemTime>) -> String {
    time.map(|t| {
        DateTime::<Local>::from(t)
            .format("%-m/%-d/%Y %-I:%M:%S %p")
            .to_string()
    })
    .unwrap_or_default()
}

/// Table rows for the listing, one line per entry
pub fn render_rows(entries: &[ListingEntry], host: &str, root: &Path) -> String {
    let host = encode_double_quoted_attribute(host);
    let mut rows = String::new();

    for entry in entries {
        let url = resolve::to_url(&entry.path, root);
        let name = encode_text(&entry.name);
        let slash = if entry.is_dir { "/" } else { "" };
        rows.push_str(&format!(
            "<tr><td class=\"name\"><a href=\"//{host}/{url}{slash}\">/{name}{slash}</a></td>\
             <td class=\"date\">{}</td><td class=\"size\">{} KB</td></tr>\n",
            format_listing_time(entry.modified),
            entry.size / 1024,
        ));
    }
    rows
}

/// Fill the listing template for `dir`
///
/// Placeholders: `%0%` directory name, `%1%` page title, `%2%` parent
/// link, `%3%` root link, `%4%` table rows.
pub fn render_listing(
    template: &str,
    dir: &Path,
    root: &Path,
    url_path: &str,
    host: &str,
    entries: &[ListingEntry],
) -> String {
    let escaped_host = encode_double_quoted_attribute(host);
    let name = directory_name(dir);
    let name = encode_text(&name);
    let title = format!("Directory of {url_path}");
    let title = encode_text(&title);
    let parent = format!(
        "//{escaped_host}/{}",
        resolve::to_url(&resolve::parent_of(dir, root), root)
    );
    let root_link = format!("//{escaped_host}/");
    let rows = render_rows(entries, host, root);

    html::fill_template(
        template,
        &[name.as_ref(), title.as_ref(), &parent, &root_link, &rows],
    )
}

fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().into_owned())
}

/// Serve the HTML listing of `dir` (always 200)
pub async fn serve_directory(
    dir: &Path,
    ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    let sizes = if state.config.files.show_folder_size {
        FolderSizes::Bounded(state.config.files.folder_size_max_entries)
    } else {
        FolderSizes::Off
    };

    let owned_dir = dir.to_path_buf();
    let root = state.root.clone();
    let entries = tokio::task::spawn_blocking(move || list_directory(&owned_dir, &root, sizes)).await??;
    let modified = tokio::fs::metadata(dir).await?.modified().ok();

    let page = render_listing(
        &state.assets.directory_template,
        dir,
        &state.root,
        &ctx.decoded_path(),
        &ctx.host,
        &entries,
    );
    let (body, gzipped) = encoding::negotiate(page.into_bytes(), ctx.accept_encoding.as_deref())?;

    let name = directory_name(dir);
    let mut builder = response::builder(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=UTF-8")
        .header(CONTENT_LANGUAGE, "en")
        .header(CONTENT_DISPOSITION, response::inline_disposition(&format!("{name}.html")))
        .header(CONTENT_LENGTH, body.len());
    if gzipped {
        builder = builder.header(CONTENT_ENCODING, "gzip");
    }
    if let Some(modified) = modified {
        builder = builder.header(LAST_MODIFIED, response::http_date(modified));
    }

    Ok(response::finish(builder, response::full_body(body), "directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing;
    use http_body_util::BodyExt;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.txt"), vec![0u8; 3000]).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::create_dir(root.join("z")).unwrap();
        fs::write(root.join("z/inner.bin"), vec![0u8; 4096]).unwrap();
        fs::create_dir(root.join("z/deeper")).unwrap();
        fs::write(root.join("z/deeper/more.bin"), vec![0u8; 2048]).unwrap();
        dir
    }

    fn names(entries: &[ListingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_directories_first_then_sorted() {
        let dir = fixture();
        fs::create_dir(dir.path().join("B-dir")).unwrap();
        fs::write(dir.path().join("C.txt"), b"c").unwrap();

        let entries = list_directory(dir.path(), dir.path(), FolderSizes::Off).unwrap();
        // Ordinal: uppercase sorts before lowercase
        assert_eq!(names(&entries), ["B-dir", "z", "C.txt", "a.txt", "b.txt"]);
        assert!(entries[0].is_dir && entries[1].is_dir);
        assert!(!entries[2].is_dir);
    }

    #[test]
    fn test_folder_sizes() {
        let dir = fixture();
        let off = list_directory(dir.path(), dir.path(), FolderSizes::Off).unwrap();
        assert_eq!(off[0].size, 0);

        let on = list_directory(dir.path(), dir.path(), FolderSizes::Bounded(1000)).unwrap();
        assert_eq!(on[0].name, "z");
        assert_eq!(on[0].size, 4096 + 2048);
        assert_eq!(on[2].size, 3000);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_leaving_root_are_not_listed() {
        use std::os::unix::fs::symlink;

        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.bin"), vec![0u8; 50_000]).unwrap();
        fs::write(outside.path().join("lone.txt"), b"x").unwrap();

        symlink(outside.path(), root.join("escape")).unwrap();
        symlink(outside.path().join("lone.txt"), root.join("escape.txt")).unwrap();
        symlink(root.join("z"), root.join("inner-link")).unwrap();

        let entries = list_directory(&root, &root, FolderSizes::Bounded(1000)).unwrap();
        assert_eq!(names(&entries), ["inner-link", "z", "a.txt", "b.txt"]);
        assert_eq!(entries[0].size, 4096 + 2048);
        assert!(entries.iter().all(|e| e.size < 50_000));
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_names_are_not_listed() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("a\\b.txt"), b"x").unwrap();

        let entries = list_directory(&root, &root, FolderSizes::Off).unwrap();
        assert_eq!(names(&entries), ["z", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_folder_size_is_bounded() {
        let dir = fixture();
        assert_eq!(folder_size(&dir.path().join("z"), 0), 0);
        assert!(folder_size(&dir.path().join("z"), 1) <= 4096);
    }

    #[test]
    fn test_render_rows() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let entries = list_directory(&root, &root, FolderSizes::Off).unwrap();
        let rows = render_rows(&entries, "host:8080", &root);
        let lines: Vec<&str> = rows.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("<tr><td class=\"name\"><a href=\"//host:8080/z/\">/z/</a></td>"));
        assert!(lines[0].ends_with("<td class=\"size\">0 KB</td></tr>"));
        assert!(lines[1].contains("<a href=\"//host:8080/a.txt\">/a.txt</a>"));
        assert!(lines[2].contains("<td class=\"size\">2 KB</td>"));
    }

    #[test]
    fn test_render_escapes_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("<b>&x.txt"), b"x").unwrap();

        let entries = list_directory(&root, &root, FolderSizes::Off).unwrap();
        let rows = render_rows(&entries, "h", &root);
        assert!(rows.contains("/&lt;b&gt;&amp;x.txt</a>"));
        assert!(rows.contains("href=\"//h/%3Cb%3E&amp;x.txt\""));
    }

    #[test]
    fn test_render_listing_placeholders() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        let sub = root.join("z");
        let entries = list_directory(&sub, &root, FolderSizes::Off).unwrap();
        let template = "%0%|%1%|%2%|%3%|%4%";

        let page = render_listing(template, &sub, &root, "/z/", "h", &entries);
        let parts: Vec<&str> = page.splitn(5, '|').collect();
        assert_eq!(parts[0], "z");
        assert_eq!(parts[1], "Directory of /z/");
        assert_eq!(parts[2], "//h/");
        assert_eq!(parts[3], "//h/");
        assert!(parts[4].contains("href=\"//h/z/deeper/\""));
        assert!(parts[4].contains("href=\"//h/z/inner.bin\""));
    }

    #[tokio::test]
    async fn test_serve_directory() {
        let dir = fixture();
        let state = testing::state(dir.path());

        let resp = serve_directory(&state.root, &RequestContext::get("/"), &state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=UTF-8");
        assert_eq!(resp.headers()[CONTENT_LANGUAGE], "en");
        assert!(!resp.headers().contains_key(CONTENT_ENCODING));

        let length: usize = resp.headers()[CONTENT_LENGTH].to_str().unwrap().parse().unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), length);

        let page = String::from_utf8(body.to_vec()).unwrap();
        let z = page.find("/z/</a>").unwrap();
        let a = page.find("/a.txt</a>").unwrap();
        let b = page.find("/b.txt</a>").unwrap();
        assert!(z < a && a < b);
    }

    #[tokio::test]
    async fn test_serve_directory_gzip_matches_plain() {
        use std::io::Read;

        let dir = fixture();
        let state = testing::state(dir.path());

        let plain = serve_directory(&state.root, &RequestContext::get("/"), &state).await.unwrap();
        let plain = plain.into_body().collect().await.unwrap().to_bytes();

        let ctx = RequestContext::get("/").with_accept_encoding("gzip, deflate");
        let gz = serve_directory(&state.root, &ctx, &state).await.unwrap();
        assert_eq!(gz.headers()[CONTENT_ENCODING], "gzip");
        let gz_len: usize = gz.headers()[CONTENT_LENGTH].to_str().unwrap().parse().unwrap();
        let gz = gz.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(gz.len(), gz_len);

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(gz.as_ref()).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, plain.to_vec());
    }
}
