//! Thumbnail store conventions: cache paths, URIs and freshness.
//!
//! Thumbnails live in the per-user cache directory under `thumbnails/`,
//! named by the MD5 digest of the source file's `file://` URI. Sizes up to
//! 128 pixels use the `normal` flavor, larger ones `large`.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Icon name shown while a thumbnail is still loading.
pub const LOADING_ICON_NAME: &str = "image-loading";

/// Largest nominal size served from the `normal` thumbnail flavor.
const NORMAL_FLAVOR_MAX_SIZE: u32 = 128;

/// `file://` URI for a local path, percent-encoded per component.
pub fn file_uri(path: &Path) -> String {
    let mut uri = String::from("file://");
    for component in path.components() {
        match component {
            Component::RootDir => {}
            Component::Normal(part) => {
                uri.push('/');
                uri.push_str(&urlencoding::encode(&part.to_string_lossy()));
            }
            other => {
                uri.push('/');
                uri.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    uri
}

/// Directory holding thumbnails of the flavor matching `nominal_size`.
///
/// `None` when no per-user cache directory can be determined.
pub fn thumbnail_cache_dir(nominal_size: u32) -> Option<PathBuf> {
    let flavor = if nominal_size <= NORMAL_FLAVOR_MAX_SIZE {
        "normal"
    } else {
        "large"
    };
    Some(dirs::cache_dir()?.join("thumbnails").join(flavor))
}

/// Expected path of the thumbnail for `file` at `nominal_size`.
pub fn thumbnail_path(file: &Path, nominal_size: u32) -> Option<PathBuf> {
    let digest = md5::compute(file_uri(file).as_bytes());
    Some(thumbnail_cache_dir(nominal_size)?.join(format!("{:x}.png", digest)))
}

/// Whether `path` points into a thumbnail store.
///
/// Matches both the modern cache location and legacy `.thumbnails`
/// directories in home directories. Thumbnails of thumbnails are not
/// generated.
pub fn is_thumbnail_path(path: &Path) -> bool {
    if path
        .components()
        .any(|c| c.as_os_str() == ".thumbnails")
    {
        return true;
    }
    match dirs::cache_dir() {
        Some(cache) => path.starts_with(cache.join("thumbnails")),
        None => false,
    }
}

/// Whether the thumbnail at `thumbnail` is at least as new as its source.
///
/// A missing or unreadable thumbnail is stale.
pub fn is_thumbnail_fresh(thumbnail: &Path, source_mtime: SystemTime) -> bool {
    match fs::metadata(thumbnail).and_then(|m| m.modified()) {
        Ok(thumb_mtime) => thumb_mtime >= source_mtime,
        Err(_) => false,
    }
}

/// Find an existing, fresh thumbnail for `file`, if the store has one.
pub fn lookup_fresh_thumbnail(file: &Path, nominal_size: u32) -> Option<PathBuf> {
    let source_mtime = fs::metadata(file).and_then(|m| m.modified()).ok()?;
    let path = thumbnail_path(file, nominal_size)?;
    if is_thumbnail_fresh(&path, source_mtime) {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_file_uri_encoding() {
        assert_eq!(
            file_uri(Path::new("/home/user/My Pictures/cat.png")),
            "file:///home/user/My%20Pictures/cat.png"
        );
        assert_eq!(file_uri(Path::new("/a/b.png")), "file:///a/b.png");
    }

    #[test]
    fn test_thumbnail_path_is_stable_digest() {
        let first = thumbnail_path(Path::new("/a/b.png"), 48);
        let second = thumbnail_path(Path::new("/a/b.png"), 48);
        assert_eq!(first, second);
        if let Some(path) = first {
            assert_eq!(path.extension().unwrap(), "png");
            // 32 hex digits plus ".png".
            assert_eq!(path.file_name().unwrap().len(), 36);
        }
    }

    #[test]
    fn test_flavor_selection_by_size() {
        let normal = thumbnail_cache_dir(96);
        let large = thumbnail_cache_dir(192);
        if let (Some(normal), Some(large)) = (normal, large) {
            assert!(normal.ends_with("thumbnails/normal"));
            assert!(large.ends_with("thumbnails/large"));
        }
    }

    #[test]
    fn test_legacy_thumbnail_dir_detected() {
        assert!(is_thumbnail_path(Path::new(
            "/home/user/.thumbnails/normal/abc.png"
        )));
        assert!(!is_thumbnail_path(Path::new("/home/user/photo.png")));
    }

    #[test]
    fn test_freshness() {
        let dir = tempfile::tempdir().unwrap();
        let thumb = dir.path().join("digest.png");
        fs::write(&thumb, b"png bytes").unwrap();
        let written = fs::metadata(&thumb).unwrap().modified().unwrap();

        assert!(is_thumbnail_fresh(&thumb, written - Duration::from_secs(60)));
        assert!(!is_thumbnail_fresh(
            &thumb,
            written + Duration::from_secs(60)
        ));
        assert!(!is_thumbnail_fresh(
            &dir.path().join("missing.png"),
            written
        ));
    }
}
