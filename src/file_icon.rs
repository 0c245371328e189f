//! Choosing an icon name for a file.
//!
//! The service resolves a file to an icon name before consulting the cache:
//! a custom icon set on the file wins, then special-cased locations, then a
//! fresh thumbnail (keyed by the thumbnail's pathname), then the MIME type.

use std::path::{Path, PathBuf};

use crate::thumbnail;

/// The facts about a file the icon choice depends on.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// MIME type, when already known. Guessed from the extension otherwise.
    pub mime_type: Option<String>,
    pub is_dir: bool,
    /// Per-file custom icon: an icon name or an absolute image path.
    pub custom_icon: Option<String>,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime_type: None,
            is_dir: false,
            custom_icon: None,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            is_dir: true,
            ..Self::new(path)
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_custom_icon(mut self, icon: impl Into<String>) -> Self {
        self.custom_icon = Some(icon.into());
        self
    }
}

/// Pick the icon name (or image pathname) for a file.
///
/// `nominal_size` only influences which thumbnail flavor is consulted.
pub fn icon_name_for_file(file: &FileInfo, nominal_size: u32) -> String {
    if let Some(custom) = &file.custom_icon {
        // Custom icons may be stored as file:// URIs.
        if let Some(uri_path) = custom.strip_prefix("file://") {
            return urlencoding::decode(uri_path)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| uri_path.to_string());
        }
        return strip_icon_suffix(custom).to_string();
    }

    if let Some(special) = special_icon_name(&file.path, file.is_dir) {
        return special.to_string();
    }

    // An image file that already has a fresh thumbnail is shown through it.
    // Thumbnails themselves are shown directly, never re-thumbnailed.
    if !file.is_dir && !thumbnail::is_thumbnail_path(&file.path) {
        if let Some(thumb) = thumbnail::lookup_fresh_thumbnail(&file.path, nominal_size) {
            return thumb.to_string_lossy().into_owned();
        }
    }

    if file.is_dir {
        return "folder".to_string();
    }

    let mime = match &file.mime_type {
        Some(mime) => mime.clone(),
        None => guess_mime_type(&file.path),
    };
    mime_to_icon_name(&mime)
}

/// Icon name for an emblem keyword.
pub fn emblem_icon_name(keyword: &str) -> String {
    format!("emblem-{}", keyword)
}

/// Strip a recognized image-file suffix from an icon name.
///
/// Icon names stored in metadata sometimes carry the file extension of the
/// image they came from; theme lookup wants the bare name.
pub fn strip_icon_suffix(name: &str) -> &str {
    for suffix in [".svg", ".svgz", ".png", ".jpg", ".xpm"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped;
        }
    }
    name
}

fn special_icon_name(path: &Path, is_dir: bool) -> Option<&'static str> {
    if !is_dir {
        return None;
    }
    if Some(path) == dirs::home_dir().as_deref() {
        return Some("user-home");
    }
    if dirs::data_dir().map_or(false, |data| path == data.join("Trash")) {
        return Some("user-trash");
    }
    None
}

fn guess_mime_type(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            mime_guess2::from_ext(ext)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Map a MIME type to a themed icon name.
pub fn mime_to_icon_name(mime_type: &str) -> String {
    let (main_type, sub_type) = match mime_type.split_once('/') {
        Some(parts) => parts,
        None => return "text-x-generic".to_string(),
    };

    match main_type {
        "image" => "image-x-generic".to_string(),
        "video" => "video-x-generic".to_string(),
        "audio" => "audio-x-generic".to_string(),
        "text" => match sub_type {
            "html" => "text-html".to_string(),
            _ => "text-x-generic".to_string(),
        },
        "application" => match sub_type {
            "pdf" => "application-pdf".to_string(),
            "zip" | "x-zip-compressed" => "application-zip".to_string(),
            "x-tar" => "application-x-tar".to_string(),
            "x-gzip" | "gzip" => "application-x-gzip".to_string(),
            "x-executable" | "x-sharedlib" => "application-x-executable".to_string(),
            "x-shellscript" | "x-sh" => "application-x-shellscript".to_string(),
            _ => "application-x-generic".to_string(),
        },
        "inode" => match sub_type {
            "directory" => "folder".to_string(),
            "symlink" => "inode-symlink".to_string(),
            _ => "text-x-generic".to_string(),
        },
        _ => "text-x-generic".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_icon_wins() {
        let file = FileInfo::new("/data/report.pdf").with_custom_icon("my-icon.png");
        assert_eq!(icon_name_for_file(&file, 48), "my-icon");
    }

    #[test]
    fn test_custom_icon_uri_resolves_to_pathname() {
        let file = FileInfo::new("/data/x").with_custom_icon("file:///icons/My%20Icon.png");
        assert_eq!(icon_name_for_file(&file, 48), "/icons/My Icon.png");
    }

    #[test]
    fn test_directory_icon() {
        let file = FileInfo::directory("/data/projects");
        assert_eq!(icon_name_for_file(&file, 48), "folder");
    }

    #[test]
    fn test_home_directory_icon() {
        if let Some(home) = dirs::home_dir() {
            let file = FileInfo::directory(home);
            assert_eq!(icon_name_for_file(&file, 48), "user-home");
        }
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(mime_to_icon_name("image/png"), "image-x-generic");
        assert_eq!(mime_to_icon_name("application/pdf"), "application-pdf");
        assert_eq!(mime_to_icon_name("text/plain"), "text-x-generic");
        assert_eq!(mime_to_icon_name("inode/directory"), "folder");
        assert_eq!(mime_to_icon_name("nonsense"), "text-x-generic");
    }

    #[test]
    fn test_extension_guessing() {
        let file = FileInfo::new("/data/song.mp3");
        assert_eq!(icon_name_for_file(&file, 48), "audio-x-generic");
        let file = FileInfo::new("/data/clip.mp4");
        assert_eq!(icon_name_for_file(&file, 48), "video-x-generic");
    }

    #[test]
    fn test_explicit_mime_overrides_extension() {
        let file = FileInfo::new("/data/odd.bin").with_mime_type("image/png");
        assert_eq!(icon_name_for_file(&file, 48), "image-x-generic");
    }

    #[test]
    fn test_emblem_name() {
        assert_eq!(emblem_icon_name("important"), "emblem-important");
    }

    #[test]
    fn test_strip_icon_suffix() {
        assert_eq!(strip_icon_suffix("folder.png"), "folder");
        assert_eq!(strip_icon_suffix("drawing.svgz"), "drawing");
        assert_eq!(strip_icon_suffix("folder"), "folder");
        assert_eq!(strip_icon_suffix("folder.ico"), "folder.ico");
    }
}
