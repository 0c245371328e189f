//! Provider seams for icon rendering, thumbnail decoding and file metadata.
//!
//! The cache never talks to an icon theme, an SVG rasterizer or the
//! filesystem directly; it consumes these capabilities through the traits
//! here. The bundled implementations cover the common case of icons stored
//! as plain image files; a full XDG theme lookup plugs in behind
//! [`IconSource`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::cache::entry::{AttachPoint, TextRect};
use crate::error::IconError;
use crate::image::IconImage;

/// A rendered icon plus the metadata the source derived while rendering.
pub struct RenderedIcon {
    /// Decoded image, already scaled to the requested size.
    pub image: IconImage,
    /// Human-readable name, if the source knows one.
    pub display_name: Option<String>,
    /// Region where text may be embedded, scaled to the rendered size.
    pub embedded_text_rect: Option<TextRect>,
    /// Emblem attach points, scaled to the rendered size.
    pub attach_points: Vec<AttachPoint>,
}

impl RenderedIcon {
    /// Rendered icon carrying no metadata.
    pub fn bare(image: IconImage) -> Self {
        Self {
            image,
            display_name: None,
            embedded_text_rect: None,
            attach_points: Vec::new(),
        }
    }
}

/// Source of rendered icons: theme lookup plus direct file decode.
pub trait IconSource: Send + Sync {
    /// Render a themed icon by name.
    ///
    /// When a modifier is given the source should try `name-modifier` as the
    /// effective icon name. `IconError::NotFound` means the source has no
    /// such icon; the cache then retries without the modifier and finally
    /// substitutes the fallback icon.
    fn render_icon(
        &self,
        name: &str,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<RenderedIcon, IconError>;

    /// Decode an icon directly from an absolute path.
    fn load_path(
        &self,
        path: &Path,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<RenderedIcon, IconError>;
}

/// Renderer for scalable image formats, consumed as an opaque capability.
pub trait VectorRenderer: Send + Sync {
    /// Rasterize the vector image at `path` to fit `size` pixels.
    ///
    /// Returns the image and the scale factor applied relative to the
    /// document's natural size.
    fn render(&self, path: &Path, size: u32) -> Result<(IconImage, f32), IconError>;
}

/// Decoder for thumbnail files.
///
/// The synchronous form is also what the async load coordinator runs on a
/// blocking worker; completions are delivered back through the service.
pub trait ThumbnailDecoder: Send + Sync {
    /// Decode the thumbnail at `path`, scaled to fit `nominal_size`.
    fn load(
        &self,
        path: &Path,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<DecodedThumbnail, IconError>;
}

/// Result of a thumbnail decode.
pub struct DecodedThumbnail {
    /// Decoded image, scaled to the requested size.
    pub image: IconImage,
    /// Horizontal scale applied relative to the stored thumbnail.
    pub scale_x: f32,
    /// Vertical scale applied relative to the stored thumbnail.
    pub scale_y: f32,
}

/// Stat result for a pathname-keyed icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStatInfo {
    /// Whether the path refers to a regular file.
    pub is_regular: bool,
    /// Last modification time.
    pub mtime: SystemTime,
}

/// Stat-equivalent metadata access for pathname keys.
pub trait FileStat: Send + Sync {
    /// Stat `path`; `None` when the path does not exist or is inaccessible.
    fn stat(&self, path: &Path) -> Option<FileStatInfo>;
}

/// [`FileStat`] backed by `std::fs`.
pub struct StdFileStat;

impl FileStat for StdFileStat {
    fn stat(&self, path: &Path) -> Option<FileStatInfo> {
        let metadata = fs::metadata(path).ok()?;
        Some(FileStatInfo {
            is_regular: metadata.is_file(),
            mtime: metadata.modified().ok()?,
        })
    }
}

const ICON_FILE_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];

/// Icon source that resolves icon names against flat directories of image
/// files and decodes pathname icons with the `image` crate.
///
/// SVG files are delegated to an optional [`VectorRenderer`]; without one
/// they report `UnsupportedFormat` and the cache falls back.
pub struct DirIconSource {
    search_dirs: Vec<PathBuf>,
    vector: Option<Box<dyn VectorRenderer>>,
}

impl DirIconSource {
    /// Create a source searching the given directories in order.
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            vector: None,
        }
    }

    /// Attach a renderer for scalable icon files.
    pub fn with_vector_renderer(mut self, vector: Box<dyn VectorRenderer>) -> Self {
        self.vector = Some(vector);
        self
    }

    fn find_icon_file(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            for ext in ICON_FILE_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", name, ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn decode_file(
        &self,
        path: &Path,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<IconImage, IconError> {
        if path_represents_vector_image(path) {
            let vector = self
                .vector
                .as_ref()
                .ok_or_else(|| IconError::UnsupportedFormat("svg".to_string()))?;
            let (image, scale) = vector.render(path, nominal_size)?;
            log::debug!("rendered vector icon {:?} at scale {}", path, scale);
            return Ok(image);
        }

        let bytes = fs::read(path)?;
        let decoded = image::load_from_memory(&bytes)?;
        Ok(scale_to_nominal(&decoded, nominal_size, force_nominal))
    }
}

impl IconSource for DirIconSource {
    fn render_icon(
        &self,
        name: &str,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<RenderedIcon, IconError> {
        let effective = match modifier {
            Some(modifier) => format!("{}-{}", name, modifier),
            None => name.to_string(),
        };
        let path = self
            .find_icon_file(&effective)
            .ok_or_else(|| IconError::NotFound(effective.clone()))?;
        let image = self.decode_file(&path, nominal_size, force_nominal)?;
        Ok(RenderedIcon::bare(image))
    }

    fn load_path(
        &self,
        path: &Path,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<RenderedIcon, IconError> {
        if !path.is_file() {
            return Err(IconError::InvalidPath(path.to_path_buf()));
        }
        let image = self.decode_file(path, nominal_size, force_nominal)?;
        Ok(RenderedIcon::bare(image))
    }
}

/// Thumbnail decoder backed by the `image` crate.
pub struct ImageThumbnailDecoder;

impl ThumbnailDecoder for ImageThumbnailDecoder {
    fn load(
        &self,
        path: &Path,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Result<DecodedThumbnail, IconError> {
        let bytes = fs::read(path)?;
        let decoded = image::load_from_memory(&bytes)?;
        let (orig_w, orig_h) = (decoded.width(), decoded.height());
        let image = scale_to_nominal(&decoded, nominal_size, force_nominal);
        Ok(DecodedThumbnail {
            scale_x: image.width() as f32 / orig_w as f32,
            scale_y: image.height() as f32 / orig_h as f32,
            image,
        })
    }
}

/// Whether a path names a scalable image, judged by extension only.
/// Content sniffing is deliberately avoided here.
pub fn path_represents_vector_image(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            ext == "svg" || ext == "svgz"
        }
        None => false,
    }
}

/// Scale a decoded image to the nominal size.
///
/// With `force_nominal` the result never exceeds the nominal size. Without
/// it an icon whose native size fits within the next rung of the size
/// ladder is kept as-is, since themed icons come in fixed base sizes.
fn scale_to_nominal(
    decoded: &image::DynamicImage,
    nominal_size: u32,
    force_nominal: bool,
) -> IconImage {
    let limit = if force_nominal {
        nominal_size
    } else {
        crate::sizes::larger_icon_size(nominal_size)
    };
    let (w, h) = (decoded.width(), decoded.height());
    if w <= limit && h <= limit {
        return IconImage::from_dynamic(decoded);
    }
    let resized = decoded.resize(
        nominal_size,
        nominal_size,
        image::imageops::FilterType::Triangle,
    );
    IconImage::from_dynamic(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_dir_source_finds_named_icon() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("folder.png"), 48, 48);

        let source = DirIconSource::new(vec![dir.path().to_path_buf()]);
        let rendered = source.render_icon("folder", None, 48, false).unwrap();
        assert_eq!(rendered.image.width(), 48);
    }

    #[test]
    fn test_dir_source_modifier_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("folder-open.png"), 48, 48);

        let source = DirIconSource::new(vec![dir.path().to_path_buf()]);
        assert!(source.render_icon("folder", Some("open"), 48, false).is_ok());
        assert!(matches!(
            source.render_icon("folder", None, 48, false),
            Err(IconError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_path_scales_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        write_png(&path, 256, 128);

        let source = DirIconSource::new(Vec::new());
        let rendered = source.load_path(&path, 64, false).unwrap();
        assert!(rendered.image.width() <= 64);
        assert!(rendered.image.height() <= 64);
    }

    #[test]
    fn test_force_nominal_shrinks_modest_overshoot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        write_png(&path, 56, 56);

        let source = DirIconSource::new(Vec::new());
        // Non-forced: 56 fits within the next ladder rung above 48.
        let relaxed = source.load_path(&path, 48, false).unwrap();
        assert_eq!(relaxed.image.width(), 56);
        // Forced: must not exceed the nominal size.
        let forced = source.load_path(&path, 48, true).unwrap();
        assert!(forced.image.width() <= 48);
    }

    #[test]
    fn test_thumbnail_decoder_reports_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.png");
        write_png(&path, 128, 128);

        let decoded = ImageThumbnailDecoder.load(&path, 64, false).unwrap();
        assert_eq!(decoded.image.width(), 64);
        assert!((decoded.scale_x - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_vector_extension_detection() {
        assert!(path_represents_vector_image(Path::new("/a/icon.svg")));
        assert!(path_represents_vector_image(Path::new("/a/icon.SVGZ")));
        assert!(!path_represents_vector_image(Path::new("/a/icon.png")));
    }
}
