//! Raw RGBA icon images and decorative frame compositing.

use std::sync::Arc;

/// Width of the white matte drawn around framed thumbnails, in pixels.
const FRAME_MARGIN: u32 = 3;
/// Width of the outline around the matte, in pixels.
const FRAME_OUTLINE: u32 = 1;

const MATTE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
const OUTLINE: [u8; 4] = [0x8e, 0x8e, 0x8e, 0xff];

/// A decoded icon image: tightly packed RGBA pixels.
///
/// Images are immutable once constructed; the cache shares them with callers
/// through [`ImageHandle`] clones and never mutates a published image.
#[derive(Debug, Clone)]
pub struct IconImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
    has_alpha: bool,
}

/// Shared handle to a cached image.
pub type ImageHandle = Arc<IconImage>;

impl IconImage {
    /// Create an image from a raw RGBA buffer.
    ///
    /// `data` must hold exactly `width * height * 4` bytes. `has_alpha`
    /// records whether the original source carried an alpha channel; opaque
    /// thumbnails get a decorative frame, translucent ones do not.
    pub fn new(width: u32, height: u32, data: Vec<u8>, has_alpha: bool) -> Self {
        // Widened before multiplying; the pixel count of a large source can
        // exceed u32.
        let expected = width as usize * height as usize * 4;
        assert_eq!(data.len(), expected);
        Self {
            width,
            height,
            data,
            has_alpha,
        }
    }

    /// Convert a decoded [`image::DynamicImage`].
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw(), has_alpha)
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the source image carried an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Composite this image onto a photo-style frame: a white matte with a
    /// thin grey outline. Used for opaque thumbnails at entry construction
    /// time, before the image is published to the cache.
    pub fn framed(&self) -> IconImage {
        let border = FRAME_MARGIN + FRAME_OUTLINE;
        let width = self.width + 2 * border;
        let height = self.height + 2 * border;
        let mut data = vec![0u8; (width * height * 4) as usize];

        for y in 0..height {
            for x in 0..width {
                let on_outline = x < FRAME_OUTLINE
                    || y < FRAME_OUTLINE
                    || x >= width - FRAME_OUTLINE
                    || y >= height - FRAME_OUTLINE;
                let idx = ((y * width + x) * 4) as usize;
                let color = if on_outline { OUTLINE } else { MATTE };
                data[idx..idx + 4].copy_from_slice(&color);
            }
        }

        for y in 0..self.height {
            let src = ((y * self.width) * 4) as usize;
            let dst = (((y + border) * width + border) * 4) as usize;
            let row = (self.width * 4) as usize;
            data[dst..dst + row].copy_from_slice(&self.data[src..src + row]);
        }

        // The frame itself is opaque; the framed image keeps no alpha.
        IconImage::new(width, height, data, false)
    }

    /// Build the default document glyph used as the fallback icon: a white
    /// page with a grey border and a folded top-right corner.
    pub fn fallback(size: u32) -> IconImage {
        let size = size.max(8);
        let fold = size / 4;
        let mut data = vec![0u8; (size * size * 4) as usize];

        for y in 0..size {
            for x in 0..size {
                // The folded corner is cut away above the diagonal.
                if x >= size - fold + y {
                    continue;
                }
                let on_diagonal = x + 1 == size - fold + y && y < fold;
                let on_border =
                    x == 0 || y == 0 || x == size - 1 || y == size - 1 || on_diagonal;
                let idx = ((y * size + x) * 4) as usize;
                let color = if on_border { OUTLINE } else { MATTE };
                data[idx..idx + 4].copy_from_slice(&color);
            }
        }

        IconImage::new(size, size, data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_dimensions() {
        let img = IconImage::new(10, 6, vec![0xff; 10 * 6 * 4], false);
        let framed = img.framed();
        assert_eq!(framed.width(), 10 + 8);
        assert_eq!(framed.height(), 6 + 8);
        assert!(!framed.has_alpha());
    }

    #[test]
    fn test_framed_preserves_content() {
        let mut data = vec![0u8; 4 * 4 * 4];
        data[0..4].copy_from_slice(&[1, 2, 3, 255]);
        let img = IconImage::new(4, 4, data, false);
        let framed = img.framed();
        let border = FRAME_MARGIN + FRAME_OUTLINE;
        let idx = ((border * framed.width() + border) * 4) as usize;
        assert_eq!(&framed.data()[idx..idx + 4], &[1, 2, 3, 255]);
    }

    #[test]
    #[should_panic]
    fn test_new_rejects_short_buffer_for_huge_dimensions() {
        // 65536 * 65536 * 4 wraps to 0 in u32 arithmetic; the length check
        // must still reject an empty buffer.
        IconImage::new(65536, 65536, Vec::new(), false);
    }

    #[test]
    fn test_fallback_has_expected_size() {
        let img = IconImage::fallback(48);
        assert_eq!(img.width(), 48);
        assert_eq!(img.height(), 48);
        assert!(img.has_alpha());
    }
}
