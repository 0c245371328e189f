//! Cache entries and the caller-facing icon handle.

use std::sync::Arc;
use std::time::SystemTime;

use crate::image::ImageHandle;
use crate::source::RenderedIcon;

/// Region of an icon where text may be embedded, in icon pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Point where an emblem may be attached, in icon pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachPoint {
    pub x: i32,
    pub y: i32,
}

/// A cached icon plus the metadata derived when it was rendered.
///
/// Entries stay in the mapping until swept or invalidated. The image itself
/// is shared out to callers via [`ImageHandle`] clones, so dropping an entry
/// never invalidates an image a caller still holds.
pub(crate) struct CacheEntry {
    pub(crate) image: ImageHandle,
    pub(crate) embedded_text_rect: Option<TextRect>,
    pub(crate) attach_points: Vec<AttachPoint>,
    pub(crate) display_name: Option<String>,
    /// Source modification time; set only for pathname keys.
    pub(crate) mtime: Option<SystemTime>,
    /// Slot in the recency list, or `None` when unprotected.
    pub(crate) recency_slot: Option<usize>,
    /// Sweeps survived since the last access.
    pub(crate) age: u32,
}

impl CacheEntry {
    pub(crate) fn new(rendered: RenderedIcon, mtime: Option<SystemTime>) -> Self {
        Self {
            image: Arc::new(rendered.image),
            embedded_text_rect: rendered.embedded_text_rect,
            attach_points: rendered.attach_points,
            display_name: rendered.display_name,
            mtime,
            recency_slot: None,
            age: 0,
        }
    }

    /// Entry wrapping a bare image with no render metadata. Used for the
    /// fallback icon and asynchronously loaded thumbnails.
    pub(crate) fn from_image(image: ImageHandle) -> Self {
        Self {
            image,
            embedded_text_rect: None,
            attach_points: Vec::new(),
            display_name: None,
            mtime: None,
            recency_slot: None,
            age: 0,
        }
    }

    pub(crate) fn to_icon(&self, is_fallback: bool) -> Icon {
        Icon {
            image: self.image.clone(),
            embedded_text_rect: self.embedded_text_rect,
            attach_points: self.attach_points.clone(),
            display_name: self.display_name.clone(),
            is_fallback,
        }
    }
}

/// A cached icon as handed to a caller.
///
/// The `image` handle keeps the pixels alive independently of the cache;
/// dropping it is the release operation. While any caller handle exists the
/// sweep will not free the underlying image.
#[derive(Debug, Clone)]
pub struct Icon {
    /// Shared rendered image.
    pub image: ImageHandle,
    /// Where text may be embedded in the icon, if the source said so.
    pub embedded_text_rect: Option<TextRect>,
    /// Emblem attach points, scaled to the rendered size.
    pub attach_points: Vec<AttachPoint>,
    /// Human-readable icon name, if the source supplied one.
    pub display_name: Option<String>,
    /// True when this is the fallback icon substituted for a failed lookup.
    pub is_fallback: bool,
}

impl Icon {
    /// Width and height of the rendered image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}
