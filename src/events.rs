//! Change notifications emitted by the icon service.

use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::image::ImageHandle;

/// Events broadcast to interested views.
#[derive(Debug, Clone)]
pub enum IconEvent {
    /// The cache was cleared or the icon set changed wholesale; every
    /// displayed icon should be re-requested.
    IconsChanged,
    /// An asynchronously requested thumbnail finished loading and is now
    /// in the cache.
    ThumbnailReady {
        file: PathBuf,
        thumbnail: ImageHandle,
    },
    /// An asynchronously requested thumbnail could not be loaded. The
    /// placeholder mapping stays in place.
    ThumbnailFailed { file: PathBuf, error: String },
}

/// Create a broadcast channel for icon events.
///
/// Slow subscribers that fall more than the channel capacity behind lose
/// the oldest events; a view recovering from lag should re-request its
/// icons as if it had seen [`IconEvent::IconsChanged`].
pub fn create_icon_event_channel() -> (
    broadcast::Sender<IconEvent>,
    broadcast::Receiver<IconEvent>,
) {
    broadcast::channel(100)
}
