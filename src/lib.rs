//! Icon factory: a reference-counted, recency-protected icon cache.
//!
//! Icons are requested by name (or absolute pathname) at a nominal size and
//! come back as cheaply clonable handles. Repeated requests hit the cache;
//! a bounded recency list protects the icons in active use, and a debounced
//! background sweep ages out the rest once nothing holds them. Thumbnails
//! for image files load asynchronously behind a placeholder icon, with
//! completion delivered over a broadcast channel.
//!
//! [`IconService`] is the main entry point; [`IconFactory`] is the
//! single-owner core underneath it.

pub mod cache;
pub mod error;
pub mod events;
pub mod file_icon;
pub mod image;
pub mod service;
pub mod sizes;
pub mod source;
pub mod thumbnail;

pub use cache::{AttachPoint, CacheKey, Icon, IconFactory, TextRect};
pub use error::IconError;
pub use events::IconEvent;
pub use file_icon::FileInfo;
pub use image::{IconImage, ImageHandle};
pub use service::{IconService, IconServiceBuilder};
pub use source::{IconSource, RenderedIcon, ThumbnailDecoder};
