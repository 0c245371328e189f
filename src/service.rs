//! The icon service: shared cache access, sweeping and async thumbnails.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::sweep::{SweepScheduler, SWEEP_DELAY};
use crate::cache::{CacheKey, Icon, IconFactory};
use crate::events::{create_icon_event_channel, IconEvent};
use crate::file_icon::{self, FileInfo};
use crate::image::IconImage;
use crate::source::{
    FileStat, IconSource, ImageThumbnailDecoder, StdFileStat, ThumbnailDecoder,
};
use crate::thumbnail::LOADING_ICON_NAME;

/// Shared handle to the icon cache.
///
/// Cloning the service clones the handle; all clones share one cache, one
/// sweep timer and one event channel. Icon lookups are synchronous; cache
/// maintenance and thumbnail loads run on the tokio runtime the service is
/// used from, so sweeping and async thumbnails are inert outside one.
#[derive(Clone)]
pub struct IconService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    factory: Mutex<IconFactory>,
    sweeper: SweepScheduler,
    events: broadcast::Sender<IconEvent>,
    decoder: Arc<dyn ThumbnailDecoder>,
    file_stat: Arc<dyn FileStat>,
    /// Thumbnail paths currently being decoded.
    in_flight: Mutex<HashSet<PathBuf>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Cleared on shutdown; late completions check this and do nothing.
    alive: AtomicBool,
}

/// Configures an [`IconService`] before construction.
pub struct IconServiceBuilder {
    source: Arc<dyn IconSource>,
    file_stat: Arc<dyn FileStat>,
    decoder: Arc<dyn ThumbnailDecoder>,
    fallback: Option<IconImage>,
    sweep_delay: Duration,
}

impl IconServiceBuilder {
    pub fn file_stat(mut self, file_stat: Arc<dyn FileStat>) -> Self {
        self.file_stat = file_stat;
        self
    }

    pub fn thumbnail_decoder(mut self, decoder: Arc<dyn ThumbnailDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn fallback(mut self, fallback: IconImage) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn sweep_delay(mut self, delay: Duration) -> Self {
        self.sweep_delay = delay;
        self
    }

    pub fn build(self) -> IconService {
        let factory = match self.fallback {
            Some(fallback) => {
                IconFactory::with_fallback(self.source, self.file_stat.clone(), fallback)
            }
            None => IconFactory::new(self.source, self.file_stat.clone()),
        };
        let (events, _) = create_icon_event_channel();
        IconService {
            inner: Arc::new(ServiceInner {
                factory: Mutex::new(factory),
                sweeper: SweepScheduler::new(self.sweep_delay),
                events,
                decoder: self.decoder,
                file_stat: self.file_stat,
                in_flight: Mutex::new(HashSet::new()),
                tasks: Mutex::new(Vec::new()),
                alive: AtomicBool::new(true),
            }),
        }
    }
}

impl IconService {
    /// Create a service over the given icon source with the stock
    /// filesystem stat and thumbnail decoder.
    pub fn new(source: Arc<dyn IconSource>) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: Arc<dyn IconSource>) -> IconServiceBuilder {
        IconServiceBuilder {
            source,
            file_stat: Arc::new(StdFileStat),
            decoder: Arc::new(ImageThumbnailDecoder),
            fallback: None,
            sweep_delay: SWEEP_DELAY,
        }
    }

    /// Get the icon for a name or pathname.
    ///
    /// Never fails for a non-empty name; an unknown icon comes back as the
    /// fallback. Each call refreshes the entry's recency protection.
    pub fn icon_for_name(
        &self,
        name: &str,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Option<Icon> {
        let icon = self
            .inner
            .factory
            .lock()
            .unwrap()
            .icon_for(name, modifier, nominal_size, force_nominal);
        self.maybe_arm_sweep();
        icon
    }

    /// Get the icon for a file, resolving its icon name first.
    ///
    /// When the file resolves to a thumbnail that is not cached yet, the
    /// load is started in the background and the loading placeholder is
    /// returned; an [`IconEvent::ThumbnailReady`] follows when the real
    /// thumbnail is available.
    pub fn icon_for_file(
        &self,
        file: &FileInfo,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Option<Icon> {
        let name = file_icon::icon_name_for_file(file, nominal_size);
        self.icon_for_file_with_name(file, &name, modifier, nominal_size, force_nominal)
    }

    /// Like [`icon_for_file`] with the icon name already resolved.
    ///
    /// [`icon_for_file`]: IconService::icon_for_file
    pub fn icon_for_file_with_name(
        &self,
        file: &FileInfo,
        name: &str,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Option<Icon> {
        if name.starts_with('/') {
            // Pathname keys never carry a modifier.
            let key = CacheKey::new(name, None, nominal_size, force_nominal);
            let cached = self.inner.factory.lock().unwrap().contains(&key);
            if !cached
                && self.spawn_thumbnail_load(
                    file.path.clone(),
                    PathBuf::from(name),
                    nominal_size,
                    force_nominal,
                )
            {
                return self.icon_for_name(LOADING_ICON_NAME, modifier, nominal_size, force_nominal);
            }
            return self.icon_for_name(name, None, nominal_size, force_nominal);
        }
        self.icon_for_name(name, modifier, nominal_size, force_nominal)
    }

    /// Subscribe to cache change and thumbnail completion events.
    pub fn subscribe(&self) -> broadcast::Receiver<IconEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a thumbnail load for this thumbnail path is in flight.
    pub fn is_thumbnailing(&self, thumbnail: &Path) -> bool {
        self.inner.in_flight.lock().unwrap().contains(thumbnail)
    }

    /// Drop the cached mappings for a name at one size.
    pub fn remove_from_cache(&self, name: &str, modifier: Option<&str>, nominal_size: u32) -> bool {
        self.inner
            .factory
            .lock()
            .unwrap()
            .remove(name, modifier, nominal_size)
    }

    /// Reset the cache, e.g. on an icon theme change.
    ///
    /// With `keep_pathnames` already loaded thumbnails survive. Emits
    /// [`IconEvent::IconsChanged`] so views re-request what they display.
    pub fn clear_cache(&self, keep_pathnames: bool) {
        self.inner.factory.lock().unwrap().clear(keep_pathnames);
        let _ = self.inner.events.send(IconEvent::IconsChanged);
    }

    /// Number of cached icon mappings.
    pub fn cached_icon_count(&self) -> usize {
        self.inner.factory.lock().unwrap().len()
    }

    /// Run one sweep pass immediately, returning the number of evictions.
    pub fn sweep_now(&self) -> usize {
        self.inner.factory.lock().unwrap().sweep_once()
    }

    /// Stop background work. Pending sweeps and thumbnail loads are
    /// cancelled; completions already past cancellation see the dead flag
    /// and discard their results.
    pub fn shutdown(&self) {
        self.inner.alive.store(false, Ordering::Release);
        for task in self.inner.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.inner.in_flight.lock().unwrap().clear();
    }

    /// Arm the delayed sweep if an access requested one and none is
    /// pending.
    fn maybe_arm_sweep(&self) {
        if !self.inner.factory.lock().unwrap().take_sweep_request() {
            return;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => return,
        };
        if !self.inner.sweeper.try_arm() {
            return;
        }
        let delay = self.inner.sweeper.delay();
        let inner = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if inner.alive.load(Ordering::Acquire) {
                let evicted = inner.factory.lock().unwrap().sweep_once();
                if evicted > 0 {
                    log::debug!("icon sweep evicted {} entries", evicted);
                }
            }
            // Stays pending until the sweep is done; an access during the
            // sweep must not arm an overlapping timer.
            inner.sweeper.finished();
        });
        self.track(task);
    }

    /// Start a background decode of `thumbnail` for `file`. Returns whether
    /// a load is now in flight (newly started or already running).
    fn spawn_thumbnail_load(
        &self,
        file: PathBuf,
        thumbnail: PathBuf,
        nominal_size: u32,
        force_nominal: bool,
    ) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => return false,
        };
        if !self
            .inner
            .in_flight
            .lock()
            .unwrap()
            .insert(thumbnail.clone())
        {
            // Already loading; the caller keeps showing the placeholder.
            return true;
        }

        let decoder = self.inner.decoder.clone();
        let inner = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            let decode_path = thumbnail.clone();
            let result = tokio::task::spawn_blocking(move || {
                decoder.load(&decode_path, nominal_size, force_nominal)
            })
            .await;

            let Some(inner) = inner.upgrade() else {
                return;
            };
            inner.in_flight.lock().unwrap().remove(&thumbnail);
            if !inner.alive.load(Ordering::Acquire) {
                return;
            }

            match result {
                Ok(Ok(decoded)) => {
                    // The file may have vanished between decode and insert.
                    let stat = inner
                        .file_stat
                        .stat(&thumbnail)
                        .filter(|st| st.is_regular);
                    let Some(stat) = stat else {
                        let _ = inner.events.send(IconEvent::ThumbnailFailed {
                            file,
                            error: format!("thumbnail {} vanished", thumbnail.display()),
                        });
                        return;
                    };
                    let mtime = stat.mtime;
                    let key = CacheKey::new(
                        &thumbnail.to_string_lossy(),
                        None,
                        nominal_size,
                        force_nominal,
                    );
                    // Opaque thumbnails get the photo frame; translucent
                    // images are shown as-is.
                    let image = if decoded.image.has_alpha() {
                        Arc::new(decoded.image)
                    } else {
                        Arc::new(decoded.image.framed())
                    };
                    inner
                        .factory
                        .lock()
                        .unwrap()
                        .insert_thumbnail(key, image.clone(), mtime);
                    let _ = inner.events.send(IconEvent::ThumbnailReady {
                        file,
                        thumbnail: image,
                    });
                }
                Ok(Err(err)) => {
                    log::debug!("thumbnail load for {:?} failed: {}", thumbnail, err);
                    let _ = inner.events.send(IconEvent::ThumbnailFailed {
                        file,
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    log::debug!("thumbnail task for {:?} aborted: {}", thumbnail, err);
                }
            }
        });
        self.track(task);
        true
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.inner.tasks.lock().unwrap();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }
}
