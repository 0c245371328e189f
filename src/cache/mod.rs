//! The icon cache: lookup, synthesis, recency protection and sweeping.

pub(crate) mod entry;
pub mod key;
pub(crate) mod recency;
pub mod sweep;

pub use entry::{AttachPoint, Icon, TextRect};
pub use key::CacheKey;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::image::{IconImage, ImageHandle};
use crate::sizes::ICON_SIZE_STANDARD;
use crate::source::{FileStat, IconSource};
use entry::CacheEntry;
use recency::{Promotion, RecencyList, RECENCY_CAPACITY};

/// Number of sweeps an unprotected, unreferenced entry survives before it is
/// evicted.
pub const MAX_ENTRY_AGE: u32 = 10;

/// In-memory cache of rendered icons.
///
/// Icons are keyed by [`CacheKey`]. Every successful access protects the
/// entry in a bounded recency list and resets its age; a periodic sweep
/// evicts entries that are unprotected, externally unreferenced and old.
/// Synthesis failure is not an error: the distinguished fallback icon is
/// substituted instead.
///
/// The factory itself is synchronous and single-owner; [`IconService`]
/// wraps it for shared use and owns the sweep timer.
///
/// [`IconService`]: crate::service::IconService
pub struct IconFactory {
    icons: HashMap<CacheKey, CacheEntry>,
    recency: RecencyList,
    fallback: ImageHandle,
    source: Arc<dyn IconSource>,
    file_stat: Arc<dyn FileStat>,
    sweep_requested: bool,
}

impl IconFactory {
    /// Create a factory with the default document glyph as fallback icon.
    pub fn new(source: Arc<dyn IconSource>, file_stat: Arc<dyn FileStat>) -> Self {
        Self::with_fallback(source, file_stat, IconImage::fallback(ICON_SIZE_STANDARD))
    }

    /// Create a factory with a caller-provided fallback icon.
    ///
    /// The fallback lives for the factory's whole lifetime, independent of
    /// the mapping.
    pub fn with_fallback(
        source: Arc<dyn IconSource>,
        file_stat: Arc<dyn FileStat>,
        fallback: IconImage,
    ) -> Self {
        Self {
            icons: HashMap::new(),
            recency: RecencyList::new(RECENCY_CAPACITY),
            fallback: Arc::new(fallback),
            source,
            file_stat,
            sweep_requested: false,
        }
    }

    /// Get the icon for a key, synthesizing it on a miss.
    ///
    /// Pathname entries are revalidated against the file's modification
    /// time; a vanished or changed file is treated as a miss. When synthesis
    /// fails with a modifier, it is retried without one; when it still
    /// fails, the fallback icon is substituted. The returned icon is never
    /// an error — `None` only signals an empty name.
    pub fn icon_for(
        &mut self,
        name: &str,
        modifier: Option<&str>,
        nominal_size: u32,
        force_nominal: bool,
    ) -> Option<Icon> {
        if name.is_empty() {
            return None;
        }
        let key = CacheKey::new(name, modifier, nominal_size, force_nominal);

        let mut hit = self.icons.contains_key(&key);
        if hit && key.is_pathname() {
            // Thumbnails and image-as-itself icons must reload when the
            // underlying file changes.
            let entry = &self.icons[&key];
            let fresh = self
                .file_stat
                .stat(Path::new(&key.name))
                .map_or(false, |st| st.is_regular && entry.mtime == Some(st.mtime));
            if !fresh {
                log::debug!("cached icon for {} is stale", key.name);
                hit = false;
            }
        }

        if !hit {
            let entry = self
                .synthesize(&key, key.modifier.as_deref())
                .or_else(|| match key.modifier {
                    Some(_) => self.synthesize(&key, None),
                    None => None,
                })
                .unwrap_or_else(|| {
                    log::debug!("no icon for {}, substituting fallback", key.name);
                    CacheEntry::from_image(self.fallback.clone())
                });
            self.discard(&key);
            self.icons.insert(key.clone(), entry);
        }

        // Since this item was used, keep it in the cache longer.
        let current = self.icons[&key].recency_slot;
        if let Promotion::Inserted { slot, displaced } = self.recency.promote(current, &key) {
            if let Some(entry) = self.icons.get_mut(&key) {
                entry.recency_slot = Some(slot);
            }
            if let Some(displaced_key) = displaced {
                if let Some(old) = self.icons.get_mut(&displaced_key) {
                    old.recency_slot = None;
                }
            }
        }

        let entry = self.icons.get_mut(&key)?;
        entry.age = 0;
        let icon = entry.to_icon(Arc::ptr_eq(&entry.image, &self.fallback));
        self.sweep_requested = true;
        Some(icon)
    }

    /// Whether a mapping exists for the key. No freshness check, no
    /// promotion.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.icons.contains_key(key)
    }

    /// Insert an asynchronously loaded thumbnail under its original key.
    ///
    /// The entry is not promoted; the consumer is expected to re-request
    /// the icon, which promotes it then.
    pub fn insert_thumbnail(&mut self, key: CacheKey, image: ImageHandle, mtime: SystemTime) {
        self.discard(&key);
        let mut entry = CacheEntry::from_image(image);
        entry.mtime = Some(mtime);
        self.icons.insert(key, entry);
    }

    /// Drop the mappings for a name at one size, in both sizing policies.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, name: &str, modifier: Option<&str>, nominal_size: u32) -> bool {
        let mut removed = false;
        for force_nominal in [false, true] {
            let key = CacheKey::new(name, modifier, nominal_size, force_nominal);
            removed |= self.discard(&key);
        }
        removed
    }

    /// Reset the cache.
    ///
    /// With `keep_pathnames` the pathname-keyed entries survive, which
    /// avoids throwing away loaded thumbnails on a theme change.
    pub fn clear(&mut self, keep_pathnames: bool) {
        if !keep_pathnames {
            self.icons.clear();
            self.recency.clear();
            return;
        }
        let mut dropped_slots = Vec::new();
        self.icons.retain(|key, entry| {
            if key.is_pathname() {
                return true;
            }
            if let Some(slot) = entry.recency_slot {
                dropped_slots.push(slot);
            }
            false
        });
        for slot in dropped_slots {
            self.recency.remove(slot);
        }
    }

    /// Sweep the cache, freeing icons that are not in use and not recently
    /// used. Returns the number of entries evicted.
    ///
    /// An entry in the recency list is never evicted, whatever its age.
    /// Entries whose image is still held outside the cache are skipped;
    /// everything else ages by one sweep and is evicted once its age
    /// exceeds [`MAX_ENTRY_AGE`].
    pub fn sweep_once(&mut self) -> usize {
        // Fallback-backed mappings all share one image, so the baseline
        // reference count for them is the factory's own handle plus one per
        // mapping. Compare by raw pointer; a cloned handle here would skew
        // the count it is checking.
        let fallback_ptr = Arc::as_ptr(&self.fallback);
        let fallback_entries = self
            .icons
            .values()
            .filter(|entry| Arc::as_ptr(&entry.image) == fallback_ptr)
            .count();

        let before = self.icons.len();
        self.icons.retain(|key, entry| {
            if entry.recency_slot.is_some() {
                return true;
            }
            let internal = if Arc::as_ptr(&entry.image) == fallback_ptr {
                1 + fallback_entries
            } else {
                1
            };
            if Arc::strong_count(&entry.image) > internal {
                return true;
            }
            entry.age += 1;
            if entry.age > MAX_ENTRY_AGE {
                log::debug!("sweeping icon {} (age {})", key.name, entry.age);
                false
            } else {
                true
            }
        });
        before - self.icons.len()
    }

    /// Take the pending request to schedule a sweep, if an access made one.
    pub fn take_sweep_request(&mut self) -> bool {
        std::mem::take(&mut self.sweep_requested)
    }

    /// Number of cached mappings.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Number of entries currently protected by the recency list.
    pub fn protected_count(&self) -> usize {
        self.recency.len()
    }

    /// The image substituted when synthesis fails.
    pub fn fallback_image(&self) -> &ImageHandle {
        &self.fallback
    }

    fn synthesize(&self, key: &CacheKey, modifier: Option<&str>) -> Option<CacheEntry> {
        if key.is_pathname() {
            let path = Path::new(&key.name);
            let stat = self.file_stat.stat(path)?;
            if !stat.is_regular {
                return None;
            }
            match self
                .source
                .load_path(path, key.nominal_size, key.force_nominal)
            {
                Ok(rendered) => Some(CacheEntry::new(rendered, Some(stat.mtime))),
                Err(err) => {
                    log::debug!("failed to load icon file {:?}: {}", path, err);
                    None
                }
            }
        } else {
            match self
                .source
                .render_icon(&key.name, modifier, key.nominal_size, key.force_nominal)
            {
                Ok(rendered) => Some(CacheEntry::new(rendered, None)),
                Err(crate::error::IconError::NotFound(_)) => None,
                Err(err) => {
                    log::debug!("failed to render icon {}: {}", key.name, err);
                    None
                }
            }
        }
    }

    /// Remove one mapping and its recency protection.
    fn discard(&mut self, key: &CacheKey) -> bool {
        match self.icons.remove(key) {
            Some(old) => {
                if let Some(slot) = old.recency_slot {
                    self.recency.remove(slot);
                }
                true
            }
            None => false,
        }
    }
}
