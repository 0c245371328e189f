//! Composite cache identity for rendered icons.

/// Identity of a cached icon.
///
/// Two keys index the same cache slot iff all four fields are equal; the
/// modifier compares null-safe. Keys are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Icon name, or an absolute path to an image file.
    pub name: String,
    /// Optional style suffix, e.g. `open` for `folder-open`.
    pub modifier: Option<String>,
    /// Requested pixel size.
    pub nominal_size: u32,
    /// Whether the rendered result must not exceed the nominal size.
    pub force_nominal: bool,
}

impl CacheKey {
    /// Create a key from borrowed parts.
    pub fn new(name: &str, modifier: Option<&str>, nominal_size: u32, force_nominal: bool) -> Self {
        Self {
            name: name.to_string(),
            modifier: modifier.map(str::to_string),
            nominal_size,
            force_nominal,
        }
    }

    /// Whether the name refers to an image file rather than a themed icon.
    ///
    /// Pathname entries carry a source modification time and are revalidated
    /// on every cache hit.
    pub fn is_pathname(&self) -> bool {
        self.name.starts_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(key: &CacheKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_keys_hash_equal() {
        let a = CacheKey::new("folder", Some("open"), 48, false);
        let b = CacheKey::new("folder", Some("open"), 48, false);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_any_field_difference_makes_unequal() {
        let base = CacheKey::new("folder", Some("open"), 48, false);
        assert_ne!(base, CacheKey::new("folder2", Some("open"), 48, false));
        assert_ne!(base, CacheKey::new("folder", None, 48, false));
        assert_ne!(base, CacheKey::new("folder", Some("visiting"), 48, false));
        assert_ne!(base, CacheKey::new("folder", Some("open"), 96, false));
        assert_ne!(base, CacheKey::new("folder", Some("open"), 48, true));
    }

    #[test]
    fn test_is_pathname() {
        assert!(CacheKey::new("/tmp/a.png", None, 48, false).is_pathname());
        assert!(!CacheKey::new("folder", None, 48, false).is_pathname());
    }
}
