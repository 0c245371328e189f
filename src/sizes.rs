//! Icon size ladder, zoom levels and emblem sizing.
//!
//! Rendered icons are quantized to a fixed ladder of pixel sizes so that the
//! cache only ever holds a handful of variants per icon name.

/// Smallest icon size on the ladder.
pub const ICON_SIZE_SMALLEST: u32 = 16;
/// Second-smallest icon size.
pub const ICON_SIZE_SMALLER: u32 = 24;
/// Small icon size.
pub const ICON_SIZE_SMALL: u32 = 32;
/// Standard icon size; relative zoom factors are computed against this.
pub const ICON_SIZE_STANDARD: u32 = 48;
/// Large icon size.
pub const ICON_SIZE_LARGE: u32 = 72;
/// Larger icon size.
pub const ICON_SIZE_LARGER: u32 = 96;
/// Largest icon size on the ladder.
pub const ICON_SIZE_LARGEST: u32 = 192;

/// Discrete zoom levels of an icon view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZoomLevel {
    Smallest,
    Smaller,
    Small,
    Standard,
    Large,
    Larger,
    Largest,
}

/// Nominal icon pixel size for a zoom level.
pub fn icon_size_for_zoom_level(zoom_level: ZoomLevel) -> u32 {
    match zoom_level {
        ZoomLevel::Smallest => ICON_SIZE_SMALLEST,
        ZoomLevel::Smaller => ICON_SIZE_SMALLER,
        ZoomLevel::Small => ICON_SIZE_SMALL,
        ZoomLevel::Standard => ICON_SIZE_STANDARD,
        ZoomLevel::Large => ICON_SIZE_LARGE,
        ZoomLevel::Larger => ICON_SIZE_LARGER,
        ZoomLevel::Largest => ICON_SIZE_LARGEST,
    }
}

/// Icon scale factor for a zoom level, relative to the standard size.
pub fn relative_icon_size_for_zoom_level(zoom_level: ZoomLevel) -> f32 {
    icon_size_for_zoom_level(zoom_level) as f32 / ICON_SIZE_STANDARD as f32
}

/// Round `size` up to the next size on the ladder.
///
/// Sizes already on (or above) the top rung return the largest size.
pub fn larger_icon_size(size: u32) -> u32 {
    if size < ICON_SIZE_SMALLEST {
        return ICON_SIZE_SMALLEST;
    }
    if size < ICON_SIZE_SMALLER {
        return ICON_SIZE_SMALLER;
    }
    if size < ICON_SIZE_SMALL {
        return ICON_SIZE_SMALL;
    }
    if size < ICON_SIZE_STANDARD {
        return ICON_SIZE_STANDARD;
    }
    if size < ICON_SIZE_LARGE {
        return ICON_SIZE_LARGE;
    }
    if size < ICON_SIZE_LARGER {
        return ICON_SIZE_LARGER;
    }
    ICON_SIZE_LARGEST
}

/// Round `size` down to the previous size on the ladder.
pub fn smaller_icon_size(size: u32) -> u32 {
    if size > ICON_SIZE_LARGEST {
        return ICON_SIZE_LARGEST;
    }
    if size > ICON_SIZE_LARGER {
        return ICON_SIZE_LARGER;
    }
    if size > ICON_SIZE_LARGE {
        return ICON_SIZE_LARGE;
    }
    if size > ICON_SIZE_STANDARD {
        return ICON_SIZE_STANDARD;
    }
    if size > ICON_SIZE_SMALL {
        return ICON_SIZE_SMALL;
    }
    if size > ICON_SIZE_SMALLER {
        return ICON_SIZE_SMALLER;
    }
    ICON_SIZE_SMALLEST
}

/// Emblem pixel size appropriate for an icon of the given size.
///
/// Returns 0 for icons too small to carry emblems.
pub fn emblem_size_for_icon_size(size: u32) -> u32 {
    if size >= 96 {
        48
    } else if size >= 64 {
        32
    } else if size >= 48 {
        24
    } else if size >= 32 {
        16
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_size_for_zoom_level() {
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Smallest), 16);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Smaller), 24);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Small), 32);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Standard), 48);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Large), 72);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Larger), 96);
        assert_eq!(icon_size_for_zoom_level(ZoomLevel::Largest), 192);
    }

    #[test]
    fn test_larger_icon_size() {
        assert_eq!(larger_icon_size(0), 16);
        assert_eq!(larger_icon_size(1), 16);
        assert_eq!(larger_icon_size(15), 16);
        assert_eq!(larger_icon_size(16), 24);
        assert_eq!(larger_icon_size(23), 24);
        assert_eq!(larger_icon_size(24), 32);
        assert_eq!(larger_icon_size(31), 32);
        assert_eq!(larger_icon_size(32), 48);
        assert_eq!(larger_icon_size(47), 48);
        assert_eq!(larger_icon_size(48), 72);
        assert_eq!(larger_icon_size(71), 72);
        assert_eq!(larger_icon_size(72), 96);
        assert_eq!(larger_icon_size(95), 96);
        assert_eq!(larger_icon_size(96), 192);
        assert_eq!(larger_icon_size(191), 192);
        assert_eq!(larger_icon_size(192), 192);
        assert_eq!(larger_icon_size(u32::MAX), 192);
    }

    #[test]
    fn test_smaller_icon_size() {
        assert_eq!(smaller_icon_size(0), 16);
        assert_eq!(smaller_icon_size(24), 16);
        assert_eq!(smaller_icon_size(25), 24);
        assert_eq!(smaller_icon_size(32), 24);
        assert_eq!(smaller_icon_size(33), 32);
        assert_eq!(smaller_icon_size(48), 32);
        assert_eq!(smaller_icon_size(49), 48);
        assert_eq!(smaller_icon_size(72), 48);
        assert_eq!(smaller_icon_size(73), 72);
        assert_eq!(smaller_icon_size(96), 72);
        assert_eq!(smaller_icon_size(97), 96);
        assert_eq!(smaller_icon_size(192), 96);
        assert_eq!(smaller_icon_size(193), 192);
        assert_eq!(smaller_icon_size(u32::MAX), 192);
    }

    #[test]
    fn test_emblem_size_for_icon_size() {
        assert_eq!(emblem_size_for_icon_size(192), 48);
        assert_eq!(emblem_size_for_icon_size(96), 48);
        assert_eq!(emblem_size_for_icon_size(72), 32);
        assert_eq!(emblem_size_for_icon_size(48), 24);
        assert_eq!(emblem_size_for_icon_size(32), 16);
        assert_eq!(emblem_size_for_icon_size(24), 0);
    }

    #[test]
    fn test_relative_icon_size() {
        assert_eq!(relative_icon_size_for_zoom_level(ZoomLevel::Standard), 1.0);
        assert_eq!(relative_icon_size_for_zoom_level(ZoomLevel::Largest), 4.0);
    }
}
