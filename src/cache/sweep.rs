//! Debounced scheduling of cache sweeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Delay between a cache access and the sweep it schedules.
pub const SWEEP_DELAY: Duration = Duration::from_secs(10);

/// Debounce state for the sweep timer.
///
/// A sweep never reschedules itself: the timer task calls [`finished`] after
/// sweeping, and the next successful cache access re-arms it via
/// [`try_arm`].
///
/// [`finished`]: SweepScheduler::finished
/// [`try_arm`]: SweepScheduler::try_arm
pub struct SweepScheduler {
    pending: AtomicBool,
    delay: Duration,
}

impl SweepScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: AtomicBool::new(false),
            delay,
        }
    }

    /// Claim the right to arm the timer. Returns `false` while a sweep is
    /// already pending.
    pub fn try_arm(&self) -> bool {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark the pending sweep as done.
    pub fn finished(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SweepScheduler {
    fn default() -> Self {
        Self::new(SWEEP_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arming_is_debounced() {
        let scheduler = SweepScheduler::default();
        assert!(scheduler.try_arm());
        assert!(scheduler.is_pending());
        // A second request while pending is a no-op.
        assert!(!scheduler.try_arm());

        scheduler.finished();
        assert!(!scheduler.is_pending());
        assert!(scheduler.try_arm());
    }
}
