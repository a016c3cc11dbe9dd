//! Cancellable periodic timer for playback auto-advance
//!
//! The controller does not own a clock. Arming the timer hands out a
//! [`TickHandle`]; whatever drives wall-clock time (an event loop, a
//! thread, a test) presents that handle back on every tick. Cancelling or
//! re-arming retires the handle, so a tick that was already in flight when
//! playback paused can never move the cursor.

use std::time::Duration;

/// Ticket for one armed timer generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
    interval: Duration,
}

impl TickHandle {
    /// How long the driver should wait between ticks
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Timer generation this handle belongs to
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation-counted timer state
#[derive(Debug, Default)]
pub struct PlaybackTimer {
    last_generation: u64,
    active: Option<TickHandle>,
}

impl PlaybackTimer {
    /// Arm (or re-arm) the timer; any previously issued handle goes stale
    pub fn arm(&mut self, interval: Duration) -> TickHandle {
        self.last_generation += 1;
        let handle = TickHandle {
            generation: self.last_generation,
            interval,
        };
        self.active = Some(handle);
        handle
    }

    /// Cancel the timer; returns true if it was armed
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Currently valid handle, if armed
    #[must_use]
    pub fn active(&self) -> Option<TickHandle> {
        self.active
    }

    /// True when `handle` belongs to the armed generation
    #[must_use]
    pub fn accepts(&self, handle: &TickHandle) -> bool {
        self.active
            .is_some_and(|active| active.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_retires_old_handle() {
        let mut timer = PlaybackTimer::default();
        let first = timer.arm(Duration::from_millis(1500));
        assert!(timer.accepts(&first));

        let second = timer.arm(Duration::from_millis(750));
        assert!(!timer.accepts(&first));
        assert!(timer.accepts(&second));
        assert_eq!(second.interval(), Duration::from_millis(750));
    }

    #[test]
    fn test_cancel_retires_handle_for_good() {
        let mut timer = PlaybackTimer::default();
        let handle = timer.arm(Duration::from_secs(1));
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.accepts(&handle));

        // A fresh generation never matches an old ticket
        let fresh = timer.arm(Duration::from_secs(1));
        assert_ne!(fresh.generation(), handle.generation());
        assert!(!timer.accepts(&handle));
    }
}
