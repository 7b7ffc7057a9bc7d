//! Fixed-interval tick for the refresh cycle
//!
//! The panel never spawns a thread. The caller's event loop asks the timer
//! whether a tick is due and calls `PortPanel::refresh` when it is.

use std::time::{Duration, Instant};

/// Interval between port rescans
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Instant,
}

impl RefreshTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Returns true once per elapsed interval. A loop that stalls for several
    /// intervals gets one tick, not a burst.
    pub fn is_due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }

    /// How long the loop may sleep before the next tick
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

impl Default for RefreshTimer {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(REFRESH_INTERVAL, start);

        assert!(!timer.is_due(start));
        assert!(!timer.is_due(start + Duration::from_millis(999)));
        assert!(timer.is_due(start + Duration::from_secs(1)));
        assert!(!timer.is_due(start + Duration::from_millis(1500)));
        assert!(timer.is_due(start + Duration::from_secs(2)));
    }

    #[test]
    fn stalled_loop_does_not_burst() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(REFRESH_INTERVAL, start);
        let late = start + Duration::from_secs(5);

        assert!(timer.is_due(late));
        assert!(!timer.is_due(late));
        assert_eq!(timer.time_until_due(late), REFRESH_INTERVAL);
    }
}
