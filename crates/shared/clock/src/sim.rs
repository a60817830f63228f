use std::cell::Cell;

use chrono::Duration;
use tempo_core::Timestamp;
use tempo_ports::Clock;

/// Simulated clock that only moves when told to
///
/// During a replay the event loop advances it to each event's timestamp,
/// so timers fire against tape time rather than wall time. Time never
/// runs backwards: stale timestamps are ignored.
#[derive(Debug)]
pub struct SimClock {
    now: Cell<Timestamp>,
}

impl SimClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move forward to `time`; returns false (and leaves the clock alone)
    /// if `time` is in the past.
    pub fn advance_to(&self, time: Timestamp) -> bool {
        if time < self.now.get() {
            return false;
        }
        self.now.set(time);
        true
    }

    /// Advance the simulated time by a specified duration
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }

    fn name(&self) -> &str {
        "SimClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_sim_clock_is_fixed_until_advanced() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = SimClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now() - start, Duration::seconds(5));
    }

    #[test]
    fn test_sim_clock_never_goes_backwards() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = SimClock::new(start);

        assert!(clock.advance_to(start + Duration::minutes(1)));
        assert!(!clock.advance_to(start));
        assert_eq!(clock.now(), start + Duration::minutes(1));
    }
}
