use chrono::Duration;
use serde::{Deserialize, Serialize};
use tempo_core::Timestamp;

/// Handle for a scheduled timer; cancel through [`TimerService::cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// What happened to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerEvent {
    /// The timer is due
    Fire,
    /// A periodic timer passed its last firing
    Done,
}

/// Notification delivered to the strategy when a timer expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerFired {
    pub id: TimerId,
    /// Scheduled instant (not the wall time of delivery)
    pub at: Timestamp,
    pub event: TimerEvent,
}

/// Port for the platform timer service
pub trait TimerService {
    /// Fire once at `at`
    fn schedule_once(&mut self, at: Timestamp) -> TimerId;

    /// Fire at `first`, `first + interval`, ... for every instant `<= until`,
    /// then deliver one [`TimerEvent::Done`].
    fn schedule_periodic(&mut self, first: Timestamp, interval: Duration, until: Timestamp) -> TimerId;

    /// Cancel a pending timer; returns false if it already fired or never existed
    fn cancel(&mut self, id: TimerId) -> bool;
}
