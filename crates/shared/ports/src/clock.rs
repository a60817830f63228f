use std::rc::Rc;

use tempo_core::Timestamp;

/// Port for time abstraction
///
/// This allows the system to use different time sources:
/// - Real system time for live sessions
/// - Event-driven simulated time for replays
/// - Fixed time for deterministic tests
pub trait Clock {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
