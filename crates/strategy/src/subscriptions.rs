//! Subscription registry
//!
//! Records every registration the strategy makes so teardown can release
//! them all. Book listeners are always released first.

use log::debug;
use tempo_ports::{SubscriptionId, SubscriptionRegistrar, TimerId, TimerService, Topic};

pub struct SubscriptionRegistry {
    registrar: Box<dyn SubscriptionRegistrar>,
    listeners: Vec<(SubscriptionId, Topic)>,
    timers: Vec<TimerId>,
}

impl SubscriptionRegistry {
    pub fn new(registrar: Box<dyn SubscriptionRegistrar>) -> Self {
        Self {
            registrar,
            listeners: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, topic: Topic) -> SubscriptionId {
        let id = self.registrar.subscribe(topic.clone());
        debug!("subscribed {} to {}", id, topic);
        self.listeners.push((id, topic));
        id
    }

    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.listeners.iter().any(|(_, t)| t == topic)
    }

    /// Track a timer so it is cancelled on teardown
    pub fn track_timer(&mut self, id: TimerId) {
        self.timers.push(id);
    }

    /// Stop tracking a timer that fired for the last time
    pub fn untrack_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| *t != id);
        self.timers.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Release everything: book listeners, then the remaining listeners,
    /// then pending timers. Returns how many registrations were released.
    pub fn release_all(&mut self, timers: &mut dyn TimerService) -> usize {
        let (books, others): (Vec<_>, Vec<_>) = self
            .listeners
            .drain(..)
            .partition(|(_, topic)| topic.is_book());

        let mut released = 0;
        for (id, topic) in books.into_iter().chain(others) {
            if self.registrar.unsubscribe(id) {
                released += 1;
            }
            debug!("released {} ({})", id, topic);
        }
        for id in self.timers.drain(..) {
            if timers.cancel(id) {
                released += 1;
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempo_core::{InstrumentId, Timestamp};

    #[derive(Default)]
    struct Registrar {
        next: u64,
        released: Rc<RefCell<Vec<SubscriptionId>>>,
    }

    impl SubscriptionRegistrar for Registrar {
        fn subscribe(&mut self, _topic: Topic) -> SubscriptionId {
            self.next += 1;
            SubscriptionId(self.next)
        }

        fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
            self.released.borrow_mut().push(id);
            true
        }
    }

    #[derive(Default)]
    struct Timers {
        cancelled: Vec<TimerId>,
    }

    impl TimerService for Timers {
        fn schedule_once(&mut self, _at: Timestamp) -> TimerId {
            TimerId(1)
        }

        fn schedule_periodic(&mut self, _first: Timestamp, _interval: Duration, _until: Timestamp) -> TimerId {
            TimerId(2)
        }

        fn cancel(&mut self, id: TimerId) -> bool {
            self.cancelled.push(id);
            true
        }
    }

    #[test]
    fn test_books_released_first() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let registrar = Registrar {
            next: 0,
            released: released.clone(),
        };
        let mut registry = SubscriptionRegistry::new(Box::new(registrar));
        let instr = InstrumentId::new("IF2403");

        let ticks = registry.subscribe(Topic::Ticks(instr.clone()));
        let book = registry.subscribe(Topic::Book(instr.clone()));
        let status = registry.subscribe(Topic::OrderStatus(instr));
        registry.track_timer(TimerId(9));

        let mut timers = Timers::default();
        assert_eq!(registry.release_all(&mut timers), 4);

        assert_eq!(*released.borrow(), vec![book, ticks, status]);
        assert_eq!(timers.cancelled, vec![TimerId(9)]);
        assert_eq!(registry.listener_count(), 0);

        // Second release is a no-op
        assert_eq!(registry.release_all(&mut timers), 0);
    }

    #[test]
    fn test_untrack_timer() {
        let mut registry = SubscriptionRegistry::new(Box::new(Registrar::default()));
        registry.track_timer(TimerId(1));
        assert!(registry.untrack_timer(TimerId(1)));
        assert!(!registry.untrack_timer(TimerId(1)));
        assert_eq!(registry.timer_count(), 0);
    }
}
