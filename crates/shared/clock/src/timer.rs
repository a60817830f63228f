use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::Duration;
use log::{debug, trace};
use priority_queue::PriorityQueue;
use tempo_core::Timestamp;
use tempo_ports::{TimerEvent, TimerFired, TimerId, TimerService};

#[derive(Debug, Clone, Copy)]
enum Schedule {
    Once,
    Periodic { interval: Duration, until: Timestamp },
    /// Completion notice of a periodic timer, delivered once
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    due: Timestamp,
    schedule: Schedule,
}

/// One-shot and periodic timers keyed by due time
///
/// The queue holds at most one pending firing per timer. Timers due at the
/// same instant fire in the order they were armed.
pub struct TimerQueue {
    queue: PriorityQueue<TimerId, Reverse<(Timestamp, u64)>>,
    armed: HashMap<TimerId, Armed>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            armed: HashMap::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    fn arm(&mut self, id: TimerId, due: Timestamp, schedule: Schedule) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.armed.insert(id, Armed { due, schedule });
        self.queue.push(id, Reverse((due, seq)));
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Earliest pending due time
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.peek().map(|(_, Reverse((due, _)))| *due)
    }

    /// Pop the next timer due at or before `now`.
    ///
    /// Periodic timers are re-armed at `due + interval` while that stays
    /// within their `until` bound; after the last firing a `Done` notice is
    /// queued at the same instant.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<TimerFired> {
        let due = self.next_deadline()?;
        if due > now {
            return None;
        }

        let (id, _) = self.queue.pop()?;
        let armed = self.armed.remove(&id)?;

        let event = match armed.schedule {
            Schedule::Once => TimerEvent::Fire,
            Schedule::Periodic { interval, until } => {
                let next = armed.due + interval;
                if interval > Duration::zero() && next <= until {
                    self.arm(id, next, armed.schedule);
                } else {
                    self.arm(id, armed.due, Schedule::Done);
                }
                TimerEvent::Fire
            }
            Schedule::Done => TimerEvent::Done,
        };

        trace!("{} fired at {} ({:?})", id, armed.due, event);
        Some(TimerFired {
            id,
            at: armed.due,
            event,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for TimerQueue {
    fn schedule_once(&mut self, at: Timestamp) -> TimerId {
        let id = self.allocate();
        self.arm(id, at, Schedule::Once);
        debug!("{} armed once at {}", id, at);
        id
    }

    fn schedule_periodic(&mut self, first: Timestamp, interval: Duration, until: Timestamp) -> TimerId {
        let id = self.allocate();
        if first > until {
            self.arm(id, first, Schedule::Done);
        } else {
            self.arm(id, first, Schedule::Periodic { interval, until });
        }
        debug!(
            "{} armed every {}s from {} until {}",
            id,
            interval.num_seconds(),
            first,
            until
        );
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.armed.remove(&id);
        self.queue.remove(&id).is_some()
    }
}
