//! Graceful shutdown
//!
//! `Running → ShutdownScheduled → ShuttingDown`. The first request arms a
//! grace timer so in-flight cancels can be acknowledged; a second request
//! while that timer is pending exits at once.

use chrono::Duration;
use log::{debug, info, warn};
use tempo_core::Timestamp;
use tempo_ports::{SessionControl, TimerFired, TimerId, TimerService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShutdownScheduled { timer: TimerId, deadline: Timestamp },
    ShuttingDown,
}

/// What a shutdown request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// Exit armed for `at`
    Scheduled { timer: TimerId, at: Timestamp },
    /// Exit requested now; the pending grace timer was cancelled
    ExitNow { cancelled: TimerId },
    /// Already shutting down
    Ignored,
}

#[derive(Debug)]
pub struct ShutdownController {
    state: ShutdownState,
    delay: Duration,
}

impl ShutdownController {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: ShutdownState::Running,
            delay,
        }
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn request(
        &mut self,
        now: Timestamp,
        timers: &mut dyn TimerService,
        control: &mut dyn SessionControl,
    ) -> ShutdownAction {
        match self.state {
            ShutdownState::Running => {
                let at = now + self.delay;
                let timer = timers.schedule_once(at);
                self.state = ShutdownState::ShutdownScheduled {
                    timer,
                    deadline: at,
                };
                warn!("shutting down in {} seconds", self.delay.num_seconds());
                ShutdownAction::Scheduled { timer, at }
            }
            ShutdownState::ShutdownScheduled { timer, .. } => {
                warn!("second shutdown request; shutting down now");
                timers.cancel(timer);
                self.state = ShutdownState::ShuttingDown;
                control.request_exit();
                ShutdownAction::ExitNow { cancelled: timer }
            }
            ShutdownState::ShuttingDown => {
                debug!("shutdown already in progress");
                ShutdownAction::Ignored
            }
        }
    }

    /// Handle a fired timer; returns true if it was the grace timer
    pub fn on_timer(&mut self, fired: &TimerFired, control: &mut dyn SessionControl) -> bool {
        match self.state {
            ShutdownState::ShutdownScheduled { timer, .. } if timer == fired.id => {
                info!("grace period over, exiting");
                self.state = ShutdownState::ShuttingDown;
                control.request_exit();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempo_ports::TimerEvent;

    #[derive(Default)]
    struct Timers {
        armed: Vec<Timestamp>,
        cancelled: Vec<TimerId>,
    }

    impl TimerService for Timers {
        fn schedule_once(&mut self, at: Timestamp) -> TimerId {
            self.armed.push(at);
            TimerId(self.armed.len() as u64)
        }

        fn schedule_periodic(&mut self, first: Timestamp, _interval: Duration, _until: Timestamp) -> TimerId {
            self.schedule_once(first)
        }

        fn cancel(&mut self, id: TimerId) -> bool {
            self.cancelled.push(id);
            true
        }
    }

    #[derive(Default)]
    struct Control {
        exit: bool,
    }

    impl SessionControl for Control {
        fn request_exit(&mut self) {
            self.exit = true;
        }

        fn exit_requested(&self) -> bool {
            self.exit
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_first_request_schedules_grace_period() {
        let mut timers = Timers::default();
        let mut control = Control::default();
        let mut shutdown = ShutdownController::new(Duration::seconds(3));

        let action = shutdown.request(now(), &mut timers, &mut control);
        assert_eq!(
            action,
            ShutdownAction::Scheduled {
                timer: TimerId(1),
                at: now() + Duration::seconds(3)
            }
        );
        assert!(!control.exit_requested());

        let fired = TimerFired {
            id: TimerId(1),
            at: now() + Duration::seconds(3),
            event: TimerEvent::Fire,
        };
        assert!(shutdown.on_timer(&fired, &mut control));
        assert!(control.exit_requested());
        assert_eq!(shutdown.state(), ShutdownState::ShuttingDown);
    }

    #[test]
    fn test_second_request_bypasses_delay() {
        let mut timers = Timers::default();
        let mut control = Control::default();
        let mut shutdown = ShutdownController::new(Duration::seconds(3));

        shutdown.request(now(), &mut timers, &mut control);
        let action = shutdown.request(now() + Duration::seconds(1), &mut timers, &mut control);

        assert_eq!(action, ShutdownAction::ExitNow { cancelled: TimerId(1) });
        assert_eq!(timers.cancelled, vec![TimerId(1)]);
        assert!(control.exit_requested());

        // Third request changes nothing
        assert_eq!(
            shutdown.request(now() + Duration::seconds(2), &mut timers, &mut control),
            ShutdownAction::Ignored
        );
        assert_eq!(timers.armed.len(), 1);
    }

    #[test]
    fn test_unrelated_timer_is_not_consumed() {
        let mut control = Control::default();
        let mut shutdown = ShutdownController::new(Duration::seconds(3));
        let fired = TimerFired {
            id: TimerId(7),
            at: now(),
            event: TimerEvent::Fire,
        };
        assert!(!shutdown.on_timer(&fired, &mut control));
        assert!(!control.exit_requested());
    }
}
