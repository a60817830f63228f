//! Tempo Clock Infrastructure
//!
//! Time for the strategy core:
//!
//! - [`TradingWindow`]: the day's start / end / entry / exit instants,
//!   computed once from the session date and configured times of day
//! - [`SystemClock`]: wall time for live sessions
//! - [`SimClock`]: event-driven time for replays and tests
//! - [`TimerQueue`]: one-shot and periodic timers ordered by due time
//!
//! ## Usage
//!
//! ```ignore
//! use tempo_clock::{SimClock, TimerQueue, TradingWindow, WindowTimes};
//!
//! let window = TradingWindow::new(date, &times, offset);
//! let clock = SimClock::new(window.start());
//! let mut timers = TimerQueue::new();
//! let warn = timers.schedule_once(window.pre_warning());
//!
//! clock.advance_to(tick.msg_time);
//! while let Some(fired) = timers.pop_due(clock.now()) {
//!     // dispatch fired
//! }
//! ```

mod sim;
mod system;
mod timer;
mod window;

pub use sim::SimClock;
pub use system::SystemClock;
pub use timer::TimerQueue;
pub use window::{TradingWindow, WindowTimes};

// Re-export the Clock trait for convenience
pub use tempo_ports::Clock;
