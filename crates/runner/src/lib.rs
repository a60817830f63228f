//! Tempo Runner
//!
//! Runs one trading-window strategy session on a single thread:
//!
//! - **Config**: JSON file with runner fields and strategy settings
//! - **Platform**: routes, timers, book cache and exit flag shared with the strategy
//! - **Feeds**: synthetic random walk or a recorded JSON-lines session
//! - **Console**: stdin commands and SIGINT / SIGTERM as events
//! - **Event loop**: orders the inputs and dispatches them to the strategy
//!
//! ## Architecture
//!
//! ```text
//!   Feed ──────────┐         ┌──────────── console / signals
//!                  ▼         ▼
//!              ┌───────────────────┐  timers   ┌────────────┐
//!              │    Event Loop     │ ◄──────── │ TimerQueue │
//!              └─────────┬─────────┘           └────────────┘
//!                        │ dispatch (live subscriptions only)
//!                        ▼
//!              ┌───────────────────┐  orders   ┌──────────────┐
//!              │  WindowStrategy   │ ────────► │ PaperGateway │
//!              └───────────────────┘           └──────┬───────┘
//!                        ▲     status / fill / position │
//!                        └──────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod event_loop;
pub mod feed;
pub mod platform;
pub mod session;

// Re-export main types
pub use config::{ConfigError, FeedConfig, RunMode, RunnerConfig};
pub use error::{Result, RunnerError};
pub use event_loop::{EventLoop, SessionSummary};
pub use feed::{EventSource, RecordedFeed, SyntheticFeed, SyntheticFeedConfig};
pub use platform::{BookCache, ExitFlag, Platform, RouteTable, SharedBooks, SharedRoutes, SharedTimers};
pub use session::{Session, SessionReport};
