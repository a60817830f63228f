//! Tempo Strategy
//!
//! The decision core of the trading-window strategy:
//! - Strategy trait for event-driven trading
//! - [`WindowStrategy`]: arms inside the configured window and sends the
//!   entry, exit, hourly and book-reaction orders
//! - Operator commands and the graceful shutdown state machine
//! - Subscription bookkeeping for clean teardown
//!
//! ## Architecture
//!
//! ```text
//!  ticks / book / timers / commands / signals
//!                    │
//!                    ▼
//!            ┌──────────────┐   reads    ┌────────────────┐
//!            │WindowStrategy│ ─────────► │ PositionLedger │
//!            └──────┬───────┘            └────────────────┘
//!                   │ OrderSpec
//!                   ▼
//!            ┌──────────────┐
//!            │ OrderManager │ ──► OrderTransport
//!            └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tempo_strategy::{Strategy, StrategySettings, TradingContext, WindowStrategy};
//!
//! let mut strategy = WindowStrategy::new(&settings, ctx)?;
//! strategy.subscribe_user_messages();
//! strategy.on_tick(&instrument, &tick);
//! ```

pub mod commands;
pub mod context;
pub mod engine;
pub mod settings;
pub mod shutdown;
pub mod strategy;
pub mod subscriptions;

// Re-export main types
pub use commands::CommandPolarity;
pub use context::TradingContext;
pub use engine::WindowStrategy;
pub use settings::{SettingsError, StrategySettings};
pub use shutdown::{ShutdownAction, ShutdownController, ShutdownState};
pub use strategy::Strategy;
pub use subscriptions::SubscriptionRegistry;
