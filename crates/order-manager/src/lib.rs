//! Tempo Order Manager
//!
//! The Order Manager sits between the strategy and the order gateway:
//! - **Order Lifecycle**: issues orders, follows `NEW → TRANSIT → OPEN → DONE`
//!   from gateway notifications, cancels the unfilled remainder after a fill
//! - **Position Ledger**: last known effective position per instrument, fed
//!   by the platform's position updates
//! - **PnL**: average price, realized PnL and fees from the manager's own fills
//!
//! ## Architecture
//!
//! ```text
//! Strategy ──► send_order ──► ┌──────────────────┐ ──► OrderTransport
//!                             │   OrderManager   │
//! Gateway ──► status / fill ─►│  (owns orders)   │ ──► send_cancel (residual)
//!                             └──────────────────┘
//!
//! Position feed ──────────────► PositionLedger ──► exit sizing
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tempo_order_manager::{OrderManager, PositionLedger};
//!
//! let mut orders = OrderManager::new(transport, clock);
//! let id = orders.send_order(OrderSpec::market("IF2403", Side::Buy, 10, TimeInForce::Day, dest))?;
//!
//! // Gateway reports a partial fill: the remainder is cancelled once
//! orders.on_fill(&fill)?;
//! ```

pub mod error;
pub mod lifecycle;
pub mod pnl;
pub mod position;

// Re-export main types
pub use error::{OrderError, Result};
pub use lifecycle::{OrderManager, OrderStats};
pub use pnl::{PnlBook, PnlPosition};
pub use position::PositionLedger;
