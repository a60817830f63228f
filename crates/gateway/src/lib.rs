//! Tempo Gateway
//!
//! Gateway layer between the platform and the strategy core. Provides:
//! - Normalized event messages (ticks, book changes, order status, fills,
//!   positions, operator commands, process signals)
//! - Transport abstraction (tokio channels behind async traits)
//! - The paper order gateway used for replays and dry runs
//!
//! ## Architecture
//!
//! ```text
//!   Feed (synthetic, recorded, stdin, signals)
//!         │ PlatformEvent
//!    ┌────▼─────┐        send_order / send_cancel
//!    │  Event   │ ───────────────────────────────┐
//!    │  Loop    │                           ┌────▼────┐
//!    └────▲─────┘                           │  Paper  │
//!         │ status / fill / position        │ Gateway │
//!         └─────────────────────────────────┴─────────┘
//! ```
//!
//! ## Transport
//!
//! Everything runs on one thread, so the gateway's responses travel over an
//! unbounded channel that the event loop drains before the next feed event.
//! The `Publisher`/`Subscriber` traits allow plugging in another transport.

pub mod adapters;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use adapters::simulator::{PaperConfig, PaperGateway};
pub use error::{GatewayError, GatewayResult};
pub use messages::{
    PlatformEvent,
    account::{PositionUpdate, ProcessSignal, UserMessage},
    market_data::{BookChange, TradeTick},
    order::{FillReport, OrderStatusUpdate},
};
pub use transport::{
    Publisher, Subscriber,
    channel::{ChannelPublisher, ChannelSubscriber},
};
