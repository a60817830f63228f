//! Tempo Core Domain
//!
//! Pure domain types for the Tempo trading-window strategy.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AccountId, DoneReason, Order, OrderId, OrderSpec, OrderStatus, Recipient, Side, TimeInForce,
    UserCommand,
};
pub use instruments::{InstrumentId, InstrumentSet, MarketDestination};
pub use values::{Price, Quantity, Timestamp};
