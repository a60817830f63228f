//! Order gateway adapters
//!
//! Adapters accept orders from the strategy side through
//! [`tempo_ports::OrderTransport`] and report execution feedback as
//! [`crate::PlatformEvent`]s.

pub mod simulator;

pub use simulator::{PaperConfig, PaperGateway};
