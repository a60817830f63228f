//! Simulated order gateway
//!
//! Executes orders against the platform's current view of the market
//! without any exchange connection.

mod paper;

pub use paper::{PaperConfig, PaperGateway};
