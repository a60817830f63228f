//! Instrument identifiers and the session's instrument list

mod instrument;

pub use instrument::{InstrumentId, InstrumentSet, MarketDestination};
