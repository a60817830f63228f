//! Position Ledger
//!
//! Last known effective position per instrument. The ledger never derives a
//! position from fills: it only mirrors the authoritative position feed,
//! which also reflects activity from outside this strategy.

use std::collections::HashMap;

use log::debug;
use tempo_core::{InstrumentId, Quantity};

#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<InstrumentId, Quantity>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored position (last write wins).
    /// Returns the previous value, if any.
    pub fn on_position_changed(&mut self, instrument: &InstrumentId, effective_size: Quantity) -> Option<Quantity> {
        let previous = self.positions.insert(instrument.clone(), effective_size);
        debug!(
            "position {} {} -> {}",
            instrument,
            previous.unwrap_or(0),
            effective_size
        );
        previous
    }

    /// Last stored position, zero if never observed
    pub fn get(&self, instrument: &InstrumentId) -> Quantity {
        self.positions.get(instrument).copied().unwrap_or(0)
    }

    /// Instruments with a non-zero position
    pub fn open_positions(&self) -> impl Iterator<Item = (&InstrumentId, Quantity)> {
        self.positions
            .iter()
            .filter(|(_, size)| **size != 0)
            .map(|(instrument, size)| (instrument, *size))
    }
}
