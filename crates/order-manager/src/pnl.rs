//! Profit and loss per instrument
//!
//! Built from this strategy's own fills, unlike the [`PositionLedger`],
//! which mirrors the platform's effective position. Average price follows
//! the open quantity; closing fills realize against it.
//!
//! [`PositionLedger`]: crate::PositionLedger

use std::collections::HashMap;

use log::debug;
use rust_decimal::Decimal;
use tempo_core::{InstrumentId, Price, Quantity, Side};

/// Fill-driven position and PnL for a single instrument
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PnlPosition {
    /// Net quantity (positive = long, negative = short)
    pub quantity: Quantity,
    /// Average price of the open quantity
    pub avg_price: Price,
    pub realized_pnl: Decimal,
    pub fees: Decimal,
}

impl PnlPosition {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn unrealized_pnl(&self, current_price: Price) -> Decimal {
        Decimal::from(self.quantity) * (current_price - self.avg_price)
    }

    /// Realized plus unrealized, net of fees
    pub fn net_pnl(&self, current_price: Price) -> Decimal {
        self.realized_pnl + self.unrealized_pnl(current_price) - self.fees
    }

    /// Apply a signed fill. Returns the PnL it realized.
    fn apply(&mut self, signed_size: Quantity, price: Price, fee: Decimal) -> Decimal {
        self.fees += fee;
        if signed_size == 0 {
            return Decimal::ZERO;
        }

        if self.quantity == 0 || self.quantity.signum() == signed_size.signum() {
            let held = Decimal::from(self.quantity.abs());
            let added = Decimal::from(signed_size.abs());
            self.avg_price = (held * self.avg_price + added * price) / (held + added);
            self.quantity += signed_size;
            return Decimal::ZERO;
        }

        let closing = signed_size.abs().min(self.quantity.abs());
        let realized = Decimal::from(closing * self.quantity.signum()) * (price - self.avg_price);
        self.realized_pnl += realized;
        self.quantity += signed_size;

        if self.quantity == 0 {
            self.avg_price = Decimal::ZERO;
        } else if self.quantity.signum() == signed_size.signum() {
            // Flipped through flat: the remainder opened at this fill's price
            self.avg_price = price;
        }
        realized
    }
}

#[derive(Debug, Default)]
pub struct PnlBook {
    positions: HashMap<InstrumentId, PnlPosition>,
}

impl PnlBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_fill(&mut self, instrument: &InstrumentId, side: Side, size: Quantity, price: Price, fee: Decimal) {
        let position = self.positions.entry(instrument.clone()).or_default();
        let realized = position.apply(side.position_sign() * size, price, fee);
        debug!(
            "pnl {} {} {}@{} qty={} avg={} realized={}",
            instrument, side, size, price, position.quantity, position.avg_price, realized
        );
    }

    /// Position for `instrument`, flat if it never traded
    pub fn position(&self, instrument: &InstrumentId) -> PnlPosition {
        self.positions.get(instrument).cloned().unwrap_or_default()
    }
}
