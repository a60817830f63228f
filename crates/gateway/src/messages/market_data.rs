//! Market data message types

use serde::{Deserialize, Serialize};
use tempo_core::{InstrumentId, Price, Quantity, Timestamp};
use tempo_ports::TopOfBook;

/// A single trade print or volume update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    pub price: Price,
    pub size: Quantity,
    /// Time stamped by the exchange
    pub exchange_time: Timestamp,
    /// Time the platform received the message; drives the strategy
    pub msg_time: Timestamp,
    /// Volume on this print is estimated rather than reported
    #[serde(default)]
    pub volume_estimated: bool,
}

impl TradeTick {
    pub fn new(price: Price, size: Quantity, exchange_time: Timestamp, msg_time: Timestamp) -> Self {
        Self {
            price,
            size,
            exchange_time,
            msg_time,
            volume_estimated: false,
        }
    }
}

/// Top-of-book change notification
///
/// `bid_level_changed` / `ask_level_changed` carry the index of the deepest
/// level that changed on that side, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookChange {
    pub instrument: InstrumentId,
    #[serde(default)]
    pub bid_level_changed: Option<u32>,
    #[serde(default)]
    pub ask_level_changed: Option<u32>,
    /// Book top after the change
    pub top: TopOfBook,
    pub timestamp: Timestamp,
}

impl BookChange {
    /// Did level 0 change on either side?
    pub fn top_changed(&self) -> bool {
        self.bid_level_changed == Some(0) || self.ask_level_changed == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempo_ports::BookLevel;

    #[test]
    fn test_top_changed_only_for_level_zero() {
        let mut change = BookChange {
            instrument: InstrumentId::new("IF2403"),
            bid_level_changed: Some(2),
            ask_level_changed: None,
            top: TopOfBook::new(Some(BookLevel::new(dec!(99), 5)), None),
            timestamp: Utc::now(),
        };
        assert!(!change.top_changed());

        change.ask_level_changed = Some(0);
        assert!(change.top_changed());
    }

    #[test]
    fn test_tick_defaults_to_reported_volume() {
        let now = Utc::now();
        let tick = TradeTick::new(dec!(100.5), 3, now, now);
        assert!(!tick.volume_estimated);
    }
}
