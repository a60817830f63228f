//! Normalized platform events
//!
//! Every source (market data, order gateway, position feed, operator
//! console, signal handler) is turned into one [`PlatformEvent`] stream so
//! the strategy sees a single, time-ordered sequence. Recorded sessions are
//! stored as one JSON event per line.

pub mod account;
pub mod market_data;
pub mod order;

use serde::{Deserialize, Serialize};
use tempo_core::{InstrumentId, Timestamp};

pub use account::{PositionUpdate, ProcessSignal, UserMessage};
pub use market_data::{BookChange, TradeTick};
pub use order::{FillReport, OrderStatusUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    Tick {
        instrument: InstrumentId,
        tick: TradeTick,
        /// Opening print of the session
        #[serde(default)]
        opening: bool,
    },
    Book(BookChange),
    BookFlushed {
        instrument: InstrumentId,
        timestamp: Timestamp,
    },
    OrderStatus(OrderStatusUpdate),
    Fill(FillReport),
    Position(PositionUpdate),
    UserMessage(UserMessage),
    Signal { signal: ProcessSignal },
}

impl PlatformEvent {
    /// Event time, for events that carry one
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            PlatformEvent::Tick { tick, .. } => Some(tick.msg_time),
            PlatformEvent::Book(change) => Some(change.timestamp),
            PlatformEvent::BookFlushed { timestamp, .. } => Some(*timestamp),
            PlatformEvent::OrderStatus(update) => Some(update.timestamp),
            PlatformEvent::Fill(fill) => Some(fill.timestamp),
            PlatformEvent::Position(update) => Some(update.timestamp),
            PlatformEvent::UserMessage(_) | PlatformEvent::Signal { .. } => None,
        }
    }

    /// Instrument the event is about, if any
    pub fn instrument(&self) -> Option<&InstrumentId> {
        match self {
            PlatformEvent::Tick { instrument, .. } => Some(instrument),
            PlatformEvent::Book(change) => Some(&change.instrument),
            PlatformEvent::BookFlushed { instrument, .. } => Some(instrument),
            PlatformEvent::OrderStatus(update) => Some(&update.instrument),
            PlatformEvent::Fill(fill) => Some(&fill.instrument),
            PlatformEvent::Position(update) => Some(&update.instrument),
            PlatformEvent::UserMessage(_) | PlatformEvent::Signal { .. } => None,
        }
    }

    /// Parse one line of a recorded session
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempo_core::{Recipient, UserCommand};

    #[test]
    fn test_recorded_tick_line() {
        let line = r#"{"type":"tick","instrument":"IF2403","tick":{"price":"3500.2","size":3,"exchange_time":"2024-03-01T09:30:00Z","msg_time":"2024-03-01T09:30:00.010Z"},"opening":true}"#;
        let event = PlatformEvent::from_json_line(line).unwrap();

        match &event {
            PlatformEvent::Tick { instrument, tick, opening } => {
                assert_eq!(instrument.as_str(), "IF2403");
                assert_eq!(tick.price, dec!(3500.2));
                assert!(*opening);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            event.timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + chrono::Duration::milliseconds(10))
        );
    }

    #[test]
    fn test_command_has_no_timestamp() {
        let event = PlatformEvent::UserMessage(UserMessage::new(Recipient::All, UserCommand::Shutdown));
        assert!(event.timestamp().is_none());
        assert!(event.instrument().is_none());

        let line = event.to_json_line().unwrap();
        assert_eq!(PlatformEvent::from_json_line(&line).unwrap(), event);
    }
}
