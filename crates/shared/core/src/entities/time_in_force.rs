use serde::{Deserialize, Serialize};

/// Time-in-force instructions for order validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Day order: automatically canceled at end of trading day
    Day,

    /// Immediate or Cancel: execute immediately (partially or fully) and cancel unfilled portion
    Ioc,

    /// Good Till Canceled: order remains active until explicitly canceled
    Gtc,
}

impl TimeInForce {
    /// Returns true if the venue drops the unfilled remainder on its own
    pub fn cancels_remainder(&self) -> bool {
        matches!(self, TimeInForce::Ioc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Day => "day",
            TimeInForce::Ioc => "ioc",
            TimeInForce::Gtc => "gtc",
        }
    }
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
