use serde::{Deserialize, Serialize};

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
    /// Sell that opens or extends a short position
    Short,
}

impl Side {
    /// Signed multiplier applied to a fill quantity when it reaches the position
    pub fn position_sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell | Side::Short => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
            Side::Short => "short",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
