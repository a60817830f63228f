use serde::{Deserialize, Serialize};

/// Order lifecycle status, as reported by the order transport.
///
/// `New → Transit → Open → Done`. The order manager never moves an order
/// between these states on its own; only status notifications do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been handed to the trade daemon
    New,
    /// Order is on its way to the market
    Transit,
    /// Order has been acknowledged as open by the market
    Open,
    /// Order is finished; see the accompanying [`DoneReason`]
    Done,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done)
    }

    /// Returns true if the order is still working
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Transit => "TRANSIT",
            OrderStatus::Open => "OPEN",
            OrderStatus::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Why an order reached [`OrderStatus::Done`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneReason {
    /// Completely filled
    Fill,
    /// Canceled (by us or the venue)
    Cancel,
    /// Rejected by the venue or trade daemon
    Reject,
    /// Expired (DAY / IOC remainder)
    Expire,
    /// Anything else the transport reports
    Other(String),
}

impl DoneReason {
    /// Fill and cancel are the two expected ways for an order to finish.
    pub fn is_expected(&self) -> bool {
        matches!(self, DoneReason::Fill | DoneReason::Cancel)
    }
}

impl std::fmt::Display for DoneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoneReason::Fill => f.write_str("FILL"),
            DoneReason::Cancel => f.write_str("CANCEL"),
            DoneReason::Reject => f.write_str("REJECT"),
            DoneReason::Expire => f.write_str("EXPIRE"),
            DoneReason::Other(reason) => write!(f, "OTHER({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_done_is_terminal() {
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::Transit.is_terminal());
        assert!(!OrderStatus::Open.is_terminal());
        assert!(OrderStatus::Done.is_terminal());
    }

    #[test]
    fn test_expected_done_reasons() {
        assert!(DoneReason::Fill.is_expected());
        assert!(DoneReason::Cancel.is_expected());
        assert!(!DoneReason::Reject.is_expected());
        assert!(!DoneReason::Other("halted".into()).is_expected());
    }
}
