//! Order execution feedback

use serde::{Deserialize, Serialize};
use tempo_core::{DoneReason, InstrumentId, OrderId, OrderStatus, Price, Quantity, Timestamp};

/// Status transition reported by the order gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: OrderId,
    pub instrument: InstrumentId,
    pub status: OrderStatus,
    /// Present when `status` is `Done`
    #[serde(default)]
    pub done_reason: Option<DoneReason>,
    /// Cumulative filled quantity as seen by the gateway
    pub filled_size: Quantity,
    pub timestamp: Timestamp,
}

impl OrderStatusUpdate {
    pub fn new(
        order_id: OrderId,
        instrument: InstrumentId,
        status: OrderStatus,
        filled_size: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            order_id,
            instrument,
            status,
            done_reason: None,
            filled_size,
            timestamp,
        }
    }

    /// Terminal update with its reason
    pub fn done(
        order_id: OrderId,
        instrument: InstrumentId,
        reason: DoneReason,
        filled_size: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            order_id,
            instrument,
            status: OrderStatus::Done,
            done_reason: Some(reason),
            filled_size,
            timestamp,
        }
    }
}

/// One execution against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    pub order_id: OrderId,
    pub instrument: InstrumentId,
    pub fill_size: Quantity,
    pub fill_price: Price,
    /// Commission charged on this execution
    #[serde(default)]
    pub fee: Price,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_done_update_carries_reason() {
        let update = OrderStatusUpdate::done(
            OrderId(3),
            InstrumentId::new("IF2403"),
            DoneReason::Cancel,
            40,
            Utc::now(),
        );
        assert_eq!(update.status, OrderStatus::Done);
        assert_eq!(update.done_reason, Some(DoneReason::Cancel));

        let open = OrderStatusUpdate::new(
            OrderId(3),
            InstrumentId::new("IF2403"),
            OrderStatus::Open,
            0,
            Utc::now(),
        );
        assert!(open.done_reason.is_none());
    }
}
