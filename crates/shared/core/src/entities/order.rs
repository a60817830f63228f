use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DoneReason, OrderStatus, Side, TimeInForce};
use crate::instruments::{InstrumentId, MarketDestination};
use crate::values::{Price, Quantity};

/// Stable handle for an order, allocated by the order manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a caller asks for when sending an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub instrument: InstrumentId,
    pub side: Side,
    /// Zero means a market order
    pub price: Price,
    pub time_in_force: TimeInForce,
    pub desired_size: Quantity,
    pub destination: MarketDestination,
}

impl OrderSpec {
    /// Market order (price 0)
    pub fn market(
        instrument: impl Into<InstrumentId>,
        side: Side,
        desired_size: Quantity,
        time_in_force: TimeInForce,
        destination: MarketDestination,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            side,
            price: Decimal::ZERO,
            time_in_force,
            desired_size,
            destination,
        }
    }

    /// Priced (limit) order
    pub fn limit(
        instrument: impl Into<InstrumentId>,
        side: Side,
        price: Price,
        desired_size: Quantity,
        time_in_force: TimeInForce,
        destination: MarketDestination,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            side,
            price,
            time_in_force,
            desired_size,
            destination,
        }
    }

    pub fn is_market(&self) -> bool {
        self.price.is_zero()
    }
}

/// One order lifecycle instance, owned by the order manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub instrument: InstrumentId,
    pub side: Side,
    /// Zero means a market order
    pub price: Price,
    pub time_in_force: TimeInForce,
    pub desired_size: Quantity,
    pub destination: MarketDestination,
    pub status: OrderStatus,
    /// Set once `status` is `Done`
    pub done_reason: Option<DoneReason>,
    /// Cumulative filled quantity, summed from fill reports only
    pub filled_size: Quantity,
    /// Cumulative fill as last reported on a status update
    pub reported_filled_size: Quantity,
    pub last_fill_size: Quantity,
    pub last_fill_price: Option<Price>,
    /// A cancel for the unfilled remainder has already been issued
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in `New` status
    pub fn new(id: OrderId, spec: OrderSpec, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            instrument: spec.instrument,
            side: spec.side,
            price: spec.price,
            time_in_force: spec.time_in_force,
            desired_size: spec.desired_size,
            destination: spec.destination,
            status: OrderStatus::New,
            done_reason: None,
            filled_size: 0,
            reported_filled_size: 0,
            last_fill_size: 0,
            last_fill_price: None,
            cancel_requested: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_market(&self) -> bool {
        self.price.is_zero()
    }

    /// Returns remaining quantity to be filled
    pub fn remaining_size(&self) -> Quantity {
        (self.desired_size - self.filled_size).max(0)
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_size >= self.desired_size
    }

    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let price = if self.is_market() {
            "MKT".to_string()
        } else {
            self.price.to_string()
        };
        write!(
            f,
            "oid={} {} {} {}@{} tif={} dest={} status={}",
            self.id,
            self.side,
            self.instrument,
            self.desired_size,
            price,
            self.time_in_force,
            self.destination,
            self.status
        )
    }
}
