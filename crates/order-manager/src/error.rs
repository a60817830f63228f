//! Order Manager errors

use tempo_core::{OrderId, Quantity};
use tempo_ports::TransportError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Send failed for order {order_id}: {source}")]
    SendFailed {
        order_id: OrderId,
        #[source]
        source: TransportError,
    },

    #[error("Cancel failed for order {order_id}: {source}")]
    CancelFailed {
        order_id: OrderId,
        #[source]
        source: TransportError,
    },

    #[error("Invalid order size: {0}")]
    InvalidSize(Quantity),

    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    #[error("Order {0} is already done")]
    AlreadyDone(OrderId),
}

pub type Result<T> = std::result::Result<T, OrderError>;
