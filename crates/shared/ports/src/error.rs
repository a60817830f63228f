use tempo_core::OrderId;
use thiserror::Error;

/// Failures reported by an order transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Order rejected by transport: {0}")]
    Rejected(String),

    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    #[error("Order {0} is already done")]
    AlreadyDone(OrderId),

    #[error("Not connected to trade server")]
    Disconnected,
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
