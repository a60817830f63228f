//! Error types for the gateway crate

use thiserror::Error;

pub use tempo_ports::TransportError;

/// Gateway-level errors (channels and recorded sessions)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed event at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;
