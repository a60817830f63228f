//! Transport abstraction layer
//!
//! Provides unified traits for message passing using tokio channels.
//! The trait-based design allows swapping in another transport later.

pub mod channel;

use crate::error::GatewayError;
use async_trait::async_trait;

/// Publisher - sends messages to the consuming side
#[async_trait]
pub trait Publisher<M>: Send + Sync
where
    M: Send + Sync,
{
    /// Publish a message
    async fn publish(&self, msg: M) -> Result<(), GatewayError>;
}

/// Subscriber - receives messages in publication order
#[async_trait]
pub trait Subscriber<M>: Send
where
    M: Send,
{
    /// Wait for the next message; `None` once every publisher is gone
    async fn next(&mut self) -> Option<M>;

    /// Try to receive without blocking (returns None if no message available)
    fn try_next(&mut self) -> Result<Option<M>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure traits are object-safe
    fn _assert_publisher_object_safe(_: &dyn Publisher<String>) {}
    fn _assert_subscriber_object_safe(_: &mut dyn Subscriber<String>) {}
}
