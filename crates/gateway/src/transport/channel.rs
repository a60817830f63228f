//! Tokio channel-based transport for single-process mode
//!
//! Unbounded mpsc channels: publishing never blocks, which lets synchronous
//! code (the paper gateway inside an order send) hand events back to the
//! event loop. No serialization overhead - messages are passed directly.

use crate::error::GatewayError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Channel-based publisher
pub struct ChannelPublisher<M> {
    tx: mpsc::UnboundedSender<M>,
}

// Derive would require `M: Clone`
impl<M> Clone for ChannelPublisher<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> ChannelPublisher<M> {
    /// Create a publisher/subscriber pair
    pub fn pair() -> (Self, ChannelSubscriber<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ChannelSubscriber { rx })
    }

    /// Publish from synchronous code
    pub fn send(&self, msg: M) -> Result<(), GatewayError> {
        self.tx.send(msg).map_err(|_| GatewayError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl<M> Publisher<M> for ChannelPublisher<M>
where
    M: Send + Sync + 'static,
{
    async fn publish(&self, msg: M) -> Result<(), GatewayError> {
        self.send(msg)
    }
}

/// Channel-based subscriber
pub struct ChannelSubscriber<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M> ChannelSubscriber<M> {
    /// Receive directly, for use inside `tokio::select!`
    pub async fn recv(&mut self) -> Option<M> {
        self.rx.recv().await
    }
}

#[async_trait]
impl<M> Subscriber<M> for ChannelSubscriber<M>
where
    M: Send + 'static,
{
    async fn next(&mut self) -> Option<M> {
        self.rx.recv().await
    }

    fn try_next(&mut self) -> Result<Option<M>, GatewayError> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(GatewayError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pubsub() {
        let (publisher, mut subscriber) = ChannelPublisher::<String>::pair();

        publisher.publish("hello".to_string()).await.unwrap();

        let msg = subscriber.next().await.unwrap();
        assert_eq!(msg, "hello");
    }

    #[tokio::test]
    async fn test_sync_send_preserves_order() {
        let (publisher, mut subscriber) = ChannelPublisher::<i32>::pair();
        let other = publisher.clone();

        publisher.send(1).unwrap();
        other.send(2).unwrap();

        assert_eq!(subscriber.try_next().unwrap(), Some(1));
        assert_eq!(subscriber.try_next().unwrap(), Some(2));
        assert_eq!(subscriber.try_next().unwrap(), None);
    }

    #[tokio::test]
    async fn test_closed_after_publishers_dropped() {
        let (publisher, mut subscriber) = ChannelPublisher::<i32>::pair();
        drop(publisher);

        assert!(subscriber.next().await.is_none());
        assert!(matches!(subscriber.try_next(), Err(GatewayError::ChannelClosed)));
    }

    #[test]
    fn test_send_fails_once_subscriber_dropped() {
        let (publisher, subscriber) = ChannelPublisher::<i32>::pair();
        drop(subscriber);

        assert!(publisher.is_closed());
        assert!(matches!(publisher.send(1), Err(GatewayError::ChannelClosed)));
    }
}
