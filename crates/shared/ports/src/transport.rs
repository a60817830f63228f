use tempo_core::Order;

use crate::TransportResult;

/// Port for order transport (trade daemon, exchange or simulator)
///
/// Both calls are fire-and-forget: acceptance only means the request left.
/// Status changes and fills come back later as separate events.
pub trait OrderTransport {
    /// Hand a new order to the transport
    fn send_order(&mut self, order: &Order) -> TransportResult<()>;

    /// Request cancellation of a working order
    fn send_cancel(&mut self, order: &Order) -> TransportResult<()>;
}
