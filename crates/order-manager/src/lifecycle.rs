//! Order lifecycle tracking
//!
//! The manager owns every order it creates and hands callers a stable
//! [`OrderId`]. Status only moves on gateway notifications; the manager
//! never transitions an order by itself. Once an order is `Done` it is kept
//! for inspection only and is never resent.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};
use serde::Serialize;
use tempo_core::{DoneReason, Order, OrderId, OrderSpec, OrderStatus};
use tempo_gateway::{FillReport, OrderStatusUpdate};
use tempo_ports::{Clock, OrderTransport};

use crate::error::{OrderError, Result};
use crate::pnl::PnlBook;

/// Session counters, logged in the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub orders_sent: u64,
    pub send_failures: u64,
    pub fills: u64,
    pub filled_orders: u64,
    pub cancels_sent: u64,
    pub cancel_failures: u64,
    pub cancelled_orders: u64,
    pub anomalies: u64,
}

impl std::fmt::Display for OrderStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sent={} send_failures={} fills={} filled={} cancels={} cancel_failures={} cancelled={} anomalies={}",
            self.orders_sent,
            self.send_failures,
            self.fills,
            self.filled_orders,
            self.cancels_sent,
            self.cancel_failures,
            self.cancelled_orders,
            self.anomalies
        )
    }
}

pub struct OrderManager {
    transport: Box<dyn OrderTransport>,
    clock: Box<dyn Clock>,
    orders: BTreeMap<OrderId, Order>,
    next_id: u64,
    stats: OrderStats,
    pnl: PnlBook,
}

impl OrderManager {
    pub fn new(transport: Box<dyn OrderTransport>, clock: Box<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            orders: BTreeMap::new(),
            next_id: 1,
            stats: OrderStats::default(),
            pnl: PnlBook::new(),
        }
    }

    /// Create an order and hand it to the transport.
    ///
    /// A rejected send is logged and the order discarded; it is never
    /// retried.
    pub fn send_order(&mut self, spec: OrderSpec) -> Result<OrderId> {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        let order = Order::new(id, spec, self.clock.now());

        if order.desired_size <= 0 {
            self.stats.send_failures += 1;
            error!("PLACED ORDER FAILED: {}: invalid size", order);
            return Err(OrderError::InvalidSize(order.desired_size));
        }

        if let Err(e) = self.transport.send_order(&order) {
            self.stats.send_failures += 1;
            error!("PLACED ORDER FAILED: {}: {}", order, e);
            return Err(OrderError::SendFailed {
                order_id: id,
                source: e,
            });
        }

        info!("PLACED ORDER: {}", order);
        self.stats.orders_sent += 1;
        self.orders.insert(id, order);
        Ok(id)
    }

    /// Apply a status notification from the gateway
    pub fn on_status_change(&mut self, update: &OrderStatusUpdate) -> Result<OrderStatus> {
        let Some(order) = self.orders.get_mut(&update.order_id) else {
            warn!(
                "status {} for unknown order {} ({})",
                update.status, update.order_id, update.instrument
            );
            return Err(OrderError::UnknownOrder(update.order_id));
        };

        if order.is_done() {
            debug!("ignoring {} for finished order {}", update.status, order.id);
            return Err(OrderError::AlreadyDone(order.id));
        }

        order.status = update.status;
        // Fill reports and status updates arrive in either order; only
        // fill reports move `filled_size`.
        order.reported_filled_size = order.reported_filled_size.max(update.filled_size);
        order.updated_at = update.timestamp;

        if update.status != OrderStatus::Done {
            debug!("order status: {}", order);
            return Ok(order.status);
        }

        let reason = update
            .done_reason
            .clone()
            .unwrap_or_else(|| DoneReason::Other("unspecified".to_string()));
        match &reason {
            DoneReason::Fill => {
                self.stats.filled_orders += 1;
                info!(
                    "ORDER FILLED: oid={} {} filled {}",
                    order.id,
                    order.instrument,
                    order.filled_size.max(order.reported_filled_size)
                );
            }
            DoneReason::Cancel => {
                self.stats.cancelled_orders += 1;
                info!(
                    "ORDER CANCELED: oid={} {} filled {} of {}",
                    order.id,
                    order.instrument,
                    order.filled_size.max(order.reported_filled_size),
                    order.desired_size
                );
            }
            other => {
                self.stats.anomalies += 1;
                warn!("ORDER DONE UNEXPECTEDLY ({}): {}", other, order);
            }
        }
        order.done_reason = Some(reason);

        Ok(order.status)
    }

    /// Record a fill and cancel the unfilled remainder.
    ///
    /// At most one cancel is ever requested per order, even if more partial
    /// fills follow. Returns true when a cancel went out.
    pub fn on_fill(&mut self, fill: &FillReport) -> Result<bool> {
        let Some(order) = self.orders.get_mut(&fill.order_id) else {
            warn!(
                "fill {}@{} for unknown order {} ({})",
                fill.fill_size, fill.fill_price, fill.order_id, fill.instrument
            );
            return Err(OrderError::UnknownOrder(fill.order_id));
        };

        self.stats.fills += 1;
        order.filled_size += fill.fill_size;
        order.last_fill_size = fill.fill_size;
        order.last_fill_price = Some(fill.fill_price);
        order.updated_at = fill.timestamp;
        self.pnl
            .on_fill(&order.instrument, order.side, fill.fill_size, fill.fill_price, fill.fee);
        info!(
            "FILL: oid={} {} {} {}@{} cum={}/{}",
            order.id,
            order.side,
            order.instrument,
            fill.fill_size,
            fill.fill_price,
            order.filled_size,
            order.desired_size
        );

        if order.desired_size <= order.filled_size || order.cancel_requested {
            return Ok(false);
        }
        if order.is_done() {
            debug!("order {} already done, no residual to cancel", order.id);
            return Ok(false);
        }

        order.cancel_requested = true;
        match self.transport.send_cancel(order) {
            Ok(()) => {
                self.stats.cancels_sent += 1;
                info!(
                    "CANCEL RESIDUAL: oid={} {} remaining {}",
                    order.id,
                    order.instrument,
                    order.remaining_size()
                );
                Ok(true)
            }
            Err(e) => {
                self.stats.cancel_failures += 1;
                error!("CANCEL FAILED: {}: {}", order, e);
                Err(OrderError::CancelFailed {
                    order_id: order.id,
                    source: e,
                })
            }
        }
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Every accepted order, oldest first
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Orders not yet `Done`
    pub fn working_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|o| !o.is_done())
    }

    pub fn stats(&self) -> OrderStats {
        self.stats
    }

    /// PnL built from the fills of orders this manager sent
    pub fn pnl(&self) -> &PnlBook {
        &self.pnl
    }
}
