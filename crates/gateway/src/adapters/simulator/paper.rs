use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempo_core::{DoneReason, InstrumentId, Order, OrderId, OrderStatus, Price, Quantity};
use tempo_ports::{Clock, MarketView, OrderTransport, TransportError, TransportResult};

use crate::messages::{FillReport, OrderStatusUpdate, PlatformEvent, PositionUpdate};
use crate::transport::channel::ChannelPublisher;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    /// Share of the desired size filled on arrival, in `[0, 1]`
    pub fill_ratio: f64,
    /// Commission charged per filled share
    pub fee_per_share: Price,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            fill_ratio: 1.0,
            fee_per_share: Price::ZERO,
        }
    }
}

#[derive(Debug)]
struct Working {
    instrument: InstrumentId,
    filled: Quantity,
}

/// Paper trading gateway
///
/// Every accepted order is acknowledged (TRANSIT, OPEN) and immediately
/// filled for `fill_ratio` of its size at its limit price, or at the
/// reference price for market orders. The remainder stays open until
/// cancelled; an IOC order that fills nothing is cancelled on the spot.
/// Responses are queued on the event channel, never delivered re-entrantly.
pub struct PaperGateway {
    config: PaperConfig,
    clock: Box<dyn Clock>,
    market: Box<dyn MarketView>,
    events: ChannelPublisher<PlatformEvent>,
    working: HashMap<OrderId, Working>,
    positions: HashMap<InstrumentId, Quantity>,
}

impl PaperGateway {
    pub fn new(
        config: PaperConfig,
        clock: Box<dyn Clock>,
        market: Box<dyn MarketView>,
        events: ChannelPublisher<PlatformEvent>,
    ) -> Self {
        Self {
            config,
            clock,
            market,
            events,
            working: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Effective position the gateway has built up for `instrument`
    pub fn position(&self, instrument: &InstrumentId) -> Quantity {
        self.positions.get(instrument).copied().unwrap_or(0)
    }

    /// Number of orders with an open remainder
    pub fn working_orders(&self) -> usize {
        self.working.len()
    }

    fn emit(&self, event: PlatformEvent) -> TransportResult<()> {
        self.events
            .send(event)
            .map_err(|_| TransportError::Disconnected)
    }

    fn status(&self, order: &Order, status: OrderStatus, filled: Quantity) -> TransportResult<()> {
        self.emit(PlatformEvent::OrderStatus(OrderStatusUpdate::new(
            order.id,
            order.instrument.clone(),
            status,
            filled,
            self.clock.now(),
        )))
    }

    fn done(&self, id: OrderId, instrument: &InstrumentId, reason: DoneReason, filled: Quantity) -> TransportResult<()> {
        self.emit(PlatformEvent::OrderStatus(OrderStatusUpdate::done(
            id,
            instrument.clone(),
            reason,
            filled,
            self.clock.now(),
        )))
    }

    fn fill_size(&self, desired: Quantity) -> Quantity {
        let ratio = self.config.fill_ratio.clamp(0.0, 1.0);
        ((desired as f64 * ratio).round() as Quantity).clamp(0, desired)
    }

    fn execution_price(&self, order: &Order) -> TransportResult<Price> {
        if !order.is_market() {
            return Ok(order.price);
        }
        self.market
            .reference_price(&order.instrument)
            .ok_or_else(|| TransportError::Rejected(format!("no market for {}", order.instrument)))
    }
}

impl OrderTransport for PaperGateway {
    fn send_order(&mut self, order: &Order) -> TransportResult<()> {
        if order.desired_size <= 0 {
            return Err(TransportError::Rejected(format!(
                "size {} must be positive",
                order.desired_size
            )));
        }
        if self.working.contains_key(&order.id) {
            return Err(TransportError::Rejected(format!("duplicate order id {}", order.id)));
        }
        let price = self.execution_price(order)?;

        self.status(order, OrderStatus::Transit, 0)?;
        self.status(order, OrderStatus::Open, 0)?;

        let filled = self.fill_size(order.desired_size);
        if filled > 0 {
            let now = self.clock.now();
            self.emit(PlatformEvent::Fill(FillReport {
                order_id: order.id,
                instrument: order.instrument.clone(),
                fill_size: filled,
                fill_price: price,
                fee: self.config.fee_per_share * Price::from(filled),
                timestamp: now,
            }))?;

            let position = self.positions.entry(order.instrument.clone()).or_insert(0);
            *position += order.side.position_sign() * filled;
            let effective_size = *position;
            self.emit(PlatformEvent::Position(PositionUpdate {
                instrument: order.instrument.clone(),
                effective_size,
                timestamp: now,
            }))?;
            debug!("paper fill {} {}@{} position={}", order.id, filled, price, effective_size);
        }

        if filled == order.desired_size {
            self.done(order.id, &order.instrument, DoneReason::Fill, filled)?;
        } else if filled == 0 && order.time_in_force.cancels_remainder() {
            self.done(order.id, &order.instrument, DoneReason::Cancel, 0)?;
        } else {
            self.working.insert(
                order.id,
                Working {
                    instrument: order.instrument.clone(),
                    filled,
                },
            );
        }
        Ok(())
    }

    fn send_cancel(&mut self, order: &Order) -> TransportResult<()> {
        let working = self
            .working
            .remove(&order.id)
            .ok_or(TransportError::UnknownOrder(order.id))?;

        info!("paper cancel {} remaining {}", order.id, order.desired_size - working.filled);
        self.done(order.id, &working.instrument, DoneReason::Cancel, working.filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::channel::ChannelSubscriber;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempo_core::{MarketDestination, OrderSpec, Side, TimeInForce, Timestamp};
    use tempo_ports::{BookLevel, TopOfBook};

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    struct FixedMarket(Option<Price>);

    impl MarketView for FixedMarket {
        fn reference_price(&self, _: &InstrumentId) -> Option<Price> {
            self.0
        }

        fn best_market(&self, _: &InstrumentId) -> Option<TopOfBook> {
            self.0.map(|p| TopOfBook::new(Some(BookLevel::new(p, 1)), Some(BookLevel::new(p, 1))))
        }
    }

    fn gateway(fill_ratio: f64, reference: Option<Price>) -> (PaperGateway, ChannelSubscriber<PlatformEvent>) {
        let (events, rx) = ChannelPublisher::pair();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let gateway = PaperGateway::new(
            PaperConfig {
                fill_ratio,
                ..PaperConfig::default()
            },
            Box::new(FixedClock(now)),
            Box::new(FixedMarket(reference)),
            events,
        );
        (gateway, rx)
    }

    fn order(id: u64, side: Side, price: Price, size: Quantity, tif: TimeInForce) -> Order {
        let spec = OrderSpec::limit("IF2403", side, price, size, tif, MarketDestination::new("CFFEX"));
        Order::new(OrderId(id), spec, Utc::now())
    }

    fn drain(rx: &mut ChannelSubscriber<PlatformEvent>) -> Vec<PlatformEvent> {
        use crate::transport::Subscriber;
        std::iter::from_fn(|| rx.try_next().ok().flatten()).collect()
    }

    #[test]
    fn test_full_fill_sequence() {
        let (mut gw, mut rx) = gateway(1.0, Some(dec!(100)));
        gw.send_order(&order(1, Side::Buy, dec!(0), 10, TimeInForce::Day)).unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], PlatformEvent::OrderStatus(u) if u.status == OrderStatus::Transit));
        assert!(matches!(&events[1], PlatformEvent::OrderStatus(u) if u.status == OrderStatus::Open));
        assert!(matches!(&events[2], PlatformEvent::Fill(f) if f.fill_size == 10 && f.fill_price == dec!(100)));
        assert!(matches!(&events[3], PlatformEvent::Position(p) if p.effective_size == 10));
        assert!(matches!(
            &events[4],
            PlatformEvent::OrderStatus(u) if u.done_reason == Some(DoneReason::Fill)
        ));
        assert_eq!(gw.working_orders(), 0);
    }

    #[test]
    fn test_partial_fill_leaves_remainder_until_cancel() {
        let (mut gw, mut rx) = gateway(0.6, None);
        let o = order(2, Side::Sell, dec!(95), 100, TimeInForce::Day);
        gw.send_order(&o).unwrap();

        let events = drain(&mut rx);
        assert!(matches!(&events[2], PlatformEvent::Fill(f) if f.fill_size == 60));
        assert!(matches!(&events[3], PlatformEvent::Position(p) if p.effective_size == -60));
        assert_eq!(gw.working_orders(), 1);

        gw.send_cancel(&o).unwrap();
        let events = drain(&mut rx);
        assert!(matches!(
            &events[..],
            [PlatformEvent::OrderStatus(u)] if u.done_reason == Some(DoneReason::Cancel) && u.filled_size == 60
        ));

        assert_eq!(gw.send_cancel(&o), Err(TransportError::UnknownOrder(OrderId(2))));
    }

    #[test]
    fn test_fill_carries_fee() {
        let (events, mut rx) = ChannelPublisher::pair();
        let mut gw = PaperGateway::new(
            PaperConfig {
                fill_ratio: 1.0,
                fee_per_share: dec!(0.25),
            },
            Box::new(FixedClock(Utc::now())),
            Box::new(FixedMarket(None)),
            events,
        );
        gw.send_order(&order(6, Side::Buy, dec!(100), 8, TimeInForce::Day)).unwrap();

        let events = drain(&mut rx);
        assert!(matches!(&events[2], PlatformEvent::Fill(f) if f.fee == dec!(2)));
    }

    #[test]
    fn test_unfilled_ioc_is_cancelled() {
        let (mut gw, mut rx) = gateway(0.0, None);
        gw.send_order(&order(3, Side::Buy, dec!(105), 5, TimeInForce::Ioc)).unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[2],
            PlatformEvent::OrderStatus(u) if u.done_reason == Some(DoneReason::Cancel)
        ));
        assert_eq!(gw.working_orders(), 0);
    }

    #[test]
    fn test_rejects() {
        let (mut gw, mut rx) = gateway(1.0, None);

        let zero = order(4, Side::Buy, dec!(100), 0, TimeInForce::Day);
        assert!(matches!(gw.send_order(&zero), Err(TransportError::Rejected(_))));

        // Market order without a reference price
        let market = order(5, Side::Buy, dec!(0), 10, TimeInForce::Day);
        assert!(matches!(gw.send_order(&market), Err(TransportError::Rejected(_))));

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_disconnected_when_loop_gone() {
        let (mut gw, rx) = gateway(1.0, None);
        drop(rx);
        let o = order(6, Side::Buy, dec!(100), 1, TimeInForce::Day);
        assert_eq!(gw.send_order(&o), Err(TransportError::Disconnected));
    }
}
