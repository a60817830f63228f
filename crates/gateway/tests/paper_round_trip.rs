//! Integration test: order transport -> paper gateway -> event channel
//!
//! The gateway is driven through the `OrderTransport` port exactly as the
//! order manager drives it, and its responses are read back asynchronously.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use tempo_core::{DoneReason, InstrumentId, MarketDestination, Order, OrderId, OrderSpec, Price, Side, TimeInForce, Timestamp};
use tempo_gateway::{ChannelPublisher, PaperConfig, PaperGateway, PlatformEvent, Subscriber};
use tempo_ports::{BookLevel, Clock, MarketView, OrderTransport, TopOfBook};

struct StepClock(Cell<Timestamp>);

impl Clock for StepClock {
    fn now(&self) -> Timestamp {
        self.0.get()
    }
}

struct Book;

impl MarketView for Book {
    fn reference_price(&self, _: &InstrumentId) -> Option<Price> {
        Some(dec!(3500))
    }

    fn best_market(&self, _: &InstrumentId) -> Option<TopOfBook> {
        Some(TopOfBook::new(
            Some(BookLevel::new(dec!(3499), 4)),
            Some(BookLevel::new(dec!(3501), 6)),
        ))
    }
}

#[tokio::test]
async fn test_positions_accumulate_across_orders() {
    let _ = env_logger::try_init();

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let clock = Rc::new(StepClock(Cell::new(start)));
    let (events, mut rx) = ChannelPublisher::pair();
    let mut gateway = PaperGateway::new(
        PaperConfig::default(),
        Box::new(clock.clone()),
        Box::new(Book),
        events,
    );

    let dest = MarketDestination::new("CFFEX");
    let buy = Order::new(
        OrderId(1),
        OrderSpec::market("IF2403", Side::Buy, 10, TimeInForce::Day, dest.clone()),
        start,
    );
    gateway.send_order(&buy).unwrap();

    clock.0.set(start + Duration::hours(1));
    let sell = Order::new(
        OrderId(2),
        OrderSpec::limit("IF2403", Side::Sell, dec!(3325), 4, TimeInForce::Day, dest),
        clock.now(),
    );
    gateway.send_order(&sell).unwrap();
    drop(gateway);

    let mut positions = Vec::new();
    let mut fills = Vec::new();
    let mut done = Vec::new();
    while let Some(event) = rx.next().await {
        match event {
            PlatformEvent::Position(update) => positions.push((update.effective_size, update.timestamp)),
            PlatformEvent::Fill(fill) => fills.push((fill.order_id, fill.fill_price)),
            PlatformEvent::OrderStatus(update) if update.done_reason.is_some() => {
                done.push((update.order_id, update.done_reason))
            }
            _ => {}
        }
    }

    assert_eq!(positions, vec![(10, start), (6, start + Duration::hours(1))]);
    assert_eq!(fills, vec![(OrderId(1), dec!(3500)), (OrderId(2), dec!(3325))]);
    assert_eq!(
        done,
        vec![
            (OrderId(1), Some(DoneReason::Fill)),
            (OrderId(2), Some(DoneReason::Fill)),
        ]
    );
}
