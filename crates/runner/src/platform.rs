//! Platform capabilities handed to the strategy
//!
//! Everything here lives on the event-loop thread. The loop and the
//! strategy share each piece through `Rc<RefCell<_>>`; a borrow is never
//! held across a strategy callback.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use log::debug;
use tempo_clock::{SimClock, SystemClock, TimerQueue};
use tempo_core::{AccountId, InstrumentId, Price, Timestamp};
use tempo_gateway::{BookChange, ChannelPublisher, ChannelSubscriber, PaperConfig, PaperGateway, PlatformEvent};
use tempo_ports::{
    Clock, MarketView, SessionControl, SubscriptionId, SubscriptionRegistrar, TimerFired, TimerId, TimerService, TopOfBook, Topic,
};
use tempo_strategy::TradingContext;

use crate::config::RunMode;

/// Live subscriptions, keyed by handle
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<SubscriptionId, Topic>,
    next_id: u64,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is at least one subscription for `topic` live?
    pub fn is_routed(&self, topic: &Topic) -> bool {
        self.routes.values().any(|t| t == topic)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl SubscriptionRegistrar for RouteTable {
    fn subscribe(&mut self, topic: Topic) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        debug!("route {} -> {}", id, topic);
        self.routes.insert(id, topic);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.routes.remove(&id) {
            Some(topic) => {
                debug!("route {} removed ({})", id, topic);
                true
            }
            None => false,
        }
    }
}

/// Route table handle given to the strategy
#[derive(Debug, Clone, Default)]
pub struct SharedRoutes(Rc<RefCell<RouteTable>>);

impl SharedRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_routed(&self, topic: &Topic) -> bool {
        self.0.borrow().is_routed(topic)
    }

    pub fn live(&self) -> usize {
        self.0.borrow().len()
    }
}

impl SubscriptionRegistrar for SharedRoutes {
    fn subscribe(&mut self, topic: Topic) -> SubscriptionId {
        self.0.borrow_mut().subscribe(topic)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.0.borrow_mut().unsubscribe(id)
    }
}

/// Timer queue handle given to the strategy
#[derive(Clone, Default)]
pub struct SharedTimers(Rc<RefCell<TimerQueue>>);

impl SharedTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.0.borrow().next_deadline()
    }

    /// Pop one timer due at or before `now`
    pub fn pop_due(&self, now: Timestamp) -> Option<TimerFired> {
        self.0.borrow_mut().pop_due(now)
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().len()
    }
}

impl TimerService for SharedTimers {
    fn schedule_once(&mut self, at: Timestamp) -> TimerId {
        self.0.borrow_mut().schedule_once(at)
    }

    fn schedule_periodic(&mut self, first: Timestamp, interval: Duration, until: Timestamp) -> TimerId {
        self.0.borrow_mut().schedule_periodic(first, interval, until)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.0.borrow_mut().cancel(id)
    }
}

#[derive(Debug, Default)]
struct BookState {
    top: TopOfBook,
    last_trade: Option<Price>,
}

/// Latest top of book and trade price per instrument, fed by the event loop
#[derive(Debug, Default)]
pub struct BookCache {
    books: HashMap<InstrumentId, BookState>,
}

impl BookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_book(&mut self, change: &BookChange) {
        self.books.entry(change.instrument.clone()).or_default().top = change.top;
    }

    pub fn apply_trade(&mut self, instrument: &InstrumentId, price: Price) {
        self.books.entry(instrument.clone()).or_default().last_trade = Some(price);
    }

    /// Clear the book but keep the last trade
    pub fn flush(&mut self, instrument: &InstrumentId) {
        if let Some(state) = self.books.get_mut(instrument) {
            state.top = TopOfBook::default();
        }
    }
}

impl MarketView for BookCache {
    /// Midpoint, or the last trade while the book is one-sided
    fn reference_price(&self, instrument: &InstrumentId) -> Option<Price> {
        let state = self.books.get(instrument)?;
        state.top.mid_price().or(state.last_trade)
    }

    fn best_market(&self, instrument: &InstrumentId) -> Option<TopOfBook> {
        self.books.get(instrument).map(|state| state.top)
    }
}

/// Book cache handle shared by the strategy and the paper gateway
#[derive(Debug, Clone, Default)]
pub struct SharedBooks(Rc<RefCell<BookCache>>);

impl SharedBooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_book(&self, change: &BookChange) {
        self.0.borrow_mut().apply_book(change);
    }

    pub fn apply_trade(&self, instrument: &InstrumentId, price: Price) {
        self.0.borrow_mut().apply_trade(instrument, price);
    }

    pub fn flush(&self, instrument: &InstrumentId) {
        self.0.borrow_mut().flush(instrument);
    }
}

impl MarketView for SharedBooks {
    fn reference_price(&self, instrument: &InstrumentId) -> Option<Price> {
        self.0.borrow().reference_price(instrument)
    }

    fn best_market(&self, instrument: &InstrumentId) -> Option<TopOfBook> {
        self.0.borrow().best_market(instrument)
    }
}

/// Exit request raised by the strategy, polled by the loop
#[derive(Debug, Clone, Default)]
pub struct ExitFlag(Rc<Cell<bool>>);

impl ExitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl SessionControl for ExitFlag {
    fn request_exit(&mut self) {
        self.0.set(true);
    }

    fn exit_requested(&self) -> bool {
        self.0.get()
    }
}

/// Every platform piece of one session, before the loop takes ownership
///
/// The strategy receives handles through [`Platform::trading_context`]; the
/// event loop keeps the other end of each.
pub struct Platform {
    pub(crate) mode: RunMode,
    pub(crate) clock: Rc<dyn Clock>,
    pub(crate) sim_clock: Option<Rc<SimClock>>,
    pub(crate) routes: SharedRoutes,
    pub(crate) timers: SharedTimers,
    pub(crate) books: SharedBooks,
    pub(crate) exit: ExitFlag,
    pub(crate) gateway_tx: ChannelPublisher<PlatformEvent>,
    pub(crate) gateway_rx: ChannelSubscriber<PlatformEvent>,
    pub(crate) control_tx: ChannelPublisher<PlatformEvent>,
    pub(crate) control_rx: ChannelSubscriber<PlatformEvent>,
}

impl Platform {
    /// Simulated time starting at `start`
    pub fn replay(start: Timestamp) -> Self {
        let sim = Rc::new(SimClock::new(start));
        Self::with_clock(RunMode::Replay, sim.clone(), Some(sim))
    }

    /// Wall time
    pub fn live() -> Self {
        Self::with_clock(RunMode::Live, Rc::new(SystemClock::new()), None)
    }

    fn with_clock(mode: RunMode, clock: Rc<dyn Clock>, sim_clock: Option<Rc<SimClock>>) -> Self {
        let (gateway_tx, gateway_rx) = ChannelPublisher::pair();
        let (control_tx, control_rx) = ChannelPublisher::pair();
        Self {
            mode,
            clock,
            sim_clock,
            routes: SharedRoutes::new(),
            timers: SharedTimers::new(),
            books: SharedBooks::new(),
            exit: ExitFlag::new(),
            gateway_tx,
            gateway_rx,
            control_tx,
            control_rx,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    /// Publisher for operator inputs (console, signals, tests)
    pub fn control_publisher(&self) -> ChannelPublisher<PlatformEvent> {
        self.control_tx.clone()
    }

    /// Capabilities for the strategy, with orders routed to a paper gateway
    pub fn trading_context(&self, account: AccountId, session_date: NaiveDate, paper: PaperConfig) -> TradingContext {
        let gateway = PaperGateway::new(
            paper,
            Box::new(self.clock.clone()),
            Box::new(self.books.clone()),
            self.gateway_tx.clone(),
        );

        TradingContext {
            account,
            session_date,
            clock: self.clock.clone(),
            transport: Box::new(gateway),
            timers: Box::new(self.timers.clone()),
            registrar: Box::new(self.routes.clone()),
            market: Box::new(self.books.clone()),
            control: Box::new(self.exit.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempo_ports::BookLevel;

    fn change(bid: Option<(Price, i64)>, ask: Option<(Price, i64)>) -> BookChange {
        BookChange {
            instrument: InstrumentId::new("IF2403"),
            bid_level_changed: Some(0),
            ask_level_changed: Some(0),
            top: TopOfBook::new(
                bid.map(|(p, s)| BookLevel::new(p, s)),
                ask.map(|(p, s)| BookLevel::new(p, s)),
            ),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_routes_follow_live_subscriptions() {
        let mut routes = SharedRoutes::new();
        let topic = Topic::Ticks(InstrumentId::new("IF2403"));

        let a = routes.subscribe(topic.clone());
        let b = routes.subscribe(topic.clone());
        assert!(routes.is_routed(&topic));

        assert!(routes.unsubscribe(a));
        assert!(routes.is_routed(&topic));
        assert!(routes.unsubscribe(b));
        assert!(!routes.is_routed(&topic));
        assert!(!routes.unsubscribe(b));
        assert_eq!(routes.live(), 0);
    }

    #[test]
    fn test_reference_price_prefers_mid() {
        let books = SharedBooks::new();
        let id = InstrumentId::new("IF2403");

        assert_eq!(books.reference_price(&id), None);

        books.apply_trade(&id, dec!(101));
        assert_eq!(books.reference_price(&id), Some(dec!(101)));

        books.apply_book(&change(Some((dec!(99), 5)), Some((dec!(100), 7))));
        assert_eq!(books.reference_price(&id), Some(dec!(99.5)));

        books.apply_book(&change(Some((dec!(99), 5)), None));
        assert_eq!(books.reference_price(&id), Some(dec!(101)));
    }

    #[test]
    fn test_flush_clears_top_of_book() {
        let books = SharedBooks::new();
        let id = InstrumentId::new("IF2403");
        books.apply_book(&change(Some((dec!(99), 5)), Some((dec!(100), 7))));

        books.flush(&id);
        assert_eq!(books.best_market(&id), Some(TopOfBook::default()));
        assert_eq!(books.reference_price(&id), None);
    }

    #[test]
    fn test_exit_flag_is_shared() {
        let flag = ExitFlag::new();
        let mut handle = flag.clone();
        assert!(!flag.is_set());

        handle.request_exit();
        assert!(flag.is_set());
        assert!(handle.exit_requested());
    }
}
