//! Single-threaded event loop
//!
//! One strategy, one thread. Inputs are taken in this order:
//!
//! 1. responses queued by the order gateway during the previous handler
//! 2. timers due before the next event's time
//! 3. operator inputs (console, signals)
//! 4. the market data feed
//!
//! In replay mode the simulated clock jumps to each event's timestamp
//! after the timers due before it have fired. In live mode timers are
//! awaited against the wall clock.

use std::rc::Rc;

use log::{debug, info};
use tempo_clock::SimClock;
use tempo_core::Timestamp;
use tempo_gateway::{ChannelSubscriber, PlatformEvent, Subscriber};
use tempo_ports::{Clock, TimerFired, Topic};
use tempo_strategy::Strategy;

use crate::config::RunMode;
use crate::feed::EventSource;
use crate::platform::{ExitFlag, Platform, SharedBooks, SharedRoutes, SharedTimers};

/// Event counts for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub book_changes: u64,
    pub book_flushes: u64,
    pub order_updates: u64,
    pub fills: u64,
    pub position_updates: u64,
    pub user_messages: u64,
    pub signals: u64,
    pub timers_fired: u64,
    /// Events dropped for lack of a live subscription
    pub unrouted: u64,
    /// The strategy asked the loop to stop
    pub exit_requested: bool,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ticks={} books={} flushes={} order_updates={} fills={} positions={} commands={} signals={} timers={} unrouted={} exit_requested={}",
            self.ticks,
            self.book_changes,
            self.book_flushes,
            self.order_updates,
            self.fills,
            self.position_updates,
            self.user_messages,
            self.signals,
            self.timers_fired,
            self.unrouted,
            self.exit_requested
        )
    }
}

enum Input {
    Event(PlatformEvent),
    TimerDue,
    FeedEnded,
}

pub struct EventLoop<S: Strategy> {
    strategy: S,
    mode: RunMode,
    clock: Rc<dyn Clock>,
    sim_clock: Option<Rc<SimClock>>,
    routes: SharedRoutes,
    timers: SharedTimers,
    books: SharedBooks,
    exit: ExitFlag,
    gateway: ChannelSubscriber<PlatformEvent>,
    control: ChannelSubscriber<PlatformEvent>,
    /// Feed event waiting for earlier timers to fire
    pending: Option<PlatformEvent>,
    summary: SessionSummary,
}

impl<S: Strategy> EventLoop<S> {
    pub fn new(platform: Platform, strategy: S) -> Self {
        Self {
            strategy,
            mode: platform.mode,
            clock: platform.clock,
            sim_clock: platform.sim_clock,
            routes: platform.routes,
            timers: platform.timers,
            books: platform.books,
            exit: platform.exit,
            gateway: platform.gateway_rx,
            control: platform.control_rx,
            pending: None,
            summary: SessionSummary::default(),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Run until the strategy requests an exit or the feed is exhausted
    pub async fn run(&mut self, feed: &mut dyn EventSource) -> SessionSummary {
        info!(
            "{} session started: strategy {}, feed {}, clock {}",
            self.mode,
            self.strategy.name(),
            feed.name(),
            self.clock.name()
        );

        loop {
            if self.exit.is_set() {
                info!("exit requested, stopping event loop");
                break;
            }
            if self.dispatch_gateway_event() {
                continue;
            }

            if let Some(event) = self.pending.take() {
                let at = self.event_time(&event);
                if let Some(fired) = self.timers.pop_due(at) {
                    self.pending = Some(event);
                    self.fire(fired);
                    continue;
                }
                if let Some(sim) = &self.sim_clock {
                    sim.advance_to(at);
                }
                self.dispatch(event);
                continue;
            }

            let timer_wait = self.live_timer_wait();
            let input = tokio::select! {
                biased;
                Some(event) = self.control.recv() => Input::Event(event),
                _ = tokio::time::sleep(timer_wait.unwrap_or_default()), if timer_wait.is_some() => Input::TimerDue,
                event = feed.next_event() => event.map_or(Input::FeedEnded, Input::Event),
            };

            match input {
                Input::Event(event) => self.pending = Some(event),
                Input::TimerDue => {
                    if let Some(fired) = self.timers.pop_due(self.clock.now()) {
                        self.fire(fired);
                    }
                }
                Input::FeedEnded => {
                    info!("feed {} exhausted", feed.name());
                    if self.mode == RunMode::Replay {
                        self.flush_timers();
                    }
                    break;
                }
            }
        }

        self.summary.exit_requested = self.exit.is_set();
        info!("session finished at {}: {}", self.clock.now(), self.summary);
        self.summary.clone()
    }

    /// Tear down the strategy and report what it left behind
    pub fn finish(self) -> SessionSummary {
        let EventLoop {
            strategy,
            routes,
            timers,
            summary,
            ..
        } = self;
        drop(strategy);
        info!(
            "strategy released: {} live subscriptions, {} pending timers",
            routes.live(),
            timers.pending()
        );
        summary
    }

    /// Fire the remaining timers in time order, after the feed has ended
    fn flush_timers(&mut self) {
        while !self.exit.is_set() {
            if self.dispatch_gateway_event() {
                continue;
            }
            let Some(due) = self.timers.next_deadline() else {
                break;
            };
            if let Some(fired) = self.timers.pop_due(due) {
                self.fire(fired);
            }
        }
    }

    fn dispatch_gateway_event(&mut self) -> bool {
        match self.gateway.try_next() {
            Ok(Some(event)) => {
                self.dispatch(event);
                true
            }
            _ => false,
        }
    }

    fn event_time(&self, event: &PlatformEvent) -> Timestamp {
        let now = self.clock.now();
        match self.mode {
            RunMode::Replay => event.timestamp().map_or(now, |at| at.max(now)),
            RunMode::Live => now,
        }
    }

    fn live_timer_wait(&self) -> Option<std::time::Duration> {
        if self.mode != RunMode::Live {
            return None;
        }
        let due = self.timers.next_deadline()?;
        Some((due - self.clock.now()).to_std().unwrap_or_default())
    }

    fn fire(&mut self, fired: TimerFired) {
        if let Some(sim) = &self.sim_clock {
            sim.advance_to(fired.at);
        }
        self.summary.timers_fired += 1;
        debug!("{} {:?} at {}", fired.id, fired.event, fired.at);
        self.strategy.on_timer(&fired);
    }

    fn routed(&mut self, topic: Topic) -> bool {
        if self.routes.is_routed(&topic) {
            return true;
        }
        self.summary.unrouted += 1;
        debug!("no live subscription for {}", topic);
        false
    }

    fn dispatch(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Tick {
                instrument,
                tick,
                opening,
            } => {
                self.summary.ticks += 1;
                self.books.apply_trade(&instrument, tick.price);
                if self.routed(Topic::Ticks(instrument.clone())) {
                    if opening {
                        self.strategy.on_open_tick(&instrument, &tick);
                    } else {
                        self.strategy.on_tick(&instrument, &tick);
                    }
                }
            }
            PlatformEvent::Book(change) => {
                self.summary.book_changes += 1;
                self.books.apply_book(&change);
                if self.routed(Topic::Book(change.instrument.clone())) {
                    self.strategy.on_book_changed(&change);
                }
            }
            PlatformEvent::BookFlushed { instrument, .. } => {
                self.summary.book_flushes += 1;
                self.books.flush(&instrument);
                if self.routed(Topic::Book(instrument.clone())) {
                    self.strategy.on_book_flushed(&instrument);
                }
            }
            PlatformEvent::OrderStatus(update) => {
                self.summary.order_updates += 1;
                if self.routed(Topic::OrderStatus(update.instrument.clone())) {
                    self.strategy.on_order_status(&update);
                }
            }
            PlatformEvent::Fill(fill) => {
                self.summary.fills += 1;
                if self.routed(Topic::OrderStatus(fill.instrument.clone())) {
                    self.strategy.on_fill(&fill);
                }
            }
            PlatformEvent::Position(update) => {
                self.summary.position_updates += 1;
                if self.routed(Topic::Position(update.instrument.clone())) {
                    self.strategy.on_position_changed(&update);
                }
            }
            PlatformEvent::UserMessage(message) => {
                self.summary.user_messages += 1;
                if self.routed(Topic::UserMessages) {
                    self.strategy.on_user_message(&message);
                }
            }
            // Process-level, never filtered
            PlatformEvent::Signal { signal } => {
                self.summary.signals += 1;
                self.strategy.on_signal(signal);
            }
        }
    }
}
