//! Trading-window strategy
//!
//! Arms itself on the first tick inside `[start, end)` and disarms on the
//! first tick at or after `end`. While armed it sends:
//! - one market buy batch at the entry time
//! - one discounted sell batch at the exit time, sized to the ledger position
//! - an aggressive IOC buy per instrument on every hourly timer
//! - one short/buy pair on the first top-of-book change
//!
//! Every trigger owns exactly one gating flag, so they never suppress each
//! other.

use std::rc::Rc;

use chrono::Duration;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempo_clock::TradingWindow;
use tempo_core::{
    AccountId, InstrumentId, InstrumentSet, MarketDestination, OrderId, OrderSpec, Price, Quantity,
    Side, TimeInForce, Timestamp, UserCommand,
};
use tempo_gateway::{BookChange, FillReport, OrderStatusUpdate, PositionUpdate, ProcessSignal, TradeTick, UserMessage};
use tempo_order_manager::{OrderManager, PositionLedger};
use tempo_ports::{
    Clock, MarketView, SessionControl, SubscriptionId, TimerEvent, TimerFired, TimerId, TimerService,
    Topic,
};

use crate::commands::CommandPolarity;
use crate::context::TradingContext;
use crate::settings::{Result, StrategySettings};
use crate::shutdown::{ShutdownAction, ShutdownController, ShutdownState};
use crate::strategy::Strategy;
use crate::subscriptions::SubscriptionRegistry;

/// Exit orders are priced below the reference to make sure they execute
const EXIT_DISCOUNT: Decimal = dec!(0.95);
/// Hourly buys are priced above the reference
const HOURLY_PREMIUM: Decimal = dec!(1.05);

pub struct WindowStrategy {
    account: AccountId,
    instruments: InstrumentSet,
    destination: MarketDestination,
    shares: Quantity,
    window: TradingWindow,
    polarity: CommandPolarity,

    clock: Rc<dyn Clock>,
    market: Box<dyn MarketView>,
    control: Box<dyn SessionControl>,
    timers: Box<dyn TimerService>,

    orders: OrderManager,
    positions: PositionLedger,
    subscriptions: SubscriptionRegistry,
    shutdown: ShutdownController,

    pre_warning_timer: TimerId,
    hourly_timer: TimerId,
    user_messages: Option<SubscriptionId>,

    trade: bool,
    /// Set by an as-named SEND_NOTHING; ticks cannot re-arm trading until
    /// ALLOW_SENDING clears it
    sending_frozen: bool,
    entry_orders_sent: bool,
    exit_orders_sent: bool,
    /// Book reaction latch; set once for the lifetime of this instance
    book_reaction_sent: bool,
}

impl WindowStrategy {
    /// Build the strategy and register every listener and timer it needs.
    ///
    /// Settings are validated here; an error means the session must not
    /// start.
    pub fn new(settings: &StrategySettings, ctx: TradingContext) -> Result<Self> {
        settings.validate()?;
        let window = settings.trading_window(ctx.session_date)?;
        let instruments = settings.instrument_set();

        let TradingContext {
            account,
            clock,
            transport,
            mut timers,
            registrar,
            market,
            control,
            ..
        } = ctx;

        let mut subscriptions = SubscriptionRegistry::new(registrar);
        for instrument in instruments.iter() {
            subscriptions.subscribe(Topic::Book(instrument.clone()));
            subscriptions.subscribe(Topic::Ticks(instrument.clone()));
            subscriptions.subscribe(Topic::OrderStatus(instrument.clone()));
            subscriptions.subscribe(Topic::Position(instrument.clone()));
        }

        let pre_warning_timer = timers.schedule_once(window.pre_warning());
        subscriptions.track_timer(pre_warning_timer);
        let hourly_timer = timers.schedule_periodic(window.pre_warning(), Duration::hours(1), window.end());
        subscriptions.track_timer(hourly_timer);

        info!(
            "window strategy for account {} on {} ({} instruments, {} shares)",
            account,
            window,
            instruments.len(),
            settings.shares
        );

        Ok(Self {
            account,
            instruments,
            destination: settings.destination(),
            shares: settings.shares,
            window,
            polarity: settings.command_polarity,
            orders: OrderManager::new(transport, Box::new(clock.clone())),
            clock,
            market,
            control,
            timers,
            positions: PositionLedger::new(),
            subscriptions,
            shutdown: ShutdownController::new(settings.shutdown_delay()),
            pre_warning_timer,
            hourly_timer,
            user_messages: None,
            trade: false,
            sending_frozen: false,
            entry_orders_sent: false,
            exit_orders_sent: false,
            book_reaction_sent: false,
        })
    }

    /// Opt into the operator command channel
    pub fn subscribe_user_messages(&mut self) -> SubscriptionId {
        if let Some(id) = self.user_messages {
            return id;
        }
        let id = self.subscriptions.subscribe(Topic::UserMessages);
        self.user_messages = Some(id);
        id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn instruments(&self) -> &InstrumentSet {
        &self.instruments
    }

    pub fn window(&self) -> &TradingWindow {
        &self.window
    }

    pub fn is_trading(&self) -> bool {
        self.trade
    }

    pub fn is_sending_frozen(&self) -> bool {
        self.sending_frozen
    }

    pub fn entry_orders_sent(&self) -> bool {
        self.entry_orders_sent
    }

    pub fn exit_orders_sent(&self) -> bool {
        self.exit_orders_sent
    }

    pub fn book_reaction_sent(&self) -> bool {
        self.book_reaction_sent
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    pub fn shutdown_state(&self) -> ShutdownState {
        self.shutdown.state()
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Enter the graceful shutdown path
    pub fn request_shutdown(&mut self) -> ShutdownAction {
        let now = self.clock.now();
        let action = self
            .shutdown
            .request(now, self.timers.as_mut(), self.control.as_mut());
        match action {
            ShutdownAction::Scheduled { timer, .. } => self.subscriptions.track_timer(timer),
            ShutdownAction::ExitNow { cancelled } => {
                self.subscriptions.untrack_timer(cancelled);
            }
            ShutdownAction::Ignored => {}
        }
        action
    }

    fn update_trade_flag(&mut self, t: Timestamp) {
        if self.window.is_at_or_after_end(t) {
            if self.trade {
                info!("trading window closed at {}", t);
            }
            self.trade = false;
        } else if !self.trade && !self.sending_frozen && !self.window.is_before_start(t) {
            info!("trading window open at {}", t);
            self.trade = true;
        }
    }

    fn send(&mut self, spec: OrderSpec) -> Option<OrderId> {
        // Failures are logged by the order manager and never retried
        self.orders.send_order(spec).ok()
    }

    fn send_entry_orders(&mut self) {
        info!("sending entry orders");
        for instrument in self.instruments.clone().iter() {
            let spec = OrderSpec::market(
                instrument,
                Side::Buy,
                self.shares,
                TimeInForce::Day,
                self.destination.clone(),
            );
            self.send(spec);
        }
    }

    fn send_exit_orders(&mut self) {
        info!("sending exit orders");
        for instrument in self.instruments.clone().iter() {
            let position = self.positions.get(instrument);
            if position <= 0 {
                info!("no long position in {} ({}), nothing to exit", instrument, position);
                continue;
            }
            let Some(reference) = self.market.reference_price(instrument) else {
                warn!("no reference price for {}, exit order not sent", instrument);
                continue;
            };
            let spec = OrderSpec::limit(
                instrument,
                Side::Sell,
                reference * EXIT_DISCOUNT,
                position,
                TimeInForce::Day,
                self.destination.clone(),
            );
            self.send(spec);
        }
    }

    fn on_hourly(&mut self, at: Timestamp) {
        info!("The time is now: {}", at);
        if !self.trade {
            return;
        }
        for instrument in self.instruments.clone().iter() {
            let reference = self.market.reference_price(instrument);
            self.log_pnl(instrument, reference);
            let Some(reference) = reference else {
                warn!("no reference price for {}, hourly order not sent", instrument);
                continue;
            };
            let spec = OrderSpec::limit(
                instrument,
                Side::Buy,
                reference * HOURLY_PREMIUM,
                self.shares,
                TimeInForce::Ioc,
                self.destination.clone(),
            );
            self.send(spec);
        }
    }

    fn log_pnl(&self, instrument: &InstrumentId, reference: Option<Price>) {
        let pnl = self.orders.pnl().position(instrument);
        let position = self.positions.get(instrument);
        match reference {
            Some(price) => info!(
                "{} position {}: realized PnL {} unrealized PnL {} net PnL {} fees {}",
                instrument,
                position,
                pnl.realized_pnl,
                pnl.unrealized_pnl(price),
                pnl.net_pnl(price),
                pnl.fees
            ),
            None => info!(
                "{} position {}: realized PnL {} fees {} (no reference price)",
                instrument, position, pnl.realized_pnl, pnl.fees
            ),
        }
    }
}

impl Strategy for WindowStrategy {
    fn name(&self) -> &str {
        "window"
    }

    fn on_tick(&mut self, instrument: &InstrumentId, tick: &TradeTick) {
        let t = tick.msg_time;
        debug!("tick {} {}x{} at {}", instrument, tick.size, tick.price, t);

        self.update_trade_flag(t);
        if !self.trade {
            return;
        }

        if self.window.is_entry_due(t) && !self.entry_orders_sent {
            self.entry_orders_sent = true;
            self.send_entry_orders();
        }
        if self.window.is_exit_due(t) && !self.exit_orders_sent {
            self.exit_orders_sent = true;
            self.send_exit_orders();
        }
    }

    fn on_open_tick(&mut self, instrument: &InstrumentId, tick: &TradeTick) {
        info!("Received an opening tick for {} {}", instrument, tick.price);
        self.on_tick(instrument, tick);
    }

    fn on_book_changed(&mut self, change: &BookChange) {
        if !self.trade || self.book_reaction_sent || !change.top_changed() {
            return;
        }
        let (Some(bid), Some(ask)) = (change.top.bid, change.top.ask) else {
            debug!("one-sided book for {}, no reaction", change.instrument);
            return;
        };
        self.book_reaction_sent = true;

        info!(
            "L1 update -- time:{} instr:{} bid_sz:{} bid_px:{} ask_px:{} ask_sz:{}",
            change.timestamp, change.instrument, bid.size, bid.price, ask.price, ask.size
        );

        let short = OrderSpec::limit(
            &change.instrument,
            Side::Short,
            bid.price,
            bid.size,
            TimeInForce::Day,
            self.destination.clone(),
        );
        self.send(short);

        let buy = OrderSpec::limit(
            &change.instrument,
            Side::Buy,
            ask.price,
            ask.size,
            TimeInForce::Day,
            self.destination.clone(),
        );
        self.send(buy);
    }

    fn on_book_flushed(&mut self, instrument: &InstrumentId) {
        debug!("book flushed for {}", instrument);
    }

    fn on_order_status(&mut self, update: &OrderStatusUpdate) {
        info!("OSC-- oid {}: {}", update.order_id, update.status);
        if let Err(e) = self.orders.on_status_change(update) {
            debug!("status update not applied: {}", e);
        }
    }

    fn on_fill(&mut self, fill: &FillReport) {
        if let Err(e) = self.orders.on_fill(fill) {
            debug!("fill not applied: {}", e);
        }
    }

    fn on_position_changed(&mut self, update: &PositionUpdate) {
        info!("onPosUpd: {}: {}", update.instrument, update.effective_size);
        self.positions
            .on_position_changed(&update.instrument, update.effective_size);
    }

    fn on_timer(&mut self, fired: &TimerFired) {
        if self.shutdown.on_timer(fired, self.control.as_mut()) {
            self.subscriptions.untrack_timer(fired.id);
            return;
        }

        if fired.id == self.pre_warning_timer {
            self.subscriptions.untrack_timer(fired.id);
            info!("It's {}. Time to start wrapping things up?", fired.at);
        } else if fired.id == self.hourly_timer {
            match fired.event {
                TimerEvent::Fire => self.on_hourly(fired.at),
                TimerEvent::Done => {
                    self.subscriptions.untrack_timer(fired.id);
                    info!("The periodic timer has completed at: {}", fired.at);
                }
            }
        } else {
            debug!("ignoring unknown {}", fired.id);
        }
    }

    fn on_user_message(&mut self, message: &UserMessage) {
        if !message.recipient.includes(self.account) {
            debug!(
                "ignoring {} addressed to {:?} (account {})",
                message.command, message.recipient, self.account
            );
            return;
        }
        info!("user message: {}", message.command);

        match &message.command {
            UserCommand::Shutdown => {
                self.request_shutdown();
            }
            UserCommand::GetFlat => {
                let open: Vec<String> = self
                    .positions
                    .open_positions()
                    .map(|(instrument, size)| format!("{instrument}={size}"))
                    .collect();
                warn!("FLATTENING ALL POSITIONS requested; open: [{}]", open.join(", "));
            }
            command @ (UserCommand::SendNothing | UserCommand::AllowSending) => {
                if let Some(flag) = self.polarity.trade_flag_for(command) {
                    if self.polarity == CommandPolarity::Legacy {
                        warn!("Received {}, legacy mapping sets trading={}", command, flag);
                    } else {
                        self.sending_frozen = !flag;
                        warn!("Received {}, trading={} frozen={}", command, flag, self.sending_frozen);
                    }
                    self.trade = flag;
                }
            }
            UserCommand::Unknown(raw) => {
                warn!("Unhandled user message command: {}", raw);
            }
        }
    }

    fn on_signal(&mut self, signal: ProcessSignal) {
        warn!("received {}", signal);
        self.request_shutdown();
    }
}

impl Drop for WindowStrategy {
    fn drop(&mut self) {
        let released = self.subscriptions.release_all(self.timers.as_mut());
        info!(
            "Destructing strategy: released {} registrations, {}",
            released,
            self.orders.stats()
        );
    }
}
