//! Strategy trait
//!
//! The event loop hands each platform event to the strategy, one at a time.
//! Handlers run to completion and never suspend.

use tempo_core::InstrumentId;
use tempo_gateway::{BookChange, FillReport, OrderStatusUpdate, PositionUpdate, ProcessSignal, TradeTick, UserMessage};
use tempo_ports::TimerFired;

/// Strategy trait - implement this for your trading strategy
pub trait Strategy {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Called on every trade print
    fn on_tick(&mut self, _instrument: &InstrumentId, _tick: &TradeTick) {}

    /// Called on the opening print; treated as a normal tick by default
    fn on_open_tick(&mut self, instrument: &InstrumentId, tick: &TradeTick) {
        self.on_tick(instrument, tick);
    }

    /// Called when the top of book changes
    fn on_book_changed(&mut self, _change: &BookChange) {}

    /// Called when the book is cleared by the feed
    fn on_book_flushed(&mut self, _instrument: &InstrumentId) {}

    /// Called when an own order changes status
    fn on_order_status(&mut self, _update: &OrderStatusUpdate) {}

    /// Called on each execution of an own order
    fn on_fill(&mut self, _fill: &FillReport) {}

    /// Called when the account's effective position changes
    fn on_position_changed(&mut self, _update: &PositionUpdate) {}

    /// Called when a timer scheduled by the strategy fires
    fn on_timer(&mut self, _fired: &TimerFired) {}

    /// Called for operator commands once subscribed
    fn on_user_message(&mut self, _message: &UserMessage) {}

    /// Called on process interrupt / terminate
    fn on_signal(&mut self, _signal: ProcessSignal) {}
}
