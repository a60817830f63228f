//! Capabilities handed to the strategy at construction

use std::rc::Rc;

use chrono::NaiveDate;
use tempo_core::AccountId;
use tempo_ports::{Clock, MarketView, OrderTransport, SessionControl, SubscriptionRegistrar, TimerService};

/// Everything the strategy may touch on the platform
///
/// The strategy never reaches the platform any other way: each capability
/// is an injected trait object, so tests can substitute recording mocks.
pub struct TradingContext {
    pub account: AccountId,
    /// Calendar date the window times are applied to
    pub session_date: NaiveDate,
    pub clock: Rc<dyn Clock>,
    pub transport: Box<dyn OrderTransport>,
    pub timers: Box<dyn TimerService>,
    pub registrar: Box<dyn SubscriptionRegistrar>,
    pub market: Box<dyn MarketView>,
    pub control: Box<dyn SessionControl>,
}
