//! Tempo Ports
//!
//! Port definitions (traits) for the Tempo strategy core. These are the
//! capabilities the surrounding platform hands to the strategy: time,
//! order transport, timers, event subscriptions, market view and
//! session control. The strategy never reaches the platform any other way.

mod clock;
mod control;
mod error;
mod market;
mod registry;
mod timer;
mod transport;

pub use clock::Clock;
pub use control::SessionControl;
pub use error::{TransportError, TransportResult};
pub use market::{BookLevel, MarketView, TopOfBook};
pub use registry::{SubscriptionId, SubscriptionRegistrar, Topic};
pub use timer::{TimerEvent, TimerFired, TimerId, TimerService};
pub use transport::OrderTransport;
