//! Market data sources for a session
//!
//! - [`SyntheticFeed`]: seeded random walk over the session's instruments
//! - [`RecordedFeed`]: JSON-lines recording, one `PlatformEvent` per line

mod recorded;
mod synthetic;

pub use recorded::RecordedFeed;
pub use synthetic::{SyntheticFeed, SyntheticFeedConfig};

use async_trait::async_trait;
use tempo_gateway::PlatformEvent;

/// A source of platform events, consumed in order by the event loop
///
/// `next_event` is raced against other inputs inside `tokio::select!`, so
/// implementations must be cancel safe: no event may be lost if the future
/// is dropped before it completes.
#[async_trait]
pub trait EventSource: Send {
    /// Next event, or `None` once the source is exhausted
    async fn next_event(&mut self) -> Option<PlatformEvent>;

    fn name(&self) -> &str;
}
