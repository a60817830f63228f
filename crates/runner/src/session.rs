//! Session wiring: config -> platform -> strategy -> event loop

use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{info, warn};
use tempo_core::{InstrumentId, Quantity, Timestamp};
use tempo_order_manager::OrderStats;
use tempo_strategy::WindowStrategy;

use crate::config::{FeedConfig, RunMode, RunnerConfig};
use crate::console::{spawn_console, spawn_signal_listener};
use crate::error::Result;
use crate::event_loop::{EventLoop, SessionSummary};
use crate::feed::{EventSource, RecordedFeed, SyntheticFeed};
use crate::platform::Platform;

/// What a finished session leaves behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub orders: OrderStats,
    /// Non-zero ledger positions at the end of the session
    pub open_positions: Vec<(InstrumentId, Quantity)>,
}

pub struct Session {
    config: RunnerConfig,
    session_date: NaiveDate,
    handle_signals: bool,
}

impl Session {
    /// Validate the configuration and fix the session date
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        let session_date = config.resolve_session_date()?;
        Ok(Self {
            config,
            session_date,
            handle_signals: true,
        })
    }

    /// Do not install SIGINT / SIGTERM handlers
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    /// Run against the configured feed
    pub async fn run(self) -> Result<SessionReport> {
        let mut feed: Box<dyn EventSource> = match &self.config.feed {
            FeedConfig::Synthetic(synthetic) => {
                let window = self.config.strategy.trading_window(self.session_date)?;
                let instruments = self.config.strategy.instrument_set();
                match self.config.mode {
                    RunMode::Replay => Box::new(SyntheticFeed::replay(synthetic.clone(), &instruments, &window)),
                    RunMode::Live => Box::new(SyntheticFeed::live(synthetic.clone(), &instruments, &window)),
                }
            }
            FeedConfig::File { path } => Box::new(RecordedFeed::open(path).await?),
        };
        self.run_with_feed(feed.as_mut()).await
    }

    /// Run against a caller-supplied feed
    pub async fn run_with_feed(self, feed: &mut dyn EventSource) -> Result<SessionReport> {
        let config = &self.config;
        let offset = config.strategy.utc_offset()?;
        let platform = match config.mode {
            RunMode::Replay => Platform::replay(start_of_day(self.session_date, offset)),
            RunMode::Live => Platform::live(),
        };

        info!(
            "account {} session {} ({} mode, market {})",
            config.account,
            self.session_date,
            config.mode,
            config.strategy.destination()
        );

        let ctx = platform.trading_context(config.account, self.session_date, config.paper);
        let mut strategy = WindowStrategy::new(&config.strategy, ctx)?;
        strategy.subscribe_user_messages();
        info!("trading window {}", strategy.window());

        if self.handle_signals {
            spawn_signal_listener(platform.control_publisher());
        }
        if config.mode == RunMode::Live {
            spawn_console(platform.control_publisher());
        }

        let mut event_loop = EventLoop::new(platform, strategy);
        event_loop.run(feed).await;

        let orders = event_loop.strategy().orders().stats();
        let open_positions: Vec<(InstrumentId, Quantity)> = event_loop
            .strategy()
            .positions()
            .open_positions()
            .map(|(instrument, size)| (instrument.clone(), size))
            .collect();
        let summary = event_loop.finish();

        info!("orders: {}", orders);
        if orders.send_failures > 0 || orders.cancel_failures > 0 || orders.anomalies > 0 {
            warn!(
                "session had {} send failures, {} cancel failures, {} anomalies",
                orders.send_failures, orders.cancel_failures, orders.anomalies
            );
        }
        for (instrument, size) in &open_positions {
            info!("open position {} {}", instrument, size);
        }

        Ok(SessionReport {
            summary,
            orders,
            open_positions,
        })
    }
}

/// Local midnight of the session date, in UTC
fn start_of_day(session_date: NaiveDate, offset: FixedOffset) -> Timestamp {
    let local = session_date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day_applies_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();

        assert_eq!(
            start_of_day(date, shanghai),
            Utc.with_ymd_and_hms(2024, 2, 29, 16, 0, 0).unwrap()
        );
    }
}
