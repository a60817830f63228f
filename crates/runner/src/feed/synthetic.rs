//! Synthetic market data
//!
//! Seeded random walk per instrument. Every step emits, for each
//! instrument, a trade print at the new price followed by a top-of-book
//! change around it. The first step's prints are flagged as opening ticks.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tempo_clock::TradingWindow;
use tempo_core::{InstrumentId, InstrumentSet, Price, Timestamp};
use tempo_gateway::{BookChange, PlatformEvent, TradeTick};
use tempo_ports::{BookLevel, TopOfBook};

use super::EventSource;

const DEFAULT_PRICE: Decimal = dec!(100);
const MIN_PRICE: Decimal = dec!(0.01);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticFeedConfig {
    pub seed: u64,
    /// Spacing of the feed's steps
    pub tick_interval_secs: u64,
    /// Largest relative move per step (0.0005 = 5bp)
    pub volatility: f64,
    /// Distance from the last trade to the best bid and best ask
    pub half_spread: Decimal,
    /// Starting price per instrument; 100 where absent
    pub initial_prices: HashMap<InstrumentId, Decimal>,
    /// Data generated before the window opens and after it closes
    pub margin_secs: u64,
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_interval_secs: 60,
            volatility: 0.0005,
            half_spread: dec!(0.1),
            initial_prices: HashMap::new(),
            margin_secs: 300,
        }
    }
}

enum Pacing {
    /// Emit as fast as the loop consumes, stamped with tape time
    Tape { next_at: Timestamp },
    /// One step per interval of wall time, stamped with the wall clock
    WallClock { next: tokio::time::Instant },
}

pub struct SyntheticFeed {
    config: SyntheticFeedConfig,
    instruments: Vec<InstrumentId>,
    prices: HashMap<InstrumentId, Price>,
    books: HashMap<InstrumentId, TopOfBook>,
    rng: StdRng,
    pacing: Pacing,
    until: Timestamp,
    steps: u64,
    pending: VecDeque<PlatformEvent>,
}

impl SyntheticFeed {
    /// Tape-time feed covering the window plus the configured margin
    pub fn replay(config: SyntheticFeedConfig, instruments: &InstrumentSet, window: &TradingWindow) -> Self {
        let margin = Duration::seconds(config.margin_secs as i64);
        let pacing = Pacing::Tape {
            next_at: window.start() - margin,
        };
        Self::with_pacing(config, instruments, pacing, window.end() + margin)
    }

    /// Wall-clock feed that runs until the window closes plus the margin
    pub fn live(config: SyntheticFeedConfig, instruments: &InstrumentSet, window: &TradingWindow) -> Self {
        let margin = Duration::seconds(config.margin_secs as i64);
        let pacing = Pacing::WallClock {
            next: tokio::time::Instant::now(),
        };
        Self::with_pacing(config, instruments, pacing, window.end() + margin)
    }

    fn with_pacing(
        config: SyntheticFeedConfig,
        instruments: &InstrumentSet,
        pacing: Pacing,
        until: Timestamp,
    ) -> Self {
        let prices = instruments
            .iter()
            .map(|id| {
                let start = config.initial_prices.get(id).copied().unwrap_or(DEFAULT_PRICE);
                (id.clone(), start)
            })
            .collect();

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            instruments: instruments.iter().cloned().collect(),
            prices,
            books: HashMap::new(),
            pacing,
            until,
            steps: 0,
            pending: VecDeque::new(),
        }
    }

    /// Current price of an instrument's walk
    pub fn price(&self, instrument: &InstrumentId) -> Option<Price> {
        self.prices.get(instrument).copied()
    }

    fn interval(&self) -> Duration {
        Duration::seconds(self.config.tick_interval_secs as i64)
    }

    fn walk(&mut self, current: Price) -> Price {
        let change_pct: f64 = self.rng.gen_range(-1.0..1.0);
        let multiplier = 1.0 + self.config.volatility * change_pct;
        let next = current
            .to_f64()
            .and_then(|p| Decimal::from_f64_retain(p * multiplier))
            .unwrap_or(current)
            .round_dp(2);
        next.max(MIN_PRICE)
    }

    fn step(&mut self, at: Timestamp) {
        let opening = self.steps == 0;
        for instrument in self.instruments.clone() {
            let current = self.prices.get(&instrument).copied().unwrap_or(DEFAULT_PRICE);
            let price = if opening { current } else { self.walk(current) };
            self.prices.insert(instrument.clone(), price);

            let size = self.rng.gen_range(1..=10);
            self.pending.push_back(PlatformEvent::Tick {
                instrument: instrument.clone(),
                tick: TradeTick::new(price, size, at, at),
                opening,
            });

            let bid = BookLevel::new((price - self.config.half_spread).max(MIN_PRICE), self.rng.gen_range(1..=50));
            let ask = BookLevel::new(price + self.config.half_spread, self.rng.gen_range(1..=50));
            let previous = self.books.get(&instrument).copied().unwrap_or_default();
            let top = TopOfBook::new(Some(bid), Some(ask));
            self.books.insert(instrument.clone(), top);

            self.pending.push_back(PlatformEvent::Book(BookChange {
                instrument,
                bid_level_changed: (previous.bid != Some(bid)).then_some(0),
                ask_level_changed: (previous.ask != Some(ask)).then_some(0),
                top,
                timestamp: at,
            }));
        }
        self.steps += 1;
    }
}

#[async_trait]
impl EventSource for SyntheticFeed {
    async fn next_event(&mut self) -> Option<PlatformEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let interval = self.interval();
            let at = match &mut self.pacing {
                Pacing::Tape { next_at } => {
                    let at = *next_at;
                    *next_at = at + interval;
                    at
                }
                Pacing::WallClock { next } => {
                    tokio::time::sleep_until(*next).await;
                    *next += std::time::Duration::from_secs(self.config.tick_interval_secs);
                    Utc::now()
                }
            };
            if at > self.until {
                debug!("synthetic feed finished after {} steps", self.steps);
                return None;
            }
            self.step(at);
        }
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
