//! Strategy settings
//!
//! Loaded from the session configuration file. `market`, `instruments`,
//! the window bounds and `shares` are required; the rest have defaults.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime};
use log::warn;
use serde::{Deserialize, Serialize};
use tempo_clock::{TradingWindow, WindowTimes};
use tempo_core::{InstrumentId, InstrumentSet, MarketDestination, Quantity};
use thiserror::Error;

use crate::commands::CommandPolarity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("market must not be empty")]
    EmptyMarket,

    #[error("no instruments configured")]
    NoInstruments,

    #[error("shares must be positive, got {0}")]
    NonPositiveShares(Quantity),

    #[error("invalid {field} time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime {
        field: &'static str,
        hour: u32,
        minute: u32,
        second: u32,
    },

    #[error("start {start} must be before end {end}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },

    #[error("utc offset of {0} minutes is out of range")]
    InvalidOffset(i32),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub market: String,
    #[serde(default)]
    pub feed_orig: String,
    #[serde(default)]
    pub feed_dest: String,
    #[serde(default)]
    pub feed_type: String,
    #[serde(default)]
    pub trade_server: String,
    pub instruments: Vec<InstrumentId>,
    /// Run against the simulated order book instead of a live venue
    #[serde(default)]
    pub sim_order_book: bool,

    pub start_hour: u32,
    pub start_minute: u32,
    pub start_second: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    pub end_second: u32,

    #[serde(default = "default_entry_hour")]
    pub entry_hour: u32,
    #[serde(default)]
    pub entry_minute: u32,
    #[serde(default)]
    pub entry_second: u32,
    #[serde(default = "default_exit_hour")]
    pub exit_hour: u32,
    #[serde(default)]
    pub exit_minute: u32,
    #[serde(default)]
    pub exit_second: u32,

    /// Size of entry and hourly orders
    pub shares: Quantity,

    /// Grace period between the first shutdown request and exit
    #[serde(default = "default_shutdown_delay_secs")]
    pub shutdown_delay_secs: u64,
    #[serde(default)]
    pub command_polarity: CommandPolarity,
    /// Exchange local time minus UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_entry_hour() -> u32 {
    10
}

fn default_exit_hour() -> u32 {
    11
}

fn default_shutdown_delay_secs() -> u64 {
    3
}

fn time_of_day(field: &'static str, hour: u32, minute: u32, second: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(SettingsError::InvalidTime {
        field,
        hour,
        minute,
        second,
    })
}

impl StrategySettings {
    pub fn window_times(&self) -> Result<WindowTimes> {
        Ok(WindowTimes {
            start: time_of_day("start", self.start_hour, self.start_minute, self.start_second)?,
            end: time_of_day("end", self.end_hour, self.end_minute, self.end_second)?,
            entry: time_of_day("entry", self.entry_hour, self.entry_minute, self.entry_second)?,
            exit: time_of_day("exit", self.exit_hour, self.exit_minute, self.exit_second)?,
        })
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::InvalidOffset(self.utc_offset_minutes))
    }

    /// Window boundaries on `session_date`
    pub fn trading_window(&self, session_date: NaiveDate) -> Result<TradingWindow> {
        Ok(TradingWindow::new(
            session_date,
            &self.window_times()?,
            self.utc_offset()?,
        ))
    }

    /// Configured instruments, deduplicated in order of first appearance
    pub fn instrument_set(&self) -> InstrumentSet {
        self.instruments.iter().cloned().collect()
    }

    pub fn destination(&self) -> MarketDestination {
        MarketDestination::new(self.market.clone())
    }

    pub fn shutdown_delay(&self) -> Duration {
        Duration::seconds(self.shutdown_delay_secs as i64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.trim().is_empty() {
            return Err(SettingsError::EmptyMarket);
        }
        if self.instruments.is_empty() {
            return Err(SettingsError::NoInstruments);
        }
        if self.shares <= 0 {
            return Err(SettingsError::NonPositiveShares(self.shares));
        }
        let times = self.window_times()?;
        if times.start >= times.end {
            return Err(SettingsError::EmptyWindow {
                start: times.start,
                end: times.end,
            });
        }
        self.utc_offset()?;

        // Allowed, but such a trigger can never fire
        for (name, at) in [("entry", times.entry), ("exit", times.exit)] {
            if at < times.start || at >= times.end {
                warn!(
                    "{} time {} is outside the trading window {}-{}",
                    name, at, times.start, times.end
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_json() -> serde_json::Value {
        serde_json::json!({
            "market": "CFFEX",
            "instruments": ["IF2403", "IH2403", "IF2403"],
            "start_hour": 9, "start_minute": 30, "start_second": 0,
            "end_hour": 15, "end_minute": 0, "end_second": 0,
            "shares": 2
        })
    }

    fn settings() -> StrategySettings {
        serde_json::from_value(settings_json()).unwrap()
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let s = settings();
        let times = s.window_times().unwrap();

        assert_eq!(times.entry, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(times.exit, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert_eq!(s.shutdown_delay(), Duration::seconds(3));
        assert_eq!(s.command_polarity, CommandPolarity::Legacy);
        assert!(!s.sim_order_book);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_instruments_deduplicated() {
        let set = settings().instrument_set();
        let names: Vec<_> = set.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["IF2403", "IH2403"]);
    }

    #[test]
    fn test_missing_required_field_fails_to_load() {
        let mut json = settings_json();
        json.as_object_mut().unwrap().remove("shares");
        assert!(serde_json::from_value::<StrategySettings>(json).is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut s = settings();
        s.shares = 0;
        assert_eq!(s.validate(), Err(SettingsError::NonPositiveShares(0)));

        let mut s = settings();
        s.instruments.clear();
        assert_eq!(s.validate(), Err(SettingsError::NoInstruments));

        let mut s = settings();
        s.market = " ".to_string();
        assert_eq!(s.validate(), Err(SettingsError::EmptyMarket));

        let mut s = settings();
        s.end_hour = 9;
        assert!(matches!(s.validate(), Err(SettingsError::EmptyWindow { .. })));

        let mut s = settings();
        s.start_minute = 75;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::InvalidTime { field: "start", .. })
        ));

        let mut s = settings();
        s.utc_offset_minutes = 24 * 60;
        assert_eq!(s.validate(), Err(SettingsError::InvalidOffset(24 * 60)));
    }

    #[test]
    fn test_entry_outside_window_is_allowed() {
        let mut s = settings();
        s.entry_hour = 8;
        assert!(s.validate().is_ok());
    }
}
