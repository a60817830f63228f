//! Runner configuration
//!
//! One JSON file holds the runner-level fields (account, session date, mode,
//! feed, paper gateway) and the nested strategy settings.
//!
//! ```json
//! {
//!   "account": 1001,
//!   "session_date": "2024-03-01",
//!   "mode": "replay",
//!   "feed": { "type": "synthetic", "seed": 7 },
//!   "paper": { "fill_ratio": 1.0 },
//!   "strategy": { "market": "CFFEX", "instruments": ["IF2403"], ... }
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tempo_core::AccountId;
use tempo_gateway::PaperConfig;
use tempo_strategy::{SettingsError, StrategySettings};
use thiserror::Error;

use crate::feed::SyntheticFeedConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid strategy settings: {0}")]
    Invalid(#[from] SettingsError),

    #[error("replay mode requires a session_date")]
    MissingSessionDate,

    #[error("paper fill_ratio must be within [0, 1], got {0}")]
    InvalidFillRatio(f64),

    #[error("synthetic feed tick_interval_secs must be positive")]
    ZeroTickInterval,
}

/// How time advances during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Simulated clock driven by event timestamps
    #[default]
    Replay,
    /// Wall clock; commands are read from stdin
    Live,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Replay => f.write_str("replay"),
            RunMode::Live => f.write_str("live"),
        }
    }
}

/// Where market data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedConfig {
    Synthetic(SyntheticFeedConfig),
    /// JSON-lines recording, one `PlatformEvent` per line
    File { path: PathBuf },
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig::Synthetic(SyntheticFeedConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub account: AccountId,
    /// Calendar date the window applies to; today (exchange time) if absent in live mode
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub paper: PaperConfig,
    pub strategy: StrategySettings,
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject configurations the session cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;

        if self.mode == RunMode::Replay && self.session_date.is_none() {
            return Err(ConfigError::MissingSessionDate);
        }
        if !(0.0..=1.0).contains(&self.paper.fill_ratio) {
            return Err(ConfigError::InvalidFillRatio(self.paper.fill_ratio));
        }
        if let FeedConfig::Synthetic(synthetic) = &self.feed {
            if synthetic.tick_interval_secs == 0 {
                return Err(ConfigError::ZeroTickInterval);
            }
        }
        Ok(())
    }

    /// Session date to apply the window times to
    pub fn resolve_session_date(&self) -> Result<NaiveDate, ConfigError> {
        match (self.session_date, self.mode) {
            (Some(date), _) => Ok(date),
            (None, RunMode::Live) => {
                let offset = self.strategy.utc_offset()?;
                Ok(Utc::now().with_timezone(&offset).date_naive())
            }
            (None, RunMode::Replay) => Err(ConfigError::MissingSessionDate),
        }
    }
}
