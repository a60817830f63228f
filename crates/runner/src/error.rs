//! Runner error types

use std::path::PathBuf;

use tempo_gateway::GatewayError;
use tempo_strategy::SettingsError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("strategy setup failed: {0}")]
    Strategy(#[from] SettingsError),

    #[error("failed to open feed file '{path}': {error}")]
    FeedIo { path: PathBuf, error: std::io::Error },

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
