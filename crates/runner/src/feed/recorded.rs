//! Recorded sessions
//!
//! One JSON `PlatformEvent` per line. Blank lines and lines starting with
//! `#` are skipped; malformed lines are logged and skipped.

use std::path::Path;

use async_trait::async_trait;
use log::{error, warn};
use tempo_gateway::PlatformEvent;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::EventSource;
use crate::error::{Result, RunnerError};

pub struct RecordedFeed<R> {
    lines: Lines<R>,
    name: String,
    line_no: usize,
    skipped: usize,
}

impl RecordedFeed<BufReader<File>> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|error| RunnerError::FeedIo {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(Self::new(BufReader::new(file)).named(path.display().to_string()))
    }
}

impl<R: AsyncBufRead + Unpin> RecordedFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            name: "recording".to_string(),
            line_no: 0,
            skipped: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Malformed lines dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[async_trait]
impl<R> EventSource for RecordedFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Option<PlatformEvent> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    error!("{}: read failed after line {}: {}", self.name, self.line_no, e);
                    return None;
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match PlatformEvent::from_json_line(line) {
                Ok(event) => return Some(event),
                Err(e) => {
                    self.skipped += 1;
                    warn!("{}:{}: skipping malformed event: {}", self.name, self.line_no, e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
