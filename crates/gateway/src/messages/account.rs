//! Account and process level messages

use serde::{Deserialize, Serialize};
use tempo_core::{InstrumentId, Quantity, Recipient, Timestamp, UserCommand};

/// Authoritative effective position for an instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub instrument: InstrumentId,
    pub effective_size: Quantity,
    pub timestamp: Timestamp,
}

/// Operator command addressed to an account (or to everyone)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub recipient: Recipient,
    pub command: UserCommand,
}

impl UserMessage {
    pub fn new(recipient: Recipient, command: UserCommand) -> Self {
        Self { recipient, command }
    }

    /// Parse a console line: `<command> [@<account>]`.
    /// Without an account suffix the command is broadcast.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = UserCommand::parse(parts.next()?);
        let recipient = match parts.next() {
            Some(target) => {
                let account = target.strip_prefix('@').unwrap_or(target).parse().ok()?;
                Recipient::Account(tempo_core::AccountId(account))
            }
            None => Recipient::All,
        };
        Some(Self { recipient, command })
    }
}

/// Process-level notification routed into the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessSignal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessSignal::Interrupt => f.write_str("SIGINT"),
            ProcessSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}
