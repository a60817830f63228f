//! Operator command interpretation

use serde::{Deserialize, Serialize};
use tempo_core::UserCommand;

/// How SEND_NOTHING / ALLOW_SENDING map onto the trade flag
///
/// `Legacy` keeps the historical mapping, where SEND_NOTHING turns trading
/// on and ALLOW_SENDING turns it off. `AsNamed` follows the command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPolarity {
    #[default]
    Legacy,
    AsNamed,
}

impl CommandPolarity {
    /// Trade flag value set by a freeze/resume command, `None` for other commands
    pub fn trade_flag_for(&self, command: &UserCommand) -> Option<bool> {
        match (command, self) {
            (UserCommand::SendNothing, CommandPolarity::Legacy) => Some(true),
            (UserCommand::SendNothing, CommandPolarity::AsNamed) => Some(false),
            (UserCommand::AllowSending, CommandPolarity::Legacy) => Some(false),
            (UserCommand::AllowSending, CommandPolarity::AsNamed) => Some(true),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_mapping_is_inverted() {
        let p = CommandPolarity::Legacy;
        assert_eq!(p.trade_flag_for(&UserCommand::SendNothing), Some(true));
        assert_eq!(p.trade_flag_for(&UserCommand::AllowSending), Some(false));
    }

    #[test]
    fn test_as_named_mapping() {
        let p = CommandPolarity::AsNamed;
        assert_eq!(p.trade_flag_for(&UserCommand::SendNothing), Some(false));
        assert_eq!(p.trade_flag_for(&UserCommand::AllowSending), Some(true));
        assert_eq!(p.trade_flag_for(&UserCommand::Shutdown), None);
    }
}
