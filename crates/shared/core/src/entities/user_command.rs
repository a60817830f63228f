use serde::{Deserialize, Serialize};

/// Operator commands delivered on the user-message channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserCommand {
    Shutdown,
    GetFlat,
    SendNothing,
    AllowSending,
    /// A command this strategy does not know
    Unknown(String),
}

impl UserCommand {
    /// Parse the textual form used on the command console (`send_nothing`, `SEND-NOTHING`, ...)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "shutdown" => UserCommand::Shutdown,
            "get_flat" => UserCommand::GetFlat,
            "send_nothing" => UserCommand::SendNothing,
            "allow_sending" => UserCommand::AllowSending,
            other => UserCommand::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for UserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserCommand::Shutdown => f.write_str("SHUTDOWN"),
            UserCommand::GetFlat => f.write_str("GET_FLAT"),
            UserCommand::SendNothing => f.write_str("SEND_NOTHING"),
            UserCommand::AllowSending => f.write_str("ALLOW_SENDING"),
            UserCommand::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(UserCommand::parse("shutdown"), UserCommand::Shutdown);
        assert_eq!(UserCommand::parse(" GET-FLAT "), UserCommand::GetFlat);
        assert_eq!(UserCommand::parse("send_nothing"), UserCommand::SendNothing);
        assert_eq!(UserCommand::parse("Allow_Sending"), UserCommand::AllowSending);
        assert_eq!(
            UserCommand::parse("halt"),
            UserCommand::Unknown("halt".to_string())
        );
    }
}
