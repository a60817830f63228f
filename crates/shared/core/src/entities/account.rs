use serde::{Deserialize, Serialize};

/// Trading account number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressee of an operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Account(AccountId),
    /// Broadcast to every account
    All,
}

impl Recipient {
    /// Does a command sent to this recipient apply to `account`?
    pub fn includes(&self, account: AccountId) -> bool {
        match self {
            Recipient::Account(target) => *target == account,
            Recipient::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_scoping() {
        let mine = AccountId(1001);
        assert!(Recipient::Account(mine).includes(mine));
        assert!(Recipient::All.includes(mine));
        assert!(!Recipient::Account(AccountId(2002)).includes(mine));
    }
}
