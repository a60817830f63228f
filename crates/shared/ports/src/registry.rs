use serde::{Deserialize, Serialize};
use tempo_core::InstrumentId;

/// Handle for one live registration with an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Event streams a strategy can register for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Top-of-book changes for one instrument
    Book(InstrumentId),
    /// Trade ticks for one instrument
    Ticks(InstrumentId),
    /// Order status changes and fills for one instrument
    OrderStatus(InstrumentId),
    /// Effective position changes for one instrument
    Position(InstrumentId),
    /// Operator commands
    UserMessages,
}

impl Topic {
    pub fn instrument(&self) -> Option<&InstrumentId> {
        match self {
            Topic::Book(i) | Topic::Ticks(i) | Topic::OrderStatus(i) | Topic::Position(i) => Some(i),
            Topic::UserMessages => None,
        }
    }

    pub fn is_book(&self) -> bool {
        matches!(self, Topic::Book(_))
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Book(i) => write!(f, "book.{i}"),
            Topic::Ticks(i) => write!(f, "ticks.{i}"),
            Topic::OrderStatus(i) => write!(f, "orders.{i}"),
            Topic::Position(i) => write!(f, "position.{i}"),
            Topic::UserMessages => f.write_str("user_messages"),
        }
    }
}

/// Port for registering with the platform's event dispatcher
///
/// Events for a topic are only delivered while at least one subscription
/// for it is live.
pub trait SubscriptionRegistrar {
    fn subscribe(&mut self, topic: Topic) -> SubscriptionId;

    /// Returns false if the subscription was not live
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
