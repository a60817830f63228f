use serde::{Deserialize, Serialize};

/// Unique identifier for a tradable contract
///
/// Opaque to the strategy: it is only compared, hashed and printed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Create a new instrument ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&InstrumentId> for InstrumentId {
    fn from(id: &InstrumentId) -> Self {
        id.clone()
    }
}

/// Venue / routing target for orders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketDestination(pub String);

impl MarketDestination {
    pub fn new(dest: impl Into<String>) -> Self {
        Self(dest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MarketDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, deduplicated instrument list held for the whole session
///
/// The first occurrence of an instrument fixes its position; later
/// duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentSet {
    instruments: Vec<InstrumentId>,
}

impl InstrumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instrument; returns false if it was already present
    pub fn insert(&mut self, instrument: impl Into<InstrumentId>) -> bool {
        let instrument = instrument.into();
        if self.instruments.contains(&instrument) {
            return false;
        }
        self.instruments.push(instrument);
        true
    }

    pub fn contains(&self, instrument: &InstrumentId) -> bool {
        self.instruments.contains(instrument)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstrumentId> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl<I: Into<InstrumentId>> FromIterator<I> for InstrumentSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut set = InstrumentSet::new();
        for instrument in iter {
            set.insert(instrument);
        }
        set
    }
}

impl<'a> IntoIterator for &'a InstrumentSet {
    type Item = &'a InstrumentId;
    type IntoIter = std::slice::Iter<'a, InstrumentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.instruments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_set_dedups_and_keeps_order() {
        let set: InstrumentSet = ["rb2405", "IF2403", "rb2405", "cu2404"].into_iter().collect();
        let ids: Vec<&str> = set.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["rb2405", "IF2403", "cu2404"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_instrument_id_serializes_as_plain_string() {
        let id = InstrumentId::new("IF2403");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"IF2403\"");
    }
}
