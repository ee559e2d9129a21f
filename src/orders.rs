//! Orders

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Identifier handed out when a checkout completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-local source of unique order identifiers.
///
/// Identifiers are derived from the wall clock in milliseconds with a
/// strictly-monotonic guard, so two checkouts in the same millisecond
/// still get distinct ids.
#[derive(Debug, Default)]
pub struct OrderSequence {
    last: u64,
}

impl OrderSequence {
    /// Create a fresh sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next order identifier.
    pub fn next_id(&mut self) -> OrderId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            });

        self.last = now.max(self.last.saturating_add(1));

        OrderId(format!("ORD-{}", self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_order_prefix() {
        let id = OrderSequence::new().next_id();

        assert!(id.as_str().starts_with("ORD-"), "prefix is part of the id");
    }

    #[test]
    fn ids_are_unique_within_a_session() {
        let mut sequence = OrderSequence::new();

        let first = sequence.next_id();
        let second = sequence.next_id();
        let third = sequence.next_id();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn display_matches_the_inner_string() {
        let mut sequence = OrderSequence::new();
        let id = sequence.next_id();

        assert_eq!(id.to_string(), id.as_str());
    }
}
