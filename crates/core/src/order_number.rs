//! Human-readable order number generation.
//!
//! Numbers look like `PAT-20260807-4821`: a fixed prefix, the UTC date, and a
//! random zero-padded 4-digit suffix. Uniqueness within a day is best-effort
//! at generation time; the store enforces a unique index and the service
//! retries a bounded number of times on a true collision.

use chrono::Utc;
use rand::Rng;

/// Prefix carried by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "PAT";

/// How many times order creation retries on an order-number collision.
pub const MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Generator for human-readable order numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderNumberGenerator;

impl OrderNumberGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate one order number for the current UTC date.
    #[must_use]
    pub fn generate(&self) -> String {
        let date = Utc::now().format("%Y%m%d");
        let suffix: u32 = rand::rng().random_range(0..10_000);
        format!("{ORDER_NUMBER_PREFIX}-{date}-{suffix:04}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_matches_pattern(number: &str) {
        // PAT-\d{8}-\d{4}
        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some(ORDER_NUMBER_PREFIX));

        let date = parts.next().unwrap();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));

        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));

        assert!(parts.next().is_none());
    }

    #[test]
    fn test_format() {
        let number = OrderNumberGenerator::new().generate();
        assert_matches_pattern(&number);
    }

    #[test]
    fn test_mostly_unique_in_quick_succession() {
        let generator = OrderNumberGenerator::new();
        let numbers: HashSet<String> = (0..100).map(|_| generator.generate()).collect();
        // Soft uniqueness: collisions in the 4-digit suffix are possible but
        // must stay rare.
        assert!(numbers.len() > 90, "only {} distinct numbers", numbers.len());
    }
}
