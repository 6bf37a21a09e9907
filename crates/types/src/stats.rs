use crate::prices::Price;
use serde::{Deserialize, Serialize};

/// What a single persistence transaction observed and the store-wide totals after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistOutcome {
    /// Rows skipped because an identical record was already stored.
    pub duplicates_in_store: u64,
    /// Rows actually inserted by this transaction.
    pub newly_inserted: u64,
    /// Distinct categories across the whole store after the insert.
    pub total_categories: u64,
    /// Sum of all stored prices after the insert.
    pub total_price: Price,
}

/// Statistics reported back for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_count: u64,
    pub duplicates_count: u64,
    pub total_items: u64,
    pub total_categories: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Price,
}

impl Stats {
    /// Combine parser, deduplicator and store counts into the reported statistics.
    ///
    /// `raw_row_count` counts every data row including invalid ones, so
    /// `total_count` may exceed `duplicates_count + total_items`.
    pub fn combine(raw_row_count: u64, duplicates_in_batch: u64, outcome: PersistOutcome) -> Self {
        Self {
            total_count: raw_row_count,
            duplicates_count: duplicates_in_batch + outcome.duplicates_in_store,
            total_items: outcome.newly_inserted,
            total_categories: outcome.total_categories,
            total_price: outcome.total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn combine_adds_batch_and_store_duplicates() {
        let outcome = PersistOutcome {
            duplicates_in_store: 2,
            newly_inserted: 3,
            total_categories: 4,
            total_price: Decimal::from_str("12.50").unwrap(),
        };
        let stats = Stats::combine(9, 1, outcome);
        assert_eq!(stats.total_count, 9);
        assert_eq!(stats.duplicates_count, 3);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.total_categories, 4);
        assert_eq!(stats.total_price, Decimal::from_str("12.5").unwrap());
    }

    #[test]
    fn serializes_with_snake_case_numeric_fields() {
        let stats = Stats {
            total_count: 2,
            duplicates_count: 1,
            total_items: 1,
            total_categories: 1,
            total_price: Decimal::from_str("100.25").unwrap(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["duplicates_count"], 1);
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["total_categories"], 1);
        assert_eq!(json["total_price"].as_f64(), Some(100.25));
    }
}
