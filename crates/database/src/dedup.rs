//! In-batch duplicate removal on the record identity key.

use pl_types::{PriceRecord, RecordKey};
use std::collections::HashSet;

/// Records that survived in-batch deduplication, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduped {
    pub unique: Vec<PriceRecord>,
    pub duplicates: u64,
}

/// Keep the first occurrence of every composite key and count the rest.
pub fn dedupe(records: Vec<PriceRecord>) -> Deduped {
    let mut keep = vec![false; records.len()];
    let mut duplicates = 0u64;
    {
        let mut seen: HashSet<RecordKey<'_>> = HashSet::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if seen.insert(record.key()) {
                keep[i] = true;
            } else {
                duplicates += 1;
            }
        }
    }

    let unique = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();
    Deduped { unique, duplicates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_types::{Decimal, NaiveDate};

    fn rec(id: i64, name: &str, price: i64) -> PriceRecord {
        PriceRecord::new(
            id,
            name,
            "cat",
            Decimal::from(price),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn k_repeats_leave_one_survivor() {
        let input = vec![rec(1, "a", 1); 4];
        let out = dedupe(input);
        assert_eq!(out.duplicates, 3);
        assert_eq!(out.unique, vec![rec(1, "a", 1)]);
    }

    #[test]
    fn keeps_first_seen_order() {
        let input = vec![rec(2, "b", 1), rec(1, "a", 1), rec(2, "b", 1), rec(3, "c", 1), rec(1, "a", 1)];
        let out = dedupe(input);
        assert_eq!(out.duplicates, 2);
        assert_eq!(out.unique, vec![rec(2, "b", 1), rec(1, "a", 1), rec(3, "c", 1)]);
    }

    #[test]
    fn partial_matches_are_distinct() {
        let input = vec![rec(1, "a", 1), rec(1, "a", 2), rec(1, "b", 1)];
        let out = dedupe(input.clone());
        assert_eq!(out.duplicates, 0);
        assert_eq!(out.unique, input);
    }

    #[test]
    fn idempotent_on_unique_input() {
        let first = dedupe(vec![rec(1, "a", 1), rec(1, "a", 1), rec(2, "b", 3)]);
        let second = dedupe(first.unique.clone());
        assert_eq!(second.duplicates, 0);
        assert_eq!(second.unique, first.unique);
    }

    #[test]
    fn empty_batch() {
        assert_eq!(dedupe(Vec::new()), Deduped::default());
    }
}
