pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

pub type Price = Decimal;

/// Number of decimal places kept for prices, matching the `NUMERIC(10,2)` column.
pub const PRICE_SCALE: u32 = 2;

/// A single priced item from an uploaded price list.
///
/// Records are created while parsing an upload, validated once, and then
/// persisted at most once. They are never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Positive item id. Not unique on its own.
    pub id: i64,
    /// Item name, trimmed and non-empty.
    pub name: String,
    /// Item category, trimmed and non-empty.
    pub category: String,
    /// Non-negative price rounded to [`PRICE_SCALE`] places.
    pub price: Price,
    /// Calendar date the price entry was created.
    pub create_date: NaiveDate,
}

impl PriceRecord {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Price,
        create_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            price: normalize_price(price),
            create_date,
        }
    }

    /// Composite identity of the record. Two records are duplicates iff their keys are equal.
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            id: self.id,
            name: &self.name,
            category: &self.category,
            price: self.price.normalize(),
            create_date: self.create_date,
        }
    }

    /// Price rendered with exactly two decimal digits.
    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }

    /// Date rendered in the canonical `YYYY-MM-DD` form.
    pub fn date_text(&self) -> String {
        self.create_date.format("%Y-%m-%d").to_string()
    }
}

/// Borrowed composite identity key: `(id, name, category, price, create_date)`.
///
/// Compared field by field, so no two distinct field combinations can collide.
/// The price is normalized so that `1.5` and `1.50` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey<'a> {
    pub id: i64,
    pub name: &'a str,
    pub category: &'a str,
    pub price: Price,
    pub create_date: NaiveDate,
}

/// Round a price to the stored precision (midpoint away from zero, like Postgres `NUMERIC`).
pub fn normalize_price(price: Price) -> Price {
    price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_ignores_price_trailing_zeros() {
        let a = PriceRecord::new(1, "Tea", "Drinks", Decimal::from_str("1.5").unwrap(), date(2024, 1, 1));
        let b = PriceRecord::new(1, "Tea", "Drinks", Decimal::from_str("1.50").unwrap(), date(2024, 1, 1));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_separates_fields_structurally() {
        // "a|b" + "c" vs "a" + "b|c" would collide under naive concatenation.
        let a = PriceRecord::new(7, "a|b", "c", Decimal::ONE, date(2024, 1, 1));
        let b = PriceRecord::new(7, "a", "b|c", Decimal::ONE, date(2024, 1, 1));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn new_rounds_price_to_two_places() {
        let r = PriceRecord::new(1, "x", "y", Decimal::from_str("10.005").unwrap(), date(2024, 5, 6));
        assert_eq!(r.price, Decimal::from_str("10.01").unwrap());
        assert_eq!(r.price_text(), "10.01");
        assert_eq!(r.date_text(), "2024-05-06");
    }

    #[test]
    fn price_text_pads_integers() {
        let r = PriceRecord::new(1, "x", "y", Decimal::from(3), date(2024, 5, 6));
        assert_eq!(r.price_text(), "3.00");
    }
}
