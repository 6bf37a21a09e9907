use crate::prices::{NaiveDate, Price, PriceRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional inclusive bounds used to select records for export.
///
/// A price bound of zero or below counts as unset, not as a literal bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min: Option<Price>,
    pub max: Option<Price>,
}

impl PriceFilter {
    pub fn min_price(&self) -> Option<Price> {
        self.min.filter(|p| *p > Decimal::ZERO)
    }

    pub fn max_price(&self) -> Option<Price> {
        self.max.filter(|p| *p > Decimal::ZERO)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.min_price().is_none()
            && self.max_price().is_none()
    }

    /// In-process evaluation of the same predicate the SQL query applies.
    pub fn matches(&self, record: &PriceRecord) -> bool {
        if self.start.is_some_and(|start| record.create_date < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.create_date > end) {
            return false;
        }
        if self.min_price().is_some_and(|min| record.price < min) {
            return false;
        }
        if self.max_price().is_some_and(|max| record.price > max) {
            return false;
        }
        true
    }
}
