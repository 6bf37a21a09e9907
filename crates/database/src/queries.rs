//! SQL text for the `prices` table.

use pl_types::prices::{NaiveDate, Price};
use pl_types::PriceFilter;

pub const SELECT_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM prices \
     WHERE id = $1 AND name = $2 AND category = $3 AND price = $4 AND create_date = $5)";

pub const INSERT_PRICE: &str =
    "INSERT INTO prices (id, name, category, price, create_date) VALUES ($1, $2, $3, $4, $5)";

pub const SELECT_TOTALS: &str =
    "SELECT COUNT(DISTINCT category) AS categories, COALESCE(SUM(price), 0) AS price_sum FROM prices";

const SELECT_PRICES: &str = "SELECT id, name, category, price, create_date FROM prices WHERE 1=1";

/// A bound argument of a [`FilterQuery`], in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    Date(NaiveDate),
    Price(Price),
}

/// Parameterized export query built from a [`PriceFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub sql: String,
    pub args: Vec<FilterArg>,
}

impl FilterQuery {
    pub fn build(filter: &PriceFilter) -> Self {
        let mut sql = String::from(SELECT_PRICES);
        let mut args = Vec::with_capacity(4);

        let mut push = |clause: &str, arg: FilterArg| {
            args.push(arg);
            sql.push_str(&format!(" AND {clause} ${}", args.len()));
        };

        if let Some(start) = filter.start {
            push("create_date >=", FilterArg::Date(start));
        }
        if let Some(end) = filter.end {
            push("create_date <=", FilterArg::Date(end));
        }
        if let Some(min) = filter.min_price() {
            push("price >=", FilterArg::Price(min));
        }
        if let Some(max) = filter.max_price() {
            push("price <=", FilterArg::Price(max));
        }

        // ctid keeps rows sharing an id in physical (insertion) order
        sql.push_str(" ORDER BY id, ctid");
        Self { sql, args }
    }
}
