//! CSV price list parsing.
//!
//! The first row is a header and is discarded. Every following row counts towards
//! `raw_rows`; only rows that pass validation become [`PriceRecord`]s. Invalid rows
//! are dropped without error. Only a structurally broken CSV stream fails the call:
//! misplaced or unterminated quotes, or bytes that are not UTF-8.

use pl_types::prices::{normalize_price, NaiveDate, Price, PriceRecord};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

const FIELDS_PER_ROW: usize = 5;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty csv: no header row")]
    Empty,
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed csv: line {line}: {kind}")]
    Quoting { line: u64, kind: QuoteFault },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteFault {
    /// A `"` inside a field that did not start with one.
    Bare,
    /// Text after the closing `"` of a quoted field.
    Extraneous,
    /// A quoted field still open at end of input.
    Unterminated,
}

impl std::fmt::Display for QuoteFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            QuoteFault::Bare => "bare \" in non-quoted field",
            QuoteFault::Extraneous => "extraneous \" in quoted field",
            QuoteFault::Unterminated => "quoted field is never closed",
        };
        f.write_str(text)
    }
}

/// Valid records in input order plus the number of data rows seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRows {
    pub records: Vec<PriceRecord>,
    pub raw_rows: u64,
}

impl ParsedRows {
    pub fn rejected(&self) -> u64 {
        self.raw_rows - self.records.len() as u64
    }
}

pub fn parse_rows(data: &[u8]) -> Result<ParsedRows, ParseError> {
    check_quoting(data)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = reader.records();
    match rows.next() {
        Some(header) => {
            header?;
        }
        None => return Err(ParseError::Empty),
    }

    let mut out = ParsedRows::default();
    for row in rows {
        let row = row?;
        out.raw_rows += 1;
        if let Some(record) = validate_row(&row) {
            out.records.push(record);
        }
    }
    debug!(
        raw_rows = out.raw_rows,
        valid = out.records.len(),
        rejected = out.rejected(),
        "parsed price rows"
    );
    Ok(out)
}

/// Strict quote structure: a quote may only open a field, close it, or be doubled inside it.
///
/// The csv reader itself treats stray quotes as data and lets an open quote swallow the
/// rest of the input, so this pass runs first.
fn check_quoting(data: &[u8]) -> Result<(), ParseError> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
        ClosedCr,
    }

    let mut state = State::FieldStart;
    let mut line = 1u64;
    let mut opened_at = 1u64;
    let fault = |line, kind| Err(ParseError::Quoting { line, kind });

    for &b in data {
        state = match (state, b) {
            (State::FieldStart, b'"') => {
                opened_at = line;
                State::Quoted
            }
            (State::FieldStart | State::Unquoted, b',') => State::FieldStart,
            (State::FieldStart | State::Unquoted, b'\n') => {
                line += 1;
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted, b'"') => return fault(line, QuoteFault::Bare),
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted, b'"') => State::QuoteInQuoted,
            (State::Quoted, b'\n') => {
                line += 1;
                State::Quoted
            }
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, b'"') => State::Quoted,
            (State::QuoteInQuoted | State::ClosedCr, b',') => State::FieldStart,
            (State::QuoteInQuoted | State::ClosedCr, b'\n') => {
                line += 1;
                State::FieldStart
            }
            (State::QuoteInQuoted, b'\r') => State::ClosedCr,
            (State::QuoteInQuoted | State::ClosedCr, _) => {
                return fault(line, QuoteFault::Extraneous)
            }
        };
    }

    match state {
        State::Quoted => fault(opened_at, QuoteFault::Unterminated),
        _ => Ok(()),
    }
}

fn validate_row(row: &csv::StringRecord) -> Option<PriceRecord> {
    if row.len() != FIELDS_PER_ROW {
        return None;
    }
    let field = |i: usize| row.get(i);

    let id: i64 = field(0)?.parse().ok()?;
    if id <= 0 {
        return None;
    }
    let name = field(1)?.trim();
    if name.is_empty() {
        return None;
    }
    let category = field(2)?.trim();
    if category.is_empty() {
        return None;
    }
    let price = parse_price(field(3)?)?;
    let create_date = parse_date(field(4)?.trim())?;

    Some(PriceRecord {
        id,
        name: name.to_string(),
        category: category.to_string(),
        price,
        create_date,
    })
}

/// Non-negative decimal in plain or scientific notation, rounded to the stored scale.
pub fn parse_price(text: &str) -> Option<Price> {
    let value = parse_decimal(text)?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    Some(normalize_price(value.abs()))
}

/// Plain or scientific decimal. Digit separators (`1_000`) are not numbers here.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Date in exactly the `YYYY-MM-DD` shape that is also a real calendar day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !is_canonical_date(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn is_canonical_date(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}
