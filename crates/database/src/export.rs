//! Export pipeline: filter in, single-entry container out.

use pl_types::{ArchiveKind, PriceFilter, PriceRecord};
use thiserror::Error;
use tracing::info;

use crate::archive::{self, ExtractionError};
use crate::store::{PriceStore, StoreError};

/// Fixed header row of exported price lists.
pub const HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encode: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer: {0}")]
    Buffer(String),
    #[error(transparent)]
    Archive(#[from] ExtractionError),
}

#[derive(Debug, Error)]
pub enum ExportPipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Serialize records as CSV with the fixed header, prices at two decimals.
pub fn encode_csv(records: &[PriceRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for r in records {
        writer.write_record([
            r.id.to_string(),
            r.name.clone(),
            r.category.clone(),
            r.price_text(),
            r.date_text(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))
}

/// Encode records and wrap them as a single `data.csv` entry.
pub fn encode_archive(records: &[PriceRecord], kind: ArchiveKind) -> Result<Vec<u8>, ExportError> {
    let tabular = encode_csv(records)?;
    Ok(archive::pack_as(kind, &tabular)?)
}

/// Query `store` with `filter` and return the packed export.
pub async fn export_archive(
    store: &dyn PriceStore,
    filter: &PriceFilter,
    kind: ArchiveKind,
) -> Result<Vec<u8>, ExportPipelineError> {
    let records = store.query(filter).await?;
    let bytes = encode_archive(&records, kind)?;
    info!(rows = records.len(), bytes = bytes.len(), %kind, "exported price list");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_types::{Decimal, NaiveDate};

    #[test]
    fn header_and_two_decimal_prices() {
        let records = vec![
            PriceRecord::new(2, "Tea", "Drinks", Decimal::from(3), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            PriceRecord::new(1, "Cake, lemon", "Food", Decimal::new(1250, 3), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
        ];
        let text = String::from_utf8(encode_csv(&records).unwrap()).unwrap();
        assert_eq!(
            text,
            "id,name,category,price,create_date\n\
             2,Tea,Drinks,3.00,2024-01-05\n\
             1,\"Cake, lemon\",Food,1.25,2023-12-31\n"
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let text = String::from_utf8(encode_csv(&[]).unwrap()).unwrap();
        assert_eq!(text, "id,name,category,price,create_date\n");
    }
}
