//! Upload pipeline: container bytes in, statistics out.
//!
//! extract -> parse -> dedupe -> persist (one transaction) -> combine.

use pl_types::{ArchiveKind, Stats};
use thiserror::Error;
use tracing::info;

use crate::archive::{self, ExtractionError};
use crate::dedup::dedupe;
use crate::parser::{parse_rows, ParseError};
use crate::persist::persist_and_aggregate;
use crate::store::{PriceStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Whether the uploader can fix this by sending a different file.
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::Extraction(_) | IngestError::Parse(_))
    }
}

/// Ingest one uploaded container into `store`.
pub async fn ingest_archive(
    store: &dyn PriceStore,
    payload: &[u8],
    kind: ArchiveKind,
) -> Result<Stats, IngestError> {
    let tabular = archive::extract(payload, kind)?;
    let parsed = parse_rows(&tabular)?;
    let raw_rows = parsed.raw_rows;
    let batch = dedupe(parsed.records);
    let outcome = persist_and_aggregate(store, &batch.unique).await?;
    let stats = Stats::combine(raw_rows, batch.duplicates, outcome);
    info!(
        %kind,
        total_count = stats.total_count,
        duplicates = stats.duplicates_count,
        inserted = stats.total_items,
        "ingested price list"
    );
    Ok(stats)
}
