//! Transactional persistence of a deduplicated batch.

use pl_types::{PersistOutcome, PriceRecord};
use tracing::{debug, warn};

use crate::store::{PriceConnection, PriceStore, StoreError};

/// Check-then-insert every record on `conn`, then read store-wide totals.
///
/// Runs inside whatever transaction `conn` belongs to and never opens its own, so it can
/// be composed into a larger unit of work. Each existence check happens before that
/// row's insert; a record already stored counts as a store duplicate and is skipped.
pub async fn persist_rows(
    conn: &mut dyn PriceConnection,
    unique: &[PriceRecord],
) -> Result<PersistOutcome, StoreError> {
    let mut outcome = PersistOutcome::default();
    for record in unique {
        if conn.exists(record).await? {
            outcome.duplicates_in_store += 1;
            continue;
        }
        conn.insert(record).await?;
        outcome.newly_inserted += 1;
    }

    let totals = conn.totals().await?;
    outcome.total_categories = totals.categories;
    outcome.total_price = totals.price_sum;
    Ok(outcome)
}

/// Run [`persist_rows`] in a fresh unit of work, committing on success.
///
/// On any failure the unit of work is rolled back and no totals are returned; the store
/// is left exactly as it was before the call.
pub async fn persist_and_aggregate(
    store: &dyn PriceStore,
    unique: &[PriceRecord],
) -> Result<PersistOutcome, StoreError> {
    let mut uow = store.begin().await?;
    match persist_rows(uow.as_connection(), unique).await {
        Ok(outcome) => {
            uow.commit().await?;
            debug!(
                inserted = outcome.newly_inserted,
                store_duplicates = outcome.duplicates_in_store,
                "committed price batch"
            );
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rb) = uow.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}
