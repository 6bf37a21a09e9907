use anyhow::Result;
use sqlx::{Executor, Pool, Postgres};

/// Ensure the `prices` table exists.
///
/// There is deliberately no unique constraint: identity is the full
/// (id, name, category, price, create_date) tuple, checked inside the upload transaction.
pub async fn ensure_schema(pool: &Pool<Postgres>) -> Result<()> {
    let create_prices = r#"
    CREATE TABLE IF NOT EXISTS prices (
        id          BIGINT        NOT NULL,
        name        VARCHAR(255)  NOT NULL,
        category    VARCHAR(255)  NOT NULL,
        price       NUMERIC(10,2) NOT NULL,
        create_date DATE          NOT NULL
    );
    "#;

    // Lookup index for the per-row existence check and date-range exports.
    let create_index = r#"
    CREATE INDEX IF NOT EXISTS ix_prices_id_date ON prices (id, create_date);
    "#;

    pool.execute(create_prices).await?;
    pool.execute(create_index).await?;
    Ok(())
}
