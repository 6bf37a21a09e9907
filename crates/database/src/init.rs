use anyhow::{anyhow, Context};
use sqlx::{Pool, Postgres};

/// Shared database connection type for the project.
pub type Connection = Pool<Postgres>;

const DEFAULT_MAX_CONNS: u32 = 8;

/// Connection settings for the `prices` database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DbSettings {
    /// Read settings from the environment.
    ///
    /// `DATABASE_URL` wins when set. Otherwise the URL is assembled from `APP_DB_HOST`,
    /// `APP_DB_PORT`, `APP_DB_USER`, `APP_DB_PASSWORD` and `APP_DB_NAME`.
    pub fn from_env() -> anyhow::Result<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => url_from_parts()?,
        };
        let max_connections = match std::env::var("APP_DB_MAX_CONNS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("APP_DB_MAX_CONNS is not a number: '{raw}'"))?,
            Err(_) => DEFAULT_MAX_CONNS,
        };
        Ok(Self {
            url,
            max_connections,
        })
    }
}

fn url_from_parts() -> anyhow::Result<String> {
    let host = std::env::var("APP_DB_HOST").map_err(|_| {
        anyhow!("neither DATABASE_URL nor APP_DB_HOST is set. Copy .env.example to .env or export them.")
    })?;
    let port = std::env::var("APP_DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = std::env::var("APP_DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let pass = std::env::var("APP_DB_PASSWORD").unwrap_or_default();
    let db = std::env::var("APP_DB_NAME").unwrap_or_else(|_| "prices".to_string());
    Ok(build_url(&host, &port, &user, &pass, &db))
}

fn build_url(host: &str, port: &str, user: &str, pass: &str, db: &str) -> String {
    if pass.is_empty() {
        format!("postgres://{user}@{host}:{port}/{db}?sslmode=disable")
    } else {
        format!("postgres://{user}:{pass}@{host}:{port}/{db}?sslmode=disable")
    }
}

/// Initialize a lazy Postgres pool. No connection is opened until first use.
pub fn init_db(settings: &DbSettings) -> anyhow::Result<Connection> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy(&settings.url)
        .with_context(|| "failed to create Postgres pool (lazy)".to_string())
}

/// Load `.env` if present, then build a pool from the environment.
pub fn pool_from_env() -> anyhow::Result<Connection> {
    let _ = dotenvy::dotenv();
    init_db(&DbSettings::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_and_without_password() {
        assert_eq!(
            build_url("db", "5433", "app", "secret", "prices"),
            "postgres://app:secret@db:5433/prices?sslmode=disable"
        );
        assert_eq!(
            build_url("localhost", "5432", "app", "", "prices"),
            "postgres://app@localhost:5432/prices?sslmode=disable"
        );
    }
}
