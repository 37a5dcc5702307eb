use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;
use tracing::info;

/// Failure of a repository operation.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("{field} must be unique")]
    UniqueViolation { field: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Reclassify a driver error as a uniqueness violation on `field` when the
    /// database reports one.
    pub fn unique_on(err: sqlx::Error, field: &'static str, value: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return RepoError::UniqueViolation {
                    field,
                    value: value.to_string(),
                };
            }
        }
        RepoError::Database(err)
    }
}

/// SQLite-backed store; implements both the user and the course repository.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("parse database url {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;
        info!(%database_url, "database connected");
        Self::migrated(pool).await
    }

    /// Single-connection in-memory database, dropped with the store.
    #[cfg(test)]
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(options)
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        Ok(Self { pool })
    }
}
