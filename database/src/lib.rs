//! SQLite storage for analyses, recommendations, chat and form submissions.

mod analyses;
mod chat;
mod content;
mod submissions;
mod subreddits;

#[cfg(test)]
mod tests;

use blastari_core::{CoreError, DatabaseError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Connected to database");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                migration: e.to_string(),
            })?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub(crate) fn encode_list(values: &[String]) -> Result<String, CoreError> {
    Ok(serde_json::to_string(values)?)
}

pub(crate) fn decode_list(table: &str, raw: &str) -> Result<Vec<String>, CoreError> {
    serde_json::from_str(raw).map_err(|e| {
        CoreError::Database(DatabaseError::CorruptRow {
            table: table.to_string(),
            details: e.to_string(),
        })
    })
}
