pub mod pull_requests;
pub mod stats;
pub mod users;

use sqlx::{Executor, Postgres, migrate::Migrator};
use thiserror::Error;

/// Schema migrations embedded from `crates/assigner/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("team not found")]
    TeamNotFound,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Takes a transaction-scoped advisory lock keyed by `key`.
///
/// Blocks until every other transaction holding the same key has committed or
/// rolled back. Released automatically when this transaction ends.
pub async fn acquire_xact_lock<'e, E>(executor: E, key: &str) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(executor)
        .await?;
    Ok(())
}

/// Advisory lock key for team creation, namespaced so it cannot collide with
/// other users of `pg_advisory_xact_lock`.
pub fn team_lock_key(team_name: &str) -> String {
    format!("team:{team_name}")
}
