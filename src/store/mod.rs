//! Explicit persistence handle passed to services and handlers through
//! `AppState`. Every method is a single statement; nothing here opens a
//! transaction.

mod commands;
mod greenhouses;
mod issues;
mod plants;
mod readings;
mod users;

pub use readings::NewReading;

use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `true` when `err` is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// `true` when `err` is a Postgres foreign-key violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
