use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::error::RepositoryError;

/// Table and index definitions, concatenated from `migrations/tables` at build time
pub const SCHEMA: &str = include_str!(concat!(env!("OUT_DIR"), "/migrations.surql"));

/// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe to run on
/// every start.
pub async fn apply<C: Connection>(db: &Surreal<C>) -> Result<(), RepositoryError> {
    db.query(SCHEMA).await?.check()?;
    info!("Database schema applied");
    Ok(())
}
