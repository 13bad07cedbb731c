use surrealdb::{Surreal, engine::any::Any};
use thiserror::Error;
use uuid::Uuid;

use crate::migrations;
use crate::repository::error::RepositoryError;

#[derive(Error, Debug)]
pub enum TestUtilsError {
    #[error("Database connection failed: {0}")]
    DatabaseConnection(#[from] surrealdb::Error),

    #[error("Schema initialization failed: {0}")]
    SchemaInitialization(#[from] RepositoryError),
}

/// An isolated in-memory database with the schema applied
pub struct TestDatabase {
    pub db: Surreal<Any>,
    pub namespace: String,
    pub database: String,
}

impl TestDatabase {
    pub async fn new() -> Result<Self, TestUtilsError> {
        let db = surrealdb::engine::any::connect("mem://").await?;

        let suffix = Uuid::new_v4().simple().to_string();
        let namespace = format!("test_ns_{}", suffix);
        let database = format!("test_db_{}", suffix);
        db.use_ns(&namespace).use_db(&database).await?;

        migrations::apply(&db).await?;

        Ok(Self { db, namespace, database })
    }
}
