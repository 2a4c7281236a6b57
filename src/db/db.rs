// db/db.rs
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::models::tokenizationmodel::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record {0} already exists")]
    Duplicate(String),

    #[error("Record {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[derive(Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("pool", &"Pool<Postgres>")
            .field("size", &self.pool.size())
            .finish()
    }
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("✅ Connection to the database is successful, migrations applied");

        Ok(DBClient::new(pool))
    }
}

/// Maps a unique-constraint violation on insert to [`StoreError::Duplicate`].
pub(crate) fn map_insert_error(err: sqlx::Error, id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(id.to_string())
        }
        _ => StoreError::Database(err),
    }
}
