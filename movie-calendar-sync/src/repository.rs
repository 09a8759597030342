//! Persistence capability consumed by the reconciliation engine.

use std::collections::BTreeMap;
use std::path::Path;

use movie_calendar_catalog::types::MovieRecord;
use movie_calendar_db::{OperationError, SchemaError, operations, queries, schema};
use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Record already exists: {0}")]
    Duplicate(String),
    #[error("Record not found: {0}")]
    Missing(String),
}

/// Movie record store keyed by identity.
///
/// Implementations serialize their own writes; callers issue one logical
/// write per record.
#[allow(async_fn_in_trait)]
pub trait MovieRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<MovieRecord>, RepositoryError>;

    /// Every record whose release year is in `years`.
    async fn list_by_years(&self, years: &[i32]) -> Result<Vec<MovieRecord>, RepositoryError>;

    /// Identities of every record whose release year is in `years`.
    async fn ids_for_years(&self, years: &[i32]) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .list_by_years(years)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    async fn add(&self, record: &MovieRecord) -> Result<(), RepositoryError>;

    async fn update(&self, record: &MovieRecord) -> Result<(), RepositoryError>;

    /// Remove records by identity, ignoring unknown ids. Returns the number removed.
    async fn delete_many(&self, ids: &[String]) -> Result<usize, RepositoryError>;

    async fn has_records(&self) -> Result<bool, RepositoryError> {
        Ok(self.count().await? > 0)
    }

    async fn count(&self) -> Result<usize, RepositoryError>;
}

// ── In-memory ───────────────────────────────────────────────────────────────

/// Ordered in-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Mutex<BTreeMap<String, MovieRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = MovieRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
        }
    }

    /// All records ordered by identity.
    pub async fn snapshot(&self) -> Vec<MovieRecord> {
        self.records.lock().await.values().cloned().collect()
    }
}

impl MovieRepository for MemoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<MovieRecord>, RepositoryError> {
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn list_by_years(&self, years: &[i32]) -> Result<Vec<MovieRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|r| years.contains(&r.release_year()))
            .cloned()
            .collect())
    }

    async fn add(&self, record: &MovieRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.id) {
            return Err(RepositoryError::Duplicate(record.id.clone()));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &MovieRecord) -> Result<(), RepositoryError> {
        match self.records.lock().await.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::Missing(record.id.clone())),
        }
    }

    async fn delete_many(&self, ids: &[String]) -> Result<usize, RepositoryError> {
        let mut records = self.records.lock().await;
        Ok(ids.iter().filter(|id| records.remove(*id).is_some()).count())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().await.len())
    }
}

// ── SQLite ──────────────────────────────────────────────────────────────────

/// Store backed by the `movie-calendar-db` schema.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        Ok(Self::new(schema::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, RepositoryError> {
        Ok(Self::new(schema::open_memory()?))
    }

    /// Give back the connection, e.g. for read queries after a run.
    pub fn into_inner(self) -> Connection {
        self.conn.into_inner()
    }
}

impl MovieRepository for SqliteRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<MovieRecord>, RepositoryError> {
        let conn = self.conn.lock().await;
        Ok(queries::find_movie(&conn, id)?)
    }

    async fn list_by_years(&self, years: &[i32]) -> Result<Vec<MovieRecord>, RepositoryError> {
        let conn = self.conn.lock().await;
        Ok(queries::movies_for_years(&conn, years)?)
    }

    async fn ids_for_years(&self, years: &[i32]) -> Result<Vec<String>, RepositoryError> {
        let conn = self.conn.lock().await;
        Ok(queries::movie_ids_for_years(&conn, years)?)
    }

    async fn add(&self, record: &MovieRecord) -> Result<(), RepositoryError> {
        let conn = self.conn.lock().await;
        match operations::insert_movie(&conn, record) {
            Err(OperationError::AlreadyExists { id, .. }) => Err(RepositoryError::Duplicate(id)),
            other => Ok(other?),
        }
    }

    async fn update(&self, record: &MovieRecord) -> Result<(), RepositoryError> {
        let conn = self.conn.lock().await;
        match operations::update_movie(&conn, record) {
            Err(OperationError::NotFound { id, .. }) => Err(RepositoryError::Missing(id)),
            other => Ok(other?),
        }
    }

    async fn delete_many(&self, ids: &[String]) -> Result<usize, RepositoryError> {
        let conn = self.conn.lock().await;
        Ok(operations::delete_movies(&conn, ids)?)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let conn = self.conn.lock().await;
        Ok(queries::count_movies(&conn)?.max(0) as usize)
    }
}
