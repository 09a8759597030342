//! Write operations for movie records.

use chrono::Datelike;
use movie_calendar_catalog::types::MovieRecord;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Entity already exists: {entity_type} with id '{id}'")]
    AlreadyExists { entity_type: String, id: String },
}

// ── Movie Operations ────────────────────────────────────────────────────────

/// Insert a new movie. Fails with `AlreadyExists` if the identity is taken.
pub fn insert_movie(conn: &Connection, movie: &MovieRecord) -> Result<(), OperationError> {
    let result = conn.execute(
        "INSERT INTO movies (id, title, release_date, release_year, source_url, description,
                             genres, poster_url, external_id, cross_reference_id, content_rating,
                             directors, cast_members, trailers, scraped_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            movie.id,
            movie.title,
            movie.release_date,
            movie.release_date.year(),
            movie.source_url,
            movie.description,
            serde_json::to_string(&movie.genres)?,
            movie.poster_url,
            movie.external_id as i64,
            movie.cross_reference_id,
            movie.content_rating,
            serde_json::to_string(&movie.directors)?,
            serde_json::to_string(&movie.cast)?,
            serde_json::to_string(&movie.trailers)?,
            movie.scraped_at,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(OperationError::AlreadyExists {
                entity_type: "movie".to_string(),
                id: movie.id.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Overwrite every stored field of an existing movie.
pub fn update_movie(conn: &Connection, movie: &MovieRecord) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE movies SET
             title = ?2,
             release_date = ?3,
             release_year = ?4,
             source_url = ?5,
             description = ?6,
             genres = ?7,
             poster_url = ?8,
             external_id = ?9,
             cross_reference_id = ?10,
             content_rating = ?11,
             directors = ?12,
             cast_members = ?13,
             trailers = ?14,
             scraped_at = ?15,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            movie.id,
            movie.title,
            movie.release_date,
            movie.release_date.year(),
            movie.source_url,
            movie.description,
            serde_json::to_string(&movie.genres)?,
            movie.poster_url,
            movie.external_id as i64,
            movie.cross_reference_id,
            movie.content_rating,
            serde_json::to_string(&movie.directors)?,
            serde_json::to_string(&movie.cast)?,
            serde_json::to_string(&movie.trailers)?,
            movie.scraped_at,
        ],
    )?;

    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "movie".to_string(),
            id: movie.id.clone(),
        });
    }
    Ok(())
}

/// Delete movies by identity. Unknown ids are ignored.
///
/// Returns the number of rows removed.
pub fn delete_movies(conn: &Connection, ids: &[String]) -> Result<usize, OperationError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM movies WHERE id = ?1")?;
        for id in ids {
            removed += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;
    Ok(removed)
}
