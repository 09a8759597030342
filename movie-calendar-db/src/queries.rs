//! Read queries for the movie database.
//!
//! Provides lookup by identity, year-window listing, search, and statistics.

use movie_calendar_catalog::types::MovieRecord;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, params, params_from_iter};
use serde::de::DeserializeOwned;

use crate::operations::OperationError;

const MOVIE_COLUMNS: &str = "id, title, release_date, source_url, description, genres,
     poster_url, external_id, cross_reference_id, content_rating, directors,
     cast_members, trailers, scraped_at";

// ── Movie Lookups ───────────────────────────────────────────────────────────

/// Find a movie by identity.
pub fn find_movie(conn: &Connection, id: &str) -> Result<Option<MovieRecord>, OperationError> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], row_to_movie);
    match result {
        Ok(movie) => Ok(Some(movie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List all movies released in one year, ordered by release date then title.
pub fn movies_for_year(conn: &Connection, year: i32) -> Result<Vec<MovieRecord>, OperationError> {
    movies_for_years(conn, &[year])
}

/// List all movies whose release year is in `years`.
pub fn movies_for_years(
    conn: &Connection,
    years: &[i32],
) -> Result<Vec<MovieRecord>, OperationError> {
    if years.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE release_year IN ({})
         ORDER BY release_date, title",
        placeholders(years.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(years.iter()), row_to_movie)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Identities of all movies whose release year is in `years`.
pub fn movie_ids_for_years(conn: &Connection, years: &[i32]) -> Result<Vec<String>, OperationError> {
    if years.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id FROM movies WHERE release_year IN ({}) ORDER BY id",
        placeholders(years.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(years.iter()), |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Total number of stored movies.
pub fn count_movies(conn: &Connection) -> Result<i64, OperationError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
    Ok(count)
}

// ── Search ──────────────────────────────────────────────────────────────────

/// Optional filters for [`search_movies`]. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Case-insensitive partial title match.
    pub query: Option<String>,
    /// Exact genre name (case-insensitive).
    pub genre: Option<String>,
    /// Partial director name.
    pub director: Option<String>,
    /// Partial cast member name.
    pub cast: Option<String>,
    /// Exact content rating, e.g. `PG-13`.
    pub rating: Option<String>,
    pub year: Option<i32>,
    /// Calendar month, 1-12.
    pub month: Option<u32>,
    /// Exact cross-reference id (IMDb).
    pub cross_reference_id: Option<String>,
    /// Maximum number of rows, defaults to 100.
    pub limit: Option<usize>,
}

/// Search movies by any combination of criteria, ordered by release date.
pub fn search_movies(
    conn: &Connection,
    criteria: &SearchCriteria,
) -> Result<Vec<MovieRecord>, OperationError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(q) = non_blank(&criteria.query) {
        clauses.push("LOWER(title) LIKE LOWER(?)");
        values.push(Value::Text(format!("%{}%", q)));
    }
    if let Some(genre) = non_blank(&criteria.genre) {
        clauses.push("EXISTS (SELECT 1 FROM json_each(movies.genres) WHERE LOWER(value) = LOWER(?))");
        values.push(Value::Text(genre.to_string()));
    }
    if let Some(director) = non_blank(&criteria.director) {
        clauses.push(
            "EXISTS (SELECT 1 FROM json_each(movies.directors) WHERE LOWER(value) LIKE LOWER(?))",
        );
        values.push(Value::Text(format!("%{}%", director)));
    }
    if let Some(cast) = non_blank(&criteria.cast) {
        clauses.push(
            "EXISTS (SELECT 1 FROM json_each(movies.cast_members) WHERE LOWER(value) LIKE LOWER(?))",
        );
        values.push(Value::Text(format!("%{}%", cast)));
    }
    if let Some(rating) = non_blank(&criteria.rating) {
        clauses.push("UPPER(content_rating) = UPPER(?)");
        values.push(Value::Text(rating.to_string()));
    }
    if let Some(year) = criteria.year {
        clauses.push("release_year = ?");
        values.push(Value::Integer(year as i64));
    }
    if let Some(month) = criteria.month {
        clauses.push("CAST(strftime('%m', release_date) AS INTEGER) = ?");
        values.push(Value::Integer(month as i64));
    }
    if let Some(xref) = non_blank(&criteria.cross_reference_id) {
        clauses.push("cross_reference_id = ?");
        values.push(Value::Text(xref.to_string()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let limit = criteria.limit.unwrap_or(100);
    values.push(Value::Integer(limit as i64));

    let sql = format!(
        "SELECT {MOVIE_COLUMNS} FROM movies {where_sql} ORDER BY release_date, title LIMIT ?"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), row_to_movie)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary statistics for the movie database.
#[derive(Debug, Default)]
pub struct CatalogStats {
    pub movies: i64,
    /// Movies the metadata provider never matched.
    pub unresolved: i64,
    /// Movie count per release year, ascending.
    pub per_year: Vec<(i32, i64)>,
}

/// Get summary statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let movies = count_movies(conn)?;
    let unresolved: i64 = conn.query_row(
        "SELECT COUNT(*) FROM movies WHERE external_id = 0",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT release_year, COUNT(*) FROM movies GROUP BY release_year ORDER BY release_year",
    )?;
    let per_year = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CatalogStats {
        movies,
        unresolved,
        per_year,
    })
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_movie(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovieRecord> {
    let external_id: i64 = row.get(7)?;
    Ok(MovieRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        release_date: row.get(2)?,
        source_url: row.get(3)?,
        description: row.get(4)?,
        genres: json_column(row, 5)?,
        poster_url: row.get(6)?,
        external_id: external_id.max(0) as u64,
        cross_reference_id: row.get(8)?,
        content_rating: row.get(9)?,
        directors: json_column(row, 10)?,
        cast: json_column(row, 11)?,
        trailers: json_column(row, 12)?,
        scraped_at: row.get(13)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
