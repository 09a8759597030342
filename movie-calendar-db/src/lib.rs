//! SQLite persistence layer for the movie catalog.
//!
//! Provides schema creation, CRUD operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{OperationError, delete_movies, insert_movie, update_movie};
pub use queries::{
    CatalogStats, SearchCriteria, catalog_stats, count_movies, find_movie, movie_ids_for_years,
    movies_for_year, movies_for_years, search_movies,
};
pub use schema::{SchemaError, open_database, open_memory};
