pub(crate) mod config;
pub(crate) mod list;
pub(crate) mod scrape;

use std::path::PathBuf;

use movie_calendar_tmdb::Settings;
use rusqlite::Connection;

use crate::CliError;

/// Database path from the flag, the config file, or the per-user default.
pub(crate) fn resolve_db_path(settings: &Settings) -> Result<PathBuf, CliError> {
    settings
        .database_path_or_default()
        .ok_or_else(|| CliError::config("Could not determine a data directory; pass --db"))
}

/// Open the database read-side, or `None` when it has not been created yet.
pub(crate) fn open_existing(db: Option<PathBuf>) -> Result<Option<Connection>, CliError> {
    let settings = Settings::load().with_overrides(None, db);
    let path = resolve_db_path(&settings)?;

    if !path.exists() {
        log::warn!("No movie database found at {}", path.display());
        log::info!("Run 'movie-calendar seed' or 'movie-calendar scrape' to create one.");
        return Ok(None);
    }

    movie_calendar_db::open_database(&path)
        .map(Some)
        .map_err(|e| CliError::database(format!("Failed to open movie database: {}", e)))
}
