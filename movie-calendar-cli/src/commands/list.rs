use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use movie_calendar_catalog::MovieRecord;
use movie_calendar_db::SearchCriteria;

use crate::CliError;
use crate::cli_types::SearchArgs;

use super::open_existing;

/// List one year's movies, or per-year totals when no year is given.
pub(crate) fn run_list(year: Option<i32>, db: Option<PathBuf>) -> Result<(), CliError> {
    let Some(conn) = open_existing(db)? else {
        return Ok(());
    };

    let Some(year) = year else {
        let stats = movie_calendar_db::catalog_stats(&conn)
            .map_err(|e| CliError::database(format!("Failed to query movie stats: {}", e)))?;

        log::info!("{}", "Movie Database".if_supports_color(Stdout, |t| t.bold()));
        crate::log_blank();
        for (year, count) in &stats.per_year {
            log::info!("  {}:  {:>6}", year, count);
        }
        crate::log_blank();
        log::info!("  Total:       {:>6}", stats.movies);
        log::info!(
            "  Incomplete:  {:>6} {}",
            stats.unresolved,
            "(missing metadata)".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    };

    let movies = movie_calendar_db::movies_for_year(&conn, year)
        .map_err(|e| CliError::database(format!("Failed to list movies: {}", e)))?;

    log::info!(
        "{}",
        format!("Releases in {}", year).if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();
    print_rows(&movies);
    Ok(())
}

/// Print every stored field of one movie.
pub(crate) fn run_show(id: &str, db: Option<PathBuf>) -> Result<(), CliError> {
    let Some(conn) = open_existing(db)? else {
        return Ok(());
    };

    let movie = movie_calendar_db::find_movie(&conn, id)
        .map_err(|e| CliError::database(format!("Failed to look up movie: {}", e)))?
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    log::info!("{}", movie.title.if_supports_color(Stdout, |t| t.bold()));
    log::info!("  {}", movie.id.if_supports_color(Stdout, |t| t.dimmed()));
    crate::log_blank();

    let field = |name: &str, value: String| {
        let shown = if value.is_empty() {
            "-".to_string()
        } else {
            value
        };
        log::info!(
            "  {} {}",
            format!("{:<13}", format!("{}:", name)).if_supports_color(Stdout, |t| t.cyan()),
            shown,
        );
    };

    field("Release date", movie.release_date.to_string());
    field("Rating", movie.content_rating.clone());
    field("Genres", movie.genres.join(", "));
    field("Directors", movie.directors.join(", "));
    field("Cast", movie.cast.join(", "));
    field(
        "TMDb id",
        if movie.external_id == 0 {
            String::new()
        } else {
            movie.external_id.to_string()
        },
    );
    field("IMDb id", movie.cross_reference_id.clone());
    field("Poster", movie.poster_url.clone());
    field("Source", movie.source_url.clone());
    field("Updated", movie.scraped_at.format("%Y-%m-%d %H:%M UTC").to_string());
    crate::log_blank();
    log::info!("  {}", movie.description);

    if !movie.trailers.is_empty() {
        crate::log_blank();
        log::info!("  {}", "Trailers:".if_supports_color(Stdout, |t| t.bold()));
        for trailer in &movie.trailers {
            log::info!(
                "    {} {}",
                trailer.name,
                trailer.url.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    if movie.is_stale() {
        crate::log_blank();
        log::info!(
            "  {}",
            "Metadata incomplete; the next scrape will retry enrichment."
                .if_supports_color(Stdout, |t| t.yellow()),
        );
    }

    Ok(())
}

/// Search stored movies by any combination of filters.
pub(crate) fn run_search(args: SearchArgs, db: Option<PathBuf>) -> Result<(), CliError> {
    let Some(conn) = open_existing(db)? else {
        return Ok(());
    };

    let criteria = SearchCriteria {
        query: args.query,
        genre: args.genre,
        director: args.director,
        cast: args.cast,
        rating: args.rating,
        year: args.year,
        month: args.month,
        cross_reference_id: args.imdb,
        limit: args.limit,
    };

    let movies = movie_calendar_db::search_movies(&conn, &criteria)
        .map_err(|e| CliError::database(format!("Search failed: {}", e)))?;

    print_rows(&movies);
    if !movies.is_empty() {
        crate::log_blank();
        log::info!(
            "{}",
            format!("{} result(s)", movies.len()).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

fn print_rows(movies: &[MovieRecord]) {
    if movies.is_empty() {
        log::info!(
            "  {}",
            "No movies found".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return;
    }

    for movie in movies {
        let rating = if movie.content_rating.is_empty() {
            String::new()
        } else {
            format!(" [{}]", movie.content_rating)
        };
        log::info!(
            "  {}  {}{}  {}",
            movie.release_date.if_supports_color(Stdout, |t| t.cyan()),
            movie.title.if_supports_color(Stdout, |t| t.bold()),
            rating,
            movie.id.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}
