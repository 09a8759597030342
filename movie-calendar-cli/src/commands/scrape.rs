use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use movie_calendar_catalog::ScrapeOutcome;
use movie_calendar_sync::{
    DEFAULT_SCHEDULE_BASE_URL, FirstShowingParser, HttpScheduleFetcher, LogProgress,
    MovieRepository, ReconciliationEngine, SqliteRepository, default_years,
};
use movie_calendar_tmdb::{DEFAULT_BASE_URL, Settings, TmdbClient, TmdbEnricher};

use crate::CliError;
use crate::cli_types::RunArgs;
use crate::spinner::BarProgress;

use super::resolve_db_path;

type Engine = ReconciliationEngine<
    HttpScheduleFetcher,
    FirstShowingParser,
    TmdbEnricher<TmdbClient>,
    SqliteRepository,
>;

/// Reconcile the requested years (or the default window) into the database.
pub(crate) fn run_scrape(
    years: Option<Vec<i32>>,
    run: RunArgs,
    db: Option<PathBuf>,
) -> Result<(), CliError> {
    let years = years.unwrap_or_else(|| default_years(chrono::Local::now().date_naive()));
    let engine = build_engine(&run, db)?;

    log::info!(
        "{} {}",
        "Reconciling release schedules for".if_supports_color(Stdout, |t| t.bold()),
        join_years(&years).if_supports_color(Stdout, |t| t.cyan()),
    );
    crate::log_blank();

    let rt = crate::runtime()?;
    let outcome = rt.block_on(async {
        let cancel = watch_interrupt();
        if run.no_progress {
            engine.run_with_progress(&years, &cancel, &LogProgress).await
        } else {
            let bar = BarProgress::new(log::max_level() < log::LevelFilter::Info);
            let outcome = engine.run_with_progress(&years, &cancel, &bar).await;
            bar.clear();
            outcome
        }
    });

    print_summary(&outcome);
    finish(outcome)
}

/// Run the default window, but only if the database holds no movies.
pub(crate) fn run_seed(run: RunArgs, db: Option<PathBuf>) -> Result<(), CliError> {
    let engine = build_engine(&run, db)?;
    let rt = crate::runtime()?;

    let outcome = rt.block_on(async {
        match engine.repository().count().await {
            Ok(n) if n > 0 => {
                log::info!(
                    "Database already holds {} movie(s), nothing to seed.",
                    n.if_supports_color(Stdout, |t| t.bold()),
                );
                None
            }
            _ => Some(engine.seed_if_empty().await),
        }
    });

    match outcome {
        Some(outcome) => {
            print_summary(&outcome);
            finish(outcome)
        }
        None => Ok(()),
    }
}

fn build_engine(run: &RunArgs, db: Option<PathBuf>) -> Result<Engine, CliError> {
    let settings = Settings::load().with_overrides(run.api_key.clone(), db);
    let db_path = resolve_db_path(&settings)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if settings.api_key.is_none() {
        log::warn!(
            "{} No TMDb API key configured; movies will be stored without metadata.",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
        );
        log::warn!("  Set TMDB_APIKEY or run 'movie-calendar config set-key <KEY>'.");
    }

    let client = TmdbClient::with_base_url(
        settings.api_key.clone(),
        settings.tmdb_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
    )
    .map_err(|e| CliError::config(format!("Failed to create TMDb client: {}", e)))?;

    let fetcher = HttpScheduleFetcher::with_base_url(
        settings
            .schedule_base_url
            .as_deref()
            .unwrap_or(DEFAULT_SCHEDULE_BASE_URL),
    )
    .map_err(|e| CliError::config(format!("Failed to create schedule fetcher: {}", e)))?;

    let repository = SqliteRepository::open(&db_path)
        .map_err(|e| CliError::database(format!("Failed to open movie database: {}", e)))?;
    log::debug!("Using movie database at {}", db_path.display());

    Ok(ReconciliationEngine::new(
        fetcher,
        FirstShowingParser,
        TmdbEnricher::new(client),
        repository,
    ))
}

/// Set the returned flag on Ctrl-C so the engine stops at the next entry.
fn watch_interrupt() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current entry...");
            flag.store(true, Ordering::Relaxed);
        }
    });
    cancel
}

fn finish(outcome: ScrapeOutcome) -> Result<(), CliError> {
    match outcome.error {
        Some(e) => Err(CliError::sync(e)),
        None => Ok(()),
    }
}

fn join_years(years: &[i32]) -> String {
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(outcome: &ScrapeOutcome) {
    for movie in &outcome.new_records {
        log::info!(
            "  {} {} ({})",
            "+".if_supports_color(Stdout, |t| t.green()),
            movie.title,
            movie.release_date,
        );
    }
    for movie in &outcome.updated_records {
        log::info!(
            "  {} {} ({})",
            "~".if_supports_color(Stdout, |t| t.yellow()),
            movie.title,
            movie.release_date,
        );
    }
    for id in &outcome.deleted_ids {
        log::info!("  {} {}", "-".if_supports_color(Stdout, |t| t.red()), id);
    }
    if !outcome.is_unchanged() {
        crate::log_blank();
    }

    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  Years reconciled: {}",
        if outcome.years_reconciled.is_empty() {
            "none".to_string()
        } else {
            join_years(&outcome.years_reconciled)
        },
    );
    log::info!(
        "  {:>5} new",
        outcome
            .new_records
            .len()
            .if_supports_color(Stdout, |t| t.green()),
    );
    log::info!(
        "  {:>5} updated",
        outcome
            .updated_records
            .len()
            .if_supports_color(Stdout, |t| t.yellow()),
    );
    log::info!(
        "  {:>5} deleted",
        outcome
            .deleted_ids
            .len()
            .if_supports_color(Stdout, |t| t.red()),
    );
    if let Some(error) = &outcome.error {
        log::warn!(
            "  {}",
            format!("Run ended early: {}", error).if_supports_color(Stdout, |t| t.red()),
        );
    }
}
