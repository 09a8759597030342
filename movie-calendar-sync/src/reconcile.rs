//! Scrape, enrich and reconcile release schedules into a movie store.
//!
//! For every requested year the engine fetches the schedule page, parses it
//! into entries, and for each new identity either stores a freshly enriched
//! record, re-enriches a stale one, or leaves a complete one alone. Once the
//! years are processed, stored records of the closed years that the run did
//! not see are deleted. A year is closed when its page was fully reconciled or
//! could not be fetched at all; a year cut short by cancellation or a store
//! error is not.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, Local, NaiveDate, Utc};
use movie_calendar_catalog::title::{parse_title, record_id};
use movie_calendar_catalog::types::{MovieRecord, ScheduleEntry, ScrapeOutcome};
use movie_calendar_tmdb::enrich::{EnrichContext, Enricher};
use thiserror::Error;

use crate::fetch::ScheduleSource;
use crate::parser::ScheduleParser;
use crate::progress::{SilentProgress, SyncProgress};
use crate::repository::{MovieRepository, RepositoryError};
use crate::status::RunStatus;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Run cancelled")]
    Cancelled,
}

/// Previous, current and next calendar year.
pub fn default_years(today: NaiveDate) -> Vec<i32> {
    let year = today.year();
    vec![year - 1, year, year + 1]
}

/// Per-run bookkeeping shared across years.
struct RunScope<'a> {
    ctx: EnrichContext,
    seen: HashSet<String>,
    /// Years whose stored records are subject to deletion.
    closed: Vec<i32>,
    outcome: ScrapeOutcome,
    cancel: &'a AtomicBool,
    progress: &'a dyn SyncProgress,
}

impl RunScope<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn record_error(&mut self, message: String) {
        self.outcome.error = Some(match self.outcome.error.take() {
            Some(existing) => format!("{existing}; {message}"),
            None => message,
        });
    }
}

/// Orchestrates fetch, parse, enrich and persistence for a set of years.
pub struct ReconciliationEngine<S, P, E, R> {
    source: S,
    parser: P,
    enricher: E,
    repository: R,
    status: RunStatus,
}

impl<S, P, E, R> ReconciliationEngine<S, P, E, R>
where
    S: ScheduleSource,
    P: ScheduleParser,
    E: Enricher,
    R: MovieRepository,
{
    pub fn new(source: S, parser: P, enricher: E, repository: R) -> Self {
        Self {
            source,
            parser,
            enricher,
            repository,
            status: RunStatus::new(),
        }
    }

    /// Report run state through an existing status handle.
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Reconcile the given years.
    pub async fn run(&self, years: &[i32]) -> ScrapeOutcome {
        let cancel = AtomicBool::new(false);
        self.run_with_progress(years, &cancel, &SilentProgress).await
    }

    /// Reconcile the given years, stopping early once `cancel` is set.
    pub async fn run_with_cancel(&self, years: &[i32], cancel: &AtomicBool) -> ScrapeOutcome {
        self.run_with_progress(years, cancel, &SilentProgress).await
    }

    /// Reconcile the given years, reporting progress as entries are processed.
    ///
    /// Always returns an outcome. Records committed before a failure or
    /// cancellation are reported, and `error` describes what went wrong.
    pub async fn run_with_progress(
        &self,
        years: &[i32],
        cancel: &AtomicBool,
        progress: &dyn SyncProgress,
    ) -> ScrapeOutcome {
        let _running = self.status.begin();

        let mut requested: Vec<i32> = Vec::with_capacity(years.len());
        for year in years {
            if !requested.contains(year) {
                requested.push(*year);
            }
        }
        if requested.is_empty() {
            log::warn!("No years provided for scraping. Returning empty results.");
            return ScrapeOutcome::default();
        }

        let mut run = RunScope {
            ctx: self.enricher.begin_run().await,
            seen: HashSet::new(),
            closed: Vec::new(),
            outcome: ScrapeOutcome::default(),
            cancel,
            progress,
        };

        for &year in &requested {
            if run.cancelled() {
                run.record_error(SyncError::Cancelled.to_string());
                break;
            }

            log::info!("Fetching release schedule for {}", year);
            let markup = match self.source.fetch_year(year).await {
                Ok(markup) => markup,
                Err(e) => {
                    log::error!("Skipping {}: {}", year, e);
                    run.closed.push(year);
                    continue;
                }
            };

            let entries = self.parser.parse(&markup, year);
            run.progress.on_year(year, entries.len());

            match self.reconcile_year(year, &entries, &mut run).await {
                Ok(()) => {
                    run.outcome.years_reconciled.push(year);
                    run.closed.push(year);
                }
                Err(SyncError::Cancelled) => {
                    log::warn!("Run cancelled while processing {}", year);
                    run.record_error(SyncError::Cancelled.to_string());
                    break;
                }
                Err(e) => {
                    log::error!("Reconciling {} failed: {}", year, e);
                    run.record_error(e.to_string());
                    break;
                }
            }
        }

        if !run.closed.is_empty() {
            match self.delete_missing(&run.closed, &run.seen).await {
                Ok(deleted) => run.outcome.deleted_ids = deleted,
                Err(e) => {
                    log::error!("Deleting removed titles failed: {}", e);
                    run.record_error(e.to_string());
                }
            }
        }

        let outcome = run.outcome;
        progress.on_complete(&format!(
            "Reconciled {} year(s): {} new, {} updated, {} deleted",
            outcome.years_reconciled.len(),
            outcome.new_records.len(),
            outcome.updated_records.len(),
            outcome.deleted_ids.len(),
        ));
        outcome
    }

    /// Run the default year window, but only when the store is empty.
    pub async fn seed_if_empty(&self) -> ScrapeOutcome {
        self.seed_if_empty_at(Local::now().date_naive()).await
    }

    /// [`seed_if_empty`](Self::seed_if_empty) relative to a fixed date.
    pub async fn seed_if_empty_at(&self, today: NaiveDate) -> ScrapeOutcome {
        match self.repository.has_records().await {
            Ok(true) => {
                log::info!("Movie store already populated, skipping seed");
                ScrapeOutcome::default()
            }
            Ok(false) => {
                let years = default_years(today);
                log::info!("Movie store is empty, seeding years {:?}", years);
                self.run(&years).await
            }
            Err(e) => {
                log::error!("Could not check movie store before seeding: {}", e);
                ScrapeOutcome {
                    error: Some(e.to_string()),
                    ..ScrapeOutcome::default()
                }
            }
        }
    }

    async fn reconcile_year(
        &self,
        year: i32,
        entries: &[ScheduleEntry],
        run: &mut RunScope<'_>,
    ) -> Result<(), SyncError> {
        let total = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            if run.cancelled() {
                return Err(SyncError::Cancelled);
            }
            run.progress.on_entry(i + 1, total, &entry.raw_title);
            self.reconcile_entry(year, entry, run).await?;
        }
        Ok(())
    }

    async fn reconcile_entry(
        &self,
        year: i32,
        entry: &ScheduleEntry,
        run: &mut RunScope<'_>,
    ) -> Result<(), SyncError> {
        let title = parse_title(&entry.raw_title);
        let id = record_id(&title.clean, entry.release_date);

        if !run.seen.insert(id.clone()) {
            log::debug!("Skipping duplicate entry: {}", id);
            return Ok(());
        }

        match self.repository.find_by_id(&id).await? {
            None => {
                let enrichment = self.enricher.enrich(&run.ctx, &title.clean, year).await;
                let record = MovieRecord::new(
                    id,
                    title.raw,
                    entry.release_date,
                    entry.link.clone(),
                    enrichment,
                    Utc::now(),
                );
                self.repository.add(&record).await?;
                log::info!("Stored: {} on {}", record.title, record.release_date);
                run.outcome.new_records.push(record);
            }
            Some(existing) if existing.is_stale() && run.ctx.is_disabled() => {
                log::debug!("Provider unavailable, leaving {} as is", existing.id);
            }
            Some(mut existing) if existing.is_stale() => {
                let enrichment = self.enricher.enrich(&run.ctx, &title.clean, year).await;
                if run.ctx.is_disabled() {
                    log::debug!("Provider unavailable, leaving {} as is", existing.id);
                    return Ok(());
                }
                let moved = existing.source_url != entry.link;
                existing.source_url = entry.link.clone();
                let enriched = existing.apply(enrichment, Utc::now());
                if !moved && !enriched {
                    log::debug!("No new metadata for {}", existing.id);
                    return Ok(());
                }
                self.repository.update(&existing).await?;
                log::info!(
                    "Updated existing movie: {} on {}",
                    existing.title,
                    existing.release_date
                );
                run.outcome.updated_records.push(existing);
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Delete stored records of `years` whose identity was not seen.
    async fn delete_missing(
        &self,
        years: &[i32],
        seen: &HashSet<String>,
    ) -> Result<Vec<String>, SyncError> {
        log::info!(
            "Looking for stored titles that no longer exist for years: {:?}",
            years
        );
        let stale_ids: Vec<String> = self
            .repository
            .ids_for_years(years)
            .await?
            .into_iter()
            .filter(|id| !seen.contains(id))
            .collect();

        if stale_ids.is_empty() {
            return Ok(stale_ids);
        }

        let removed = self.repository.delete_many(&stale_ids).await?;
        log::info!(
            "Deleted {} title(s) no longer on the schedule (removed, renamed, etc.)",
            removed
        );
        for id in &stale_ids {
            log::debug!("Deleted {}", id);
        }
        Ok(stale_ids)
    }
}
