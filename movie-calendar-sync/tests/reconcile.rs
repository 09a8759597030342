use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{NaiveDate, Utc};
use movie_calendar_catalog::types::{Enrichment, MovieRecord, TrailerLink};
use movie_calendar_sync::*;
use movie_calendar_tmdb::types::{
    CreditsResponse, Genre, MovieDetails, ReleaseDatesResponse, SearchResponse, VideosResponse,
};
use movie_calendar_tmdb::{
    EnrichContext, Enricher, MetadataProvider, POSTER_BASE_URL, TmdbEnricher, TmdbError,
};

// ── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSource {
    pages: HashMap<i32, String>,
    fetched: Mutex<Vec<i32>>,
}

impl FakeSource {
    fn with_page(year: i32, markup: &str) -> Self {
        let mut source = Self::default();
        source.pages.insert(year, markup.to_string());
        source
    }

    fn fetched(&self) -> Vec<i32> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ScheduleSource for FakeSource {
    async fn fetch_year(&self, year: i32) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(year);
        self.pages
            .get(&year)
            .cloned()
            .ok_or(FetchError::Status { year, status: 503 })
    }
}

fn complete_enrichment(title: &str) -> Enrichment {
    Enrichment {
        external_id: 100,
        description: format!("{title} overview"),
        genres: vec!["Drama".to_string()],
        poster_url: format!("{POSTER_BASE_URL}/x.jpg"),
        cross_reference_id: "tt0000100".to_string(),
        content_rating: "PG".to_string(),
        directors: vec!["Jane Roe".to_string()],
        cast: vec!["John Doe".to_string()],
        trailers: vec![TrailerLink {
            name: "Trailer".to_string(),
            url: "https://www.youtube.com/watch?v=t".to_string(),
            site: "YouTube".to_string(),
            published_at: None,
        }],
    }
}

/// Enricher that resolves every title completely.
#[derive(Default)]
struct CompleteEnricher {
    calls: AtomicUsize,
    cancel_after_first: Option<Arc<AtomicBool>>,
    status_check: Option<(RunStatus, Arc<AtomicBool>)>,
}

impl CompleteEnricher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Enricher for &CompleteEnricher {
    async fn begin_run(&self) -> EnrichContext {
        EnrichContext::default()
    }

    async fn enrich(&self, _ctx: &EnrichContext, title: &str, _year: i32) -> Enrichment {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = &self.cancel_after_first {
            cancel.store(true, Ordering::SeqCst);
        }
        if let Some((status, saw_running)) = &self.status_check {
            saw_running.store(status.is_running(), Ordering::SeqCst);
        }
        complete_enrichment(title)
    }
}

/// Provider with a genre table, canned searches and a request counter.
#[derive(Default)]
struct FakeProvider {
    genres: Vec<Genre>,
    search: HashMap<String, SearchResponse>,
    search_status: Option<u16>,
    requests: AtomicUsize,
}

impl FakeProvider {
    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl MetadataProvider for FakeProvider {
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        self.hit();
        Ok(self.genres.clone())
    }

    async fn search_movies(&self, query: &str, _year: i32) -> Result<SearchResponse, TmdbError> {
        self.hit();
        if let Some(status) = self.search_status {
            return Err(TmdbError::Unauthorized(status));
        }
        Ok(self.search.get(query).cloned().unwrap_or_default())
    }

    async fn credits(&self, _id: u64) -> Result<CreditsResponse, TmdbError> {
        self.hit();
        Ok(CreditsResponse::default())
    }

    async fn details(&self, _id: u64) -> Result<MovieDetails, TmdbError> {
        self.hit();
        Ok(MovieDetails::default())
    }

    async fn release_dates(&self, _id: u64) -> Result<ReleaseDatesResponse, TmdbError> {
        self.hit();
        Ok(ReleaseDatesResponse::default())
    }

    async fn videos(&self, _id: u64) -> Result<VideosResponse, TmdbError> {
        self.hit();
        Ok(VideosResponse::default())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn page(date: &str, titles: &[&str]) -> String {
    let mut html = format!("<h4><strong>{date}</strong> (Friday)</h4><p class='sched'>");
    for title in titles {
        html.push_str(&format!(
            "<a class='showTip' href='//example.com/{}'><strong>{}</strong></a><br />",
            title.to_lowercase().replace(' ', "-"),
            title
        ));
    }
    html.push_str("</p>");
    html
}

fn stored(title: &str, date: NaiveDate, enrichment: Enrichment) -> MovieRecord {
    MovieRecord::new(
        movie_calendar_catalog::record_id(title, date),
        title,
        date,
        "https://example.com/old",
        enrichment,
        Utc::now(),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn ids(repo: &MemoryRepository) -> Vec<String> {
    repo.snapshot().await.into_iter().map(|r| r.id).collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn example_page_produces_one_enriched_record() {
    let html = "<h4><strong>January 24</strong> (Friday)</h4>\
        <p style='margin-top:2px' class='sched'><a class='showTip' href='//example.com/' \
        data-url='//example.com/test.jpg'><strong>Test Movie</strong></a><br />";
    let search: SearchResponse = serde_json::from_str(
        r#"{"results":[{"title":"Test Movie","overview":"A test movie.","genre_ids":[1],"poster_path":"/poster.jpg","release_date":"2024-01-24"}],"total_results":1}"#,
    )
    .unwrap();
    let mut searches = HashMap::new();
    searches.insert("Test Movie".to_string(), search);
    let provider = FakeProvider {
        genres: vec![Genre {
            id: 1,
            name: "Action".to_string(),
        }],
        search: searches,
        ..Default::default()
    };

    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, html),
        FirstShowingParser,
        TmdbEnricher::new(&provider),
        MemoryRepository::new(),
    );
    let outcome = engine.run(&[2024]).await;

    assert!(!outcome.has_error(), "{:?}", outcome.error);
    assert_eq!(outcome.new_records.len(), 1);
    let movie = &outcome.new_records[0];
    assert_eq!(movie.id, "testmovie_2024-01-24");
    assert_eq!(movie.title, "Test Movie");
    assert_eq!(movie.genres, vec!["Action"]);
    assert_eq!(movie.poster_url, format!("{POSTER_BASE_URL}/poster.jpg"));
    assert_eq!(movie.source_url, "https://example.com/");
    assert_eq!(movie.description, "A test movie.");
    assert_eq!(engine.repository().count().await.unwrap(), 1);
}

#[tokio::test]
async fn second_run_over_unchanged_source_changes_nothing() {
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist", "Wicked"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );

    let first = engine.run(&[2024]).await;
    assert_eq!(first.new_records.len(), 2);
    assert_eq!(enricher.calls(), 2);

    let second = engine.run(&[2024]).await;
    assert!(second.is_unchanged());
    assert!(second.new_records.is_empty());
    assert!(second.updated_records.is_empty());
    assert_eq!(enricher.calls(), 2);
    assert_eq!(second.years_reconciled, vec![2024]);
}

#[tokio::test]
async fn stale_record_is_re_enriched() {
    let existing = stored("Heist", date(2024, 3, 1), Enrichment::unresolved());
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([existing]),
    );

    let outcome = engine.run(&[2024]).await;

    assert!(outcome.new_records.is_empty());
    assert_eq!(outcome.updated_records.len(), 1);
    let updated = &outcome.updated_records[0];
    assert_eq!(updated.external_id, 100);
    assert_eq!(updated.source_url, "https://example.com/heist");
    assert!(!updated.is_stale());

    let persisted = engine.repository().find_by_id(&updated.id).await.unwrap().unwrap();
    assert_eq!(&persisted, updated);
}

#[tokio::test]
async fn complete_record_is_left_untouched() {
    let existing = stored("Heist", date(2024, 3, 1), complete_enrichment("Heist"));
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([existing.clone()]),
    );

    let outcome = engine.run(&[2024]).await;

    assert!(outcome.is_unchanged());
    assert_eq!(enricher.calls(), 0);
    assert_eq!(
        engine.repository().find_by_id(&existing.id).await.unwrap(),
        Some(existing)
    );
}

#[tokio::test]
async fn deletion_is_confined_to_requested_years() {
    let gone = stored("Cancelled Film", date(2024, 5, 1), complete_enrichment("x"));
    let other_year = stored("Old Film", date(2023, 5, 1), complete_enrichment("y"));
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([gone.clone(), other_year.clone()]),
    );

    let outcome = engine.run(&[2024]).await;

    assert_eq!(outcome.deleted_ids, vec![gone.id.clone()]);
    let remaining = ids(engine.repository()).await;
    assert!(remaining.contains(&other_year.id));
    assert!(!remaining.contains(&gone.id));
    assert!(remaining.contains(&"heist_2024-03-01".to_string()));
}

#[tokio::test]
async fn failed_fetch_year_counts_as_empty() {
    let removed = stored("Removed", date(2025, 6, 6), complete_enrichment("r"));
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([removed.clone()]),
    );

    let outcome = engine.run(&[2024, 2025]).await;

    assert!(!outcome.has_error());
    assert_eq!(engine.source().fetched(), vec![2024, 2025]);
    assert_eq!(outcome.years_reconciled, vec![2024]);
    assert_eq!(outcome.deleted_ids, vec!["removed_2025-06-06".to_string()]);
    assert_eq!(ids(engine.repository()).await, vec!["heist_2024-03-01"]);
}

#[tokio::test]
async fn unreached_years_are_not_deleted() {
    let cancel = Arc::new(AtomicBool::new(false));
    let next_year = stored("Sequel", date(2025, 6, 6), complete_enrichment("s"));
    let enricher = CompleteEnricher {
        cancel_after_first: Some(Arc::clone(&cancel)),
        ..Default::default()
    };
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([next_year.clone()]),
    );

    let outcome = engine.run_with_cancel(&[2024, 2025], &cancel).await;

    assert!(outcome.has_error());
    assert_eq!(outcome.years_reconciled, vec![2024]);
    assert_eq!(engine.source().fetched(), vec![2024]);
    assert!(outcome.deleted_ids.is_empty());
    assert!(ids(engine.repository()).await.contains(&next_year.id));
}

#[tokio::test]
async fn struck_through_entry_produces_no_record() {
    let html = "<h4><strong>May 3</strong></h4><p class='sched'>\
        <a href='//a.test/m'><strong><s>Moved Movie</s></strong></a><br /></p>";
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, html),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );

    let outcome = engine.run(&[2024]).await;

    assert!(outcome.new_records.is_empty());
    assert_eq!(enricher.calls(), 0);
    assert_eq!(engine.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_groups_store_one_record() {
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("October 4", &["Joker", "Joker", "JOKER!"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );

    let outcome = engine.run(&[2024]).await;

    assert_eq!(outcome.new_records.len(), 1);
    assert_eq!(enricher.calls(), 1);
    assert_eq!(ids(engine.repository()).await, vec!["joker_2024-10-04"]);
}

#[tokio::test]
async fn auth_failure_stops_provider_calls_for_rest_of_run() {
    let provider = FakeProvider {
        search_status: Some(401),
        ..Default::default()
    };
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist", "Wicked", "Sinners"])),
        FirstShowingParser,
        TmdbEnricher::new(&provider),
        MemoryRepository::new(),
    );

    let outcome = engine.run(&[2024]).await;

    // genre list + the one search that tripped the breaker
    assert_eq!(provider.requests(), 2);
    assert_eq!(outcome.new_records.len(), 3);
    assert!(outcome.new_records.iter().all(|r| r.external_id == 0));
    assert!(outcome.new_records.iter().all(|r| r.is_stale()));
    assert!(!outcome.has_error());
}

#[tokio::test]
async fn auth_failure_leaves_stale_records_untouched() {
    let mut partial = complete_enrichment("Heist");
    partial.trailers.clear();
    let existing = stored("Heist", date(2024, 3, 1), partial);
    assert!(existing.is_stale());
    let provider = FakeProvider {
        search_status: Some(401),
        ..Default::default()
    };
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist", "Wicked"])),
        FirstShowingParser,
        TmdbEnricher::new(&provider),
        MemoryRepository::with_records([existing.clone()]),
    );

    let outcome = engine.run(&[2024]).await;

    assert!(!outcome.has_error());
    assert!(outcome.updated_records.is_empty());
    assert_eq!(outcome.new_records.len(), 1);
    let persisted = engine.repository().find_by_id(&existing.id).await.unwrap();
    assert_eq!(persisted, Some(existing));
}

#[tokio::test]
async fn empty_year_list_returns_empty_outcome() {
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::default(),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );

    let outcome = engine.run(&[]).await;

    assert!(outcome.is_unchanged());
    assert!(outcome.error.is_none());
    assert!(outcome.years_reconciled.is_empty());
    assert!(engine.source().fetched().is_empty());
}

#[tokio::test]
async fn cancelled_before_start_does_nothing() {
    let existing = stored("Cancelled Film", date(2024, 5, 1), complete_enrichment("x"));
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([existing]),
    );
    let cancel = AtomicBool::new(true);

    let outcome = engine.run_with_cancel(&[2024], &cancel).await;

    assert!(outcome.has_error());
    assert!(outcome.deleted_ids.is_empty());
    assert_eq!(engine.repository().count().await.unwrap(), 1);
}

#[tokio::test]
async fn cancellation_mid_year_keeps_committed_work_and_skips_deletion() {
    let cancel = Arc::new(AtomicBool::new(false));
    let existing = stored("Cancelled Film", date(2024, 5, 1), complete_enrichment("x"));
    let enricher = CompleteEnricher {
        cancel_after_first: Some(Arc::clone(&cancel)),
        ..Default::default()
    };
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist", "Wicked", "Sinners"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([existing.clone()]),
    );

    let outcome = engine.run_with_cancel(&[2024], &cancel).await;

    assert!(outcome.has_error());
    assert_eq!(outcome.new_records.len(), 1);
    assert!(outcome.years_reconciled.is_empty());
    assert!(outcome.deleted_ids.is_empty());
    assert!(ids(engine.repository()).await.contains(&existing.id));
}

#[tokio::test]
async fn seed_runs_default_window_only_when_empty() {
    let mut source = FakeSource::default();
    for year in [2025, 2026, 2027] {
        source.pages.insert(year, page("July 4", &[&format!("Film {year}")]));
    }
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        source,
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );
    let today = date(2026, 10, 19);

    let seeded = engine.seed_if_empty_at(today).await;
    assert_eq!(seeded.new_records.len(), 3);
    assert_eq!(seeded.years_reconciled, vec![2025, 2026, 2027]);

    let again = engine.seed_if_empty_at(today).await;
    assert!(again.is_unchanged());
    assert!(again.years_reconciled.is_empty());
}

#[tokio::test]
async fn seed_skips_fetching_when_populated() {
    let existing = stored("Heist", date(2024, 3, 1), complete_enrichment("Heist"));
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::default(),
        FirstShowingParser,
        &enricher,
        MemoryRepository::with_records([existing]),
    );

    engine.seed_if_empty_at(date(2026, 1, 1)).await;

    assert!(engine.source().fetched().is_empty());
    assert_eq!(engine.repository().count().await.unwrap(), 1);
}

#[tokio::test]
async fn status_reports_running_only_during_run() {
    let status = RunStatus::new();
    let saw_running = Arc::new(AtomicBool::new(false));
    let enricher = CompleteEnricher {
        status_check: Some((status.clone(), Arc::clone(&saw_running))),
        ..Default::default()
    };
    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    )
    .with_status(status.clone());

    assert_eq!(status.state(), RunState::Idle);
    engine.run(&[2024]).await;

    assert!(saw_running.load(Ordering::SeqCst));
    assert_eq!(status.state(), RunState::Idle);
}

#[tokio::test]
async fn years_are_fetched_in_order_once() {
    let enricher = CompleteEnricher::default();
    let engine = ReconciliationEngine::new(
        FakeSource::default(),
        FirstShowingParser,
        &enricher,
        MemoryRepository::new(),
    );

    engine.run(&[2025, 2024, 2025]).await;

    assert_eq!(engine.source().fetched(), vec![2025, 2024]);
}

#[tokio::test]
async fn sqlite_store_round_trip_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movies.db");
    let enricher = CompleteEnricher::default();

    {
        let engine = ReconciliationEngine::new(
            FakeSource::with_page(2024, &page("March 1", &["Heist", "Wicked"])),
            FirstShowingParser,
            &enricher,
            SqliteRepository::open(&path).unwrap(),
        );
        let first = engine.run(&[2024]).await;
        assert_eq!(first.new_records.len(), 2);
    }

    let engine = ReconciliationEngine::new(
        FakeSource::with_page(2024, &page("March 1", &["Heist"])),
        FirstShowingParser,
        &enricher,
        SqliteRepository::open(&path).unwrap(),
    );
    let second = engine.run(&[2024]).await;
    assert!(second.new_records.is_empty());
    assert!(second.updated_records.is_empty());
    assert_eq!(second.deleted_ids, vec!["wicked_2024-03-01".to_string()]);

    let conn = engine.into_repository().into_inner();
    let heist = movie_calendar_db::find_movie(&conn, "heist_2024-03-01")
        .unwrap()
        .unwrap();
    assert_eq!(heist.external_id, 100);
    assert_eq!(heist.trailers.len(), 1);
}
