//! The scrape, enrich and reconcile engine.
//!
//! This crate owns the pipeline from a release schedule page to the movie
//! store: fetching pages, parsing them into entries, enriching titles through
//! TMDb, and converging the stored records onto what the source lists.

pub mod fetch;
pub mod parser;
pub mod progress;
pub mod reconcile;
pub mod repository;
pub mod status;

pub use fetch::{DEFAULT_SCHEDULE_BASE_URL, FetchError, HttpScheduleFetcher, ScheduleSource};
pub use parser::{FirstShowingParser, ScheduleParser};
pub use progress::{LogProgress, SilentProgress, SyncProgress};
pub use reconcile::{ReconciliationEngine, SyncError, default_years};
pub use repository::{MemoryRepository, MovieRepository, RepositoryError, SqliteRepository};
pub use status::{RunGuard, RunState, RunStatus};
