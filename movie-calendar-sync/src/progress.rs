//! Reconciliation progress reporting.

/// Trait for receiving progress updates during a run.
pub trait SyncProgress {
    /// Called when a year's page has been parsed.
    fn on_year(&self, year: i32, entries: usize);

    /// Called before each schedule entry is reconciled.
    fn on_entry(&self, current: usize, total: usize, title: &str);

    /// Called when the run is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn on_year(&self, _year: i32, _entries: usize) {}
    fn on_entry(&self, _current: usize, _total: usize, _title: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl SyncProgress for LogProgress {
    fn on_year(&self, year: i32, entries: usize) {
        log::info!("{}: {} schedule entries", year, entries);
    }

    fn on_entry(&self, current: usize, total: usize, title: &str) {
        if current.is_multiple_of(50) || current == total {
            log::info!("  [{}/{}] {}", current, total, title);
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
