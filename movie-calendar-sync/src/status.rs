//! Shared run state for status readers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Whether a reconciliation run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// Cloneable handle onto the engine's run state.
///
/// The engine holds one clone and marks runs through [`RunStatus::begin`];
/// any number of readers hold others.
#[derive(Debug, Clone, Default)]
pub struct RunStatus {
    active: Arc<AtomicUsize>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        if self.is_running() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// Mark a run as started. The state returns to idle when every guard
    /// has been dropped.
    pub fn begin(&self) -> RunGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        RunGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// Keeps the status at [`RunState::Running`] while alive.
#[derive(Debug)]
pub struct RunGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_marks_running_until_dropped() {
        let status = RunStatus::new();
        let reader = status.clone();
        assert_eq!(reader.state(), RunState::Idle);

        let guard = status.begin();
        assert_eq!(reader.state(), RunState::Running);
        drop(guard);
        assert_eq!(reader.state(), RunState::Idle);
    }

    #[test]
    fn overlapping_runs_stay_running_until_last_finishes() {
        let status = RunStatus::new();
        let first = status.begin();
        let second = status.begin();
        drop(first);
        assert!(status.is_running());
        drop(second);
        assert!(!status.is_running());
    }
}
