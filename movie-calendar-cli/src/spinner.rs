//! Terminal progress display for reconciliation runs.
//!
//! One bar per run: it switches to a fresh length whenever a new year's page
//! has been parsed and advances once per schedule entry.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use movie_calendar_sync::SyncProgress;

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Create the bar. When `hidden` is true nothing is drawn.
    pub fn new(hidden: bool) -> Self {
        let bar = ProgressBar::new(0);
        if hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {prefix:.bold} [{bar:30.cyan/dim}] {pos}/{len} {msg}",
            )
            .expect("static pattern")
            .progress_chars("=> ")
            .tick_chars("/-\\|"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop ticking and clear the line.
    pub fn clear(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

impl SyncProgress for BarProgress {
    fn on_year(&self, year: i32, entries: usize) {
        self.bar.set_prefix(year.to_string());
        self.bar.set_length(entries as u64);
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn on_entry(&self, current: usize, _total: usize, title: &str) {
        self.bar.set_position(current as u64);
        self.bar.set_message(title.to_string());
    }

    fn on_complete(&self, message: &str) {
        self.clear();
        log::debug!("{}", message);
    }
}
