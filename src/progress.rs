//! Progress reporting for batch runs
//!
//! The coordinator reports through this seam instead of printing directly,
//! so library users and tests can observe outcomes without capturing stdout.

use crate::batch::BatchSummary;
use crate::pipeline::FileOutcome;

/// Observer for batch progress events
pub trait ProgressReporter: Send + Sync {
    /// Called once after discovery, before any work is dispatched
    fn batch_started(&self, total: usize);

    /// Called for each outcome, in completion order
    fn file_completed(&self, outcome: &FileOutcome);

    /// Called once after all outstanding work has drained
    fn batch_completed(&self, summary: &BatchSummary);
}

/// Human-readable console reporter: one line per outcome plus a final
/// success/failure count line
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter;

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn batch_started(&self, total: usize) {
        println!("Found files: {total}");
        if total == 0 {
            println!("No matching images found.");
        }
    }

    fn file_completed(&self, outcome: &FileOutcome) {
        let marker = if outcome.success { "\u{2705}" } else { "\u{274c}" };
        println!("{} {}: {}", marker, outcome.source.display(), outcome.message);
    }

    fn batch_completed(&self, summary: &BatchSummary) {
        println!("------------------------------------------------------------");
        println!(
            "Done. Succeeded: {}, Failed: {}",
            summary.succeeded, summary.failed
        );
    }
}

/// Reporter that swallows all events (library/test usage)
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NoOpProgressReporter {
    fn batch_started(&self, _total: usize) {}
    fn file_completed(&self, _outcome: &FileOutcome) {}
    fn batch_completed(&self, _summary: &BatchSummary) {}
}
