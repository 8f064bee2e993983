//! Batch coordinator
//!
//! Top-level driver: validates the input root, enumerates source files
//! eagerly, dispatches one pipeline invocation per file onto a bounded
//! worker pool, and collects outcomes in completion order. Partial failure
//! is not fatal; the run only aborts before work is scheduled (missing
//! input root).

use crate::codec::ImageCodec;
use crate::config::BatchConfig;
use crate::error::Result;
use crate::pipeline::{process_work_item, FileOutcome, RetryPolicy, WorkItem};
use crate::progress::ProgressReporter;
use crate::remover::BackgroundRemover;
use crate::scanner::find_images;
use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Aggregate result of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    /// Number of source files discovered
    pub total: usize,
    /// Outcomes reported as successful (including skips)
    pub succeeded: usize,
    /// Outcomes reported as failed
    pub failed: usize,
    /// All outcomes, in completion order
    pub outcomes: Vec<FileOutcome>,
}

/// Run a complete batch over the configured roots.
///
/// The remover session is created by the caller, exactly once, and shared
/// read-only across all workers; no lock is introduced here. Outcomes are
/// observed in completion order, which is non-deterministic across workers
/// and must not be relied upon.
///
/// # Errors
/// - `InvalidConfig` if the configuration fails validation
/// - `RootNotFound` if the input root does not exist (no output directory
///   is created in that case)
/// - `Io`/`Internal` if discovery itself fails
///
/// Per-file failures do not surface here; they are folded into the summary.
pub async fn run_batch(
    config: &BatchConfig,
    codec: Arc<dyn ImageCodec>,
    remover: Arc<dyn BackgroundRemover>,
    reporter: &dyn ProgressReporter,
) -> Result<BatchSummary> {
    config.validate()?;

    let input_root = std::path::absolute(&config.input_root)?;
    let output_root = std::path::absolute(&config.output_root)?;

    let files = find_images(&input_root)?;
    let total = files.len();
    info!(input = %input_root.display(), output = %output_root.display(), total, "starting batch");
    reporter.batch_started(total);

    let mut summary = BatchSummary {
        total,
        succeeded: 0,
        failed: 0,
        outcomes: Vec::with_capacity(total),
    };
    if files.is_empty() {
        // No directories are created for an empty batch
        reporter.batch_completed(&summary);
        return Ok(summary);
    }

    let retry = RetryPolicy {
        attempts: config.retry_reads,
        delay: config.retry_delay(),
    };

    let mut outcomes = stream::iter(files)
        .map(|source| {
            let codec = Arc::clone(&codec);
            let remover = Arc::clone(&remover);
            let item = WorkItem {
                source,
                input_root: input_root.clone(),
                output_root: output_root.clone(),
            };
            let source = item.source.clone();
            async move {
                let handle = tokio::task::spawn_blocking(move || {
                    process_work_item(&item, retry, codec.as_ref(), remover.as_ref())
                });
                match handle.await {
                    Ok(outcome) => outcome,
                    // A panicking work item must not abort the batch
                    Err(e) => FileOutcome {
                        source,
                        success: false,
                        message: format!("ERROR: worker panicked: {e}"),
                    },
                }
            }
        })
        .buffer_unordered(config.max_workers);

    while let Some(outcome) = outcomes.next().await {
        if outcome.success {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
            warn!(source = %outcome.source.display(), message = %outcome.message, "file failed");
        }
        reporter.file_completed(&outcome);
        summary.outcomes.push(outcome);
    }

    info!(succeeded = summary.succeeded, failed = summary.failed, "batch complete");
    reporter.batch_completed(&summary);
    Ok(summary)
}
