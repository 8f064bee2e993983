//! Per-file processing pipeline
//!
//! One invocation handles one source file end to end and never returns an
//! error: every failure is folded into a [`FileOutcome`] so a single bad
//! file cannot abort the batch.

use crate::codec::{load_with_retries, ImageCodec};
use crate::error::{BgBatchError, Result};
use crate::remover::BackgroundRemover;
use crate::resolver::output_path_for;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// One unit of work: a source file plus the roots it is resolved against
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Source image file discovered under the input root
    pub source: PathBuf,
    /// Root of the source tree
    pub input_root: PathBuf,
    /// Root of the mirrored output tree
    pub output_root: PathBuf,
}

/// Decode retry policy applied while loading a source file
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of decode attempts
    pub attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

/// Result of processing one work item
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Source file this outcome belongs to
    pub source: PathBuf,
    /// Whether processing succeeded (skips count as success)
    pub success: bool,
    /// Human-readable description of what happened
    pub message: String,
}

impl FileOutcome {
    fn ok(source: PathBuf, message: String) -> Self {
        Self {
            source,
            success: true,
            message,
        }
    }

    fn failed(source: PathBuf, message: String) -> Self {
        Self {
            source,
            success: false,
            message,
        }
    }
}

/// Process one work item, converting any failure into a failure outcome.
#[must_use]
pub fn process_work_item(
    item: &WorkItem,
    retry: RetryPolicy,
    codec: &dyn ImageCodec,
    remover: &dyn BackgroundRemover,
) -> FileOutcome {
    match run_pipeline(item, retry, codec, remover) {
        Ok(message) => FileOutcome::ok(item.source.clone(), message),
        Err(e) => FileOutcome::failed(item.source.clone(), format!("ERROR: {e}")),
    }
}

fn run_pipeline(
    item: &WorkItem,
    retry: RetryPolicy,
    codec: &dyn ImageCodec,
    remover: &dyn BackgroundRemover,
) -> Result<String> {
    let out_path = output_path_for(&item.source, &item.input_root, &item.output_root)?;

    // Idempotence short-circuit: re-running over a partially completed
    // output tree is cheap and safe
    if out_path.exists() {
        debug!(output = %out_path.display(), "output exists, skipping");
        return Ok(format!("skip (exists) -> {}", out_path.display()));
    }

    if let Some(parent) = out_path.parent() {
        // create_dir_all tolerates the race where another worker creates
        // the same parent first
        std::fs::create_dir_all(parent)
            .map_err(|e| BgBatchError::file_io_error("create output directory", parent, e))?;
    }

    let image = load_with_retries(codec, &item.source, retry.attempts, retry.delay)?;
    let result = remover.remove(&image)?;
    codec.save_png(&result, &out_path)?;

    Ok(format!("OK -> {}", out_path.display()))
}
