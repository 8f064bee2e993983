#![allow(clippy::uninlined_format_args)]

//! # Product Background Batch
//!
//! Batch background removal for e-commerce product-image catalogs.
//!
//! Walks a configured source tree, and for each qualifying image (`png`,
//! `jpg`, `jpeg`, `webp`, matched case-insensitively) writes a
//! background-removed PNG at the mirrored path under the output tree. Work
//! runs on a bounded worker pool with per-file decode retries; outputs that
//! already exist are skipped, so re-running over a partially completed tree
//! is cheap and safe.
//!
//! Background removal and image codecs are consumed through traits
//! ([`BackgroundRemover`], [`ImageCodec`]), so the pipeline can be exercised
//! with fakes. The production remover ([`TractRemover`], feature `tract`)
//! runs a U²-Net style ONNX segmentation model through Tract, pure Rust,
//! with one session shared read-only across all workers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use product_bgbatch::{
//!     run_batch, BatchConfig, ConsoleProgressReporter, DiskCodec, TractRemover,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BatchConfig::builder()
//!     .input_root("assets/products")
//!     .output_root("assets/products_no_bg")
//!     .build()?;
//!
//! // One session for the whole run, shared across workers
//! let remover = Arc::new(TractRemover::load("models/u2net.onnx".as_ref())?);
//! let summary = run_batch(
//!     &config,
//!     Arc::new(DiskCodec::new()),
//!     remover,
//!     &ConsoleProgressReporter::new(),
//! )
//! .await?;
//! println!("succeeded: {}, failed: {}", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod remover;
pub mod resolver;
pub mod scanner;

#[cfg(feature = "tract")]
pub use backends::TractRemover;
pub use batch::{run_batch, BatchSummary};
pub use codec::{load_with_retries, DiskCodec, ImageCodec};
pub use config::{BatchConfig, BatchConfigBuilder, VALID_EXTENSIONS};
pub use error::{BgBatchError, Result};
pub use pipeline::{process_work_item, FileOutcome, RetryPolicy, WorkItem};
pub use progress::{ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter};
pub use remover::BackgroundRemover;
pub use resolver::output_path_for;
pub use scanner::find_images;
