//! CLI entry point
//!
//! Roots are process-local configuration (JSON file or built-in defaults),
//! not per-run positional arguments; the command line only selects the
//! config file, an optional model override, and verbosity.

use crate::batch::run_batch;
use crate::codec::DiskCodec;
use crate::config::BatchConfig;
use crate::error::{BgBatchError, Result};
use crate::progress::ConsoleProgressReporter;
use crate::remover::BackgroundRemover;
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Batch background removal for product-image catalogs
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "product-bgbatch")]
pub struct Cli {
    /// Path to the JSON configuration file (built-in defaults if absent)
    #[arg(short, long, value_name = "PATH", default_value = "bgbatch.json")]
    pub config: PathBuf,

    /// Override the configured ONNX model path
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let mut config = if cli.config.exists() {
        debug!(path = %cli.config.display(), "loading configuration file");
        BatchConfig::load(&cli.config)?
    } else {
        info!(path = %cli.config.display(), "no config file found, using built-in defaults");
        BatchConfig::default()
    };
    if let Some(model) = cli.model {
        config.model = Some(model);
    }

    let model_path = config.model.clone().ok_or_else(|| {
        anyhow::anyhow!("no model configured; set \"model\" in the config file or pass --model")
    })?;

    let input_root = std::path::absolute(&config.input_root)?;
    let output_root = std::path::absolute(&config.output_root)?;
    println!("------------------------------------------------------------");
    println!("INPUT : {}", input_root.display());
    println!("OUTPUT: {}", output_root.display());
    println!("------------------------------------------------------------");

    // Fail fast before the model session is built
    if !input_root.exists() {
        eprintln!("\u{274c} input root not found: {}", input_root.display());
        std::process::exit(1);
    }

    let remover = build_remover(&model_path)?;
    let codec = Arc::new(DiskCodec::new());
    let reporter = ConsoleProgressReporter::new();

    match run_batch(&config, codec, remover, &reporter).await {
        Ok(_summary) => Ok(()),
        Err(BgBatchError::RootNotFound(root)) => {
            // Fatal before any work: short diagnostic, non-zero exit
            eprintln!("\u{274c} input root not found: {}", root.display());
            std::process::exit(1);
        },
        Err(e) => Err(e.into()),
    }
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match verbose_count {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("product_bgbatch={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(())
}

#[cfg(feature = "tract")]
fn build_remover(model_path: &Path) -> Result<Arc<dyn BackgroundRemover>> {
    use crate::backends::TractRemover;
    Ok(Arc::new(TractRemover::load(model_path)?))
}

#[cfg(not(feature = "tract"))]
fn build_remover(_model_path: &Path) -> Result<Arc<dyn BackgroundRemover>> {
    Err(BgBatchError::invalid_config(
        "built without the 'tract' feature; no inference backend available",
    ))
}
