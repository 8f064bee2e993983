//! Batch run configuration
//!
//! The input and output roots are process-local configuration, read from a
//! JSON file (or built-in defaults), not re-specified per run on the command
//! line. Paths are interpreted relative to the working directory.

use crate::error::{BgBatchError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Image extensions considered for processing (matched case-insensitively)
pub const VALID_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

fn default_input_root() -> PathBuf {
    PathBuf::from("assets/products")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("assets/products_no_bg")
}

fn default_max_workers() -> usize {
    4
}

fn default_retry_reads() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Configuration for a batch background-removal run
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Root of the source image tree
    #[serde(default = "default_input_root")]
    pub input_root: PathBuf,
    /// Root of the mirrored output tree
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Size of the worker pool
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Number of decode attempts per source file
    #[serde(default = "default_retry_reads")]
    pub retry_reads: u32,
    /// Delay between decode attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Path to the ONNX segmentation model (required by the Tract backend)
    #[serde(default)]
    pub model: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_root: default_input_root(),
            output_root: default_output_root(),
            max_workers: default_max_workers(),
            retry_reads: default_retry_reads(),
            retry_delay_ms: default_retry_delay_ms(),
            model: None,
        }
    }
}

impl BatchConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::new()
    }

    /// Load configuration from a JSON file and validate it
    ///
    /// # Errors
    /// - `Io` if the file cannot be read
    /// - `InvalidConfig` if the file does not parse or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| BgBatchError::file_io_error("read config file", path, e))?;
        let config: Self = serde_json::from_str(&data).map_err(|e| {
            BgBatchError::invalid_config(format!("failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// - `InvalidConfig` for a zero worker pool or zero read attempts
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(BgBatchError::invalid_config(
                "max_workers must be at least 1",
            ));
        }
        if self.retry_reads == 0 {
            return Err(BgBatchError::invalid_config(
                "retry_reads must be at least 1",
            ));
        }
        Ok(())
    }

    /// Delay between decode attempts
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Builder for `BatchConfig`
#[derive(Debug, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
        }
    }

    #[must_use]
    pub fn input_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.input_root = root.into();
        self
    }

    #[must_use]
    pub fn output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.output_root = root.into();
        self
    }

    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    #[must_use]
    pub fn retry_reads(mut self, attempts: u32) -> Self {
        self.config.retry_reads = attempts;
        self
    }

    #[must_use]
    pub fn retry_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry_delay_ms = millis;
        self
    }

    #[must_use]
    pub fn model<P: Into<PathBuf>>(mut self, model: P) -> Self {
        self.config.model = Some(model.into());
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// - `InvalidConfig` if validation fails
    pub fn build(self) -> Result<BatchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
