//! Error types for batch background removal operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for batch background removal operations
pub type Result<T> = std::result::Result<T, BgBatchError>;

/// Error types for batch background removal operations
#[derive(Error, Debug)]
pub enum BgBatchError {
    /// The configured input root does not exist (fatal, aborts the run)
    #[error("input root not found: {0}")]
    RootNotFound(PathBuf),

    /// Image decoding failed after all bounded retry attempts
    #[error("failed to load '{path}': {source}")]
    LoadFailure {
        /// Source file that could not be decoded
        path: PathBuf,
        /// Last error observed across the retry attempts
        #[source]
        source: Box<BgBatchError>,
    },

    /// The background-removal capability failed for one image
    #[error("background removal failed: {0}")]
    ProcessingFailure(String),

    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or encoding errors
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid configuration or parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model loading or initialization errors
    #[error("model error: {0}")]
    Model(String),

    /// Generic error for unexpected conditions
    #[error("internal error: {0}")]
    Internal(String),
}

impl BgBatchError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::ProcessingFailure(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("failed to {} '{}': {}", operation, path_display, error),
        ))
    }
}
