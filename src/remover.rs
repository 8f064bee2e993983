//! Background removal capability
//!
//! The model session is the one shared resource of a batch run: it is
//! constructed exactly once before any work is scheduled and shared
//! read-only (`&self`) across all workers behind an `Arc`. Implementations
//! must therefore be safe to invoke concurrently without internal mutation
//! visible to callers.

use crate::error::Result;
use image::RgbaImage;

/// Opaque background-removal session consumed by the per-file pipeline
pub trait BackgroundRemover: Send + Sync {
    /// Produce a background-removed copy of `image`.
    ///
    /// # Errors
    /// - `ProcessingFailure` wrapping whatever the capability raises
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage>;
}
