//! Image codec capability
//!
//! The pipeline never touches the `image` crate directly; it goes through
//! the [`ImageCodec`] trait so tests can substitute fakes and so decode
//! retry policy stays in one place.

use crate::error::{BgBatchError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Load/save capability consumed by the per-file pipeline
pub trait ImageCodec: Send + Sync {
    /// Decode a source file into an owned RGBA buffer.
    ///
    /// The returned buffer must be fully decoded and decoupled from any file
    /// handle, so that workers never hold source files open after loading.
    ///
    /// # Errors
    /// - `Image` or `Io` on decode failures
    fn load(&self, path: &Path) -> Result<RgbaImage>;

    /// Encode an RGBA buffer as a lossless-optimized PNG at `path`.
    ///
    /// # Errors
    /// - `Image` or `Io` on encode or write failures
    fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<()>;
}

/// Production codec backed by the `image` crate
#[derive(Debug, Default)]
pub struct DiskCodec;

impl DiskCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for DiskCodec {
    fn load(&self, path: &Path) -> Result<RgbaImage> {
        let image = image::open(path)?;
        Ok(image.to_rgba8())
    }

    fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| BgBatchError::file_io_error("create output file", path, e))?;
        let writer = BufWriter::new(file);
        // Best compression is the lossless analog of an "optimize" flag
        let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Decode `path` with up to `attempts` tries, sleeping `delay` between tries.
///
/// Tolerates transient file-locking errors seen on some filesystems while
/// files are still being written or indexed by other processes.
///
/// # Errors
/// - `LoadFailure` wrapping the last underlying error once all attempts are
///   exhausted
pub fn load_with_retries(
    codec: &dyn ImageCodec,
    path: &Path,
    attempts: u32,
    delay: Duration,
) -> Result<RgbaImage> {
    let mut last_err = None;
    for attempt in 1..=attempts {
        match codec.load(path) {
            Ok(image) => return Ok(image),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    attempt,
                    attempts,
                    error = %e,
                    "decode attempt failed"
                );
                last_err = Some(e);
                if attempt < attempts {
                    std::thread::sleep(delay);
                }
            },
        }
    }

    match last_err {
        Some(source) => Err(BgBatchError::LoadFailure {
            path: path.to_path_buf(),
            source: Box::new(source),
        }),
        None => Err(BgBatchError::internal("image load invoked with zero attempts")),
    }
}
