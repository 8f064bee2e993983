//! Output path resolution
//!
//! Pure mapping from a source file to its mirrored destination. No I/O
//! happens here; the per-file pipeline is responsible for creating parent
//! directories.

use crate::error::{BgBatchError, Result};
use std::path::{Path, PathBuf};

/// Map a source file to its output path: the input-root-relative path
/// re-rooted under the output root, with the extension forced to `.png`.
///
/// The mapping is deterministic and order-independent; a source file and its
/// output path are in 1:1 correspondence.
///
/// # Errors
/// - `Internal` if `src` is not a descendant of `input_root`. Inputs come
///   exclusively from the directory scanner, so this indicates a programming
///   error rather than an expected runtime condition.
pub fn output_path_for(src: &Path, input_root: &Path, output_root: &Path) -> Result<PathBuf> {
    let rel = src.strip_prefix(input_root).map_err(|_| {
        BgBatchError::internal(format!(
            "source file '{}' is not under input root '{}'",
            src.display(),
            input_root.display()
        ))
    })?;
    Ok(output_root.join(rel).with_extension("png"))
}
