//! Inference backend implementations of the [`BackgroundRemover`] capability
//!
//! [`BackgroundRemover`]: crate::remover::BackgroundRemover

#[cfg(feature = "tract")]
pub mod tract;

#[cfg(feature = "tract")]
pub use tract::TractRemover;
