#![deny(missing_docs)]
//! Image types used by the feature-line warping engine.

/// Error types for the image module.
pub mod error;

/// image representation for warping purposes.
pub mod image;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
