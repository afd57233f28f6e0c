#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// utilities for sampling source pixels.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// feature-line image warping module.
pub mod warp;
