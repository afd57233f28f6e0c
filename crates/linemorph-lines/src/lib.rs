#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Line segments anchored in image pixel coordinates.
pub mod segment;

/// Ordered source/destination correspondences and their validation.
pub mod correspondence;

/// Reading and writing line lists as whitespace separated text records.
pub mod io;

pub use crate::correspondence::{validate, CorrespondenceError, CorrespondenceSet, FeatureLinePair};
pub use crate::segment::{LineSegment, DEGENERATE_EPSILON};
