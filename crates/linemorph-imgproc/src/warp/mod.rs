//! Feature-line image warping (Beier–Neely field interpolation).
//!
//! Every destination pixel is expressed in the local coordinates of each
//! destination feature line, mapped through the matching source line and the
//! resulting positions are blended by a distance based weight:
//!
//! - [`warp_feature_lines`] pairs two line lists and warps an image onto a new grid
//! - [`warp_correspondences`] does the same from an already validated [`linemorph_lines::CorrespondenceSet`]
//! - [`field_warp`] writes into a caller provided destination image
//! - [`field_warp_map`] only computes the source positions and their fallback counters
//!
//! # Examples
//!
//! ```
//! use linemorph_image::Image;
//! use linemorph_imgproc::warp::{warp_feature_lines, FieldWarpOptions, FieldWarpParams};
//! use linemorph_lines::LineSegment;
//!
//! let src = Image::<u8, 3>::from_size_val([64, 48].into(), 0).unwrap();
//! let source_lines = [LineSegment::from_coords(10.0, 10.0, 50.0, 12.0)];
//! let dest_lines = [LineSegment::from_coords(12.0, 8.0, 40.0, 30.0)];
//!
//! let result = warp_feature_lines(
//!     &src,
//!     [32, 32].into(),
//!     &source_lines,
//!     &dest_lines,
//!     &FieldWarpParams::default(),
//!     &FieldWarpOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!((result.image.width(), result.image.height()), (32, 32));
//! ```

mod field;

/// Numeric kernels of the field interpolation.
pub mod kernels;

pub use field::{
    field_warp, field_warp_map, warp_correspondences, warp_feature_lines, FieldWarpOptions,
    FieldWarpParams, WarpResult, WarpStats,
};

use linemorph_image::ImageError;
use linemorph_lines::CorrespondenceError;

use crate::parallel::ParallelError;

/// Errors that can occur while warping an image.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WarpError {
    /// The source and destination line lists do not pair up.
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),

    /// The destination grid has a zero dimension.
    #[error("Invalid destination size ({0}x{1}), expected both dimensions > 0")]
    InvalidDestinationSize(usize, usize),

    /// The source image cannot hold the sampling margin.
    #[error("Source image ({width}x{height}) is too small for a sampling margin of {margin}")]
    SourceTooSmall {
        /// Source width in pixels.
        width: usize,
        /// Source height in pixels.
        height: usize,
        /// Requested margin in pixels.
        margin: usize,
    },

    /// The weighting parameters are out of range.
    #[error("Invalid warp parameters: {0}")]
    InvalidParams(String),

    /// The warp was cancelled through its cancel token.
    #[error("Warp cancelled")]
    Cancelled,

    /// Error creating the output image.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error scheduling the rows.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
