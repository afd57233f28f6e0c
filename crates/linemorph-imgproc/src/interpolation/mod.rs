//! Pixel sampling used when resampling the source image during warping.
//!
//! Only nearest neighbor lookup is provided: the warped output copies source
//! pixels verbatim, it never blends them.

mod nearest;

pub use nearest::nearest_neighbor_interpolation;
