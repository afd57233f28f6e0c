use std::ops::Add;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use glam::Vec2;

use linemorph_image::{Image, ImageSize};
use linemorph_lines::{CorrespondenceSet, FeatureLinePair, LineSegment};

use super::kernels::{clamp_to_margin, line_strength, line_weight, LineFrame};
use super::WarpError;
use crate::interpolation::nearest_neighbor_interpolation;
use crate::parallel::{self, ExecutionStrategy};

/// Parameters of the line weighting function `(length^p / (a + dist))^b`.
///
/// # Examples
///
/// ```
/// use linemorph_imgproc::warp::FieldWarpParams;
///
/// let params = FieldWarpParams::default();
/// assert_eq!((params.a, params.b, params.p, params.margin), (50.0, 1.0, 0.2, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWarpParams {
    /// Softening term added to the distance, must be > 0.
    pub a: f32,
    /// Falloff exponent.
    pub b: f32,
    /// Exponent on the source segment length.
    pub p: f32,
    /// Distance in pixels kept between sampled positions and the source border.
    pub margin: usize,
}

impl Default for FieldWarpParams {
    fn default() -> Self {
        Self {
            a: 50.0,
            b: 1.0,
            p: 0.2,
            margin: 2,
        }
    }
}

impl FieldWarpParams {
    /// Check that the weighting function is well defined for any distance.
    pub fn validate(&self) -> Result<(), WarpError> {
        if !(self.a.is_finite() && self.b.is_finite() && self.p.is_finite()) {
            return Err(WarpError::InvalidParams(format!(
                "parameters must be finite, got a={} b={} p={}",
                self.a, self.b, self.p
            )));
        }
        if self.a <= 0.0 {
            return Err(WarpError::InvalidParams(format!(
                "a must be > 0, got {}",
                self.a
            )));
        }
        if self.b < 0.0 {
            return Err(WarpError::InvalidParams(format!(
                "b must be >= 0, got {}",
                self.b
            )));
        }
        if self.p < 0.0 {
            return Err(WarpError::InvalidParams(format!(
                "p must be >= 0, got {}",
                self.p
            )));
        }
        Ok(())
    }
}

/// Execution options of a field warp.
#[derive(Debug, Clone, Default)]
pub struct FieldWarpOptions {
    /// How destination rows are scheduled.
    pub strategy: ExecutionStrategy,
    /// When set to `true`, the warp stops at the next row and returns [`WarpError::Cancelled`].
    pub cancel_token: Option<Arc<AtomicBool>>,
}

impl FieldWarpOptions {
    /// Options with the given execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Options checking the given token once per row.
    pub fn with_cancel_token(mut self, cancel_token: Arc<AtomicBool>) -> Self {
        self.cancel_token = Some(cancel_token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(|token| token.load(Ordering::Relaxed))
    }
}

/// Counters of the fallback paths taken during a warp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarpStats {
    /// Indices of the pairs skipped because a segment has zero length.
    pub degenerate_pairs: Vec<usize>,
    /// Pixels mapped to themselves because no pair contributed any weight.
    pub zero_weight_pixels: usize,
    /// Pixels mapped to themselves because the weighted average was not finite.
    pub non_finite_pixels: usize,
    /// Pixels whose source position had to be clamped into the sampling window.
    pub clamped_pixels: usize,
}

impl WarpStats {
    /// Number of pixels that fell back to the identity mapping.
    pub fn identity_fallback_pixels(&self) -> usize {
        self.zero_weight_pixels + self.non_finite_pixels
    }
}

/// The warped image together with the statistics of the warp.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpResult<T, const C: usize> {
    /// The output image, sized to the destination grid.
    pub image: Image<T, C>,
    /// Fallback counters.
    pub stats: WarpStats,
}

/// A pair reduced to what the per pixel loop needs.
struct PreparedPair {
    dest: LineFrame,
    source: LineFrame,
    strength: f32,
}

/// Build the frames of every usable pair; degenerate pairs are reported and skipped.
fn prepare_pairs(
    pairs: &[FeatureLinePair],
    params: &FieldWarpParams,
) -> (Vec<PreparedPair>, Vec<usize>) {
    let mut prepared = Vec::with_capacity(pairs.len());
    let mut degenerate = Vec::new();

    for pair in pairs {
        match (LineFrame::new(&pair.dest), LineFrame::new(&pair.source)) {
            (Some(dest), Some(source)) => prepared.push(PreparedPair {
                dest,
                source,
                strength: line_strength(source.length(), params.p),
            }),
            _ => {
                log::warn!(
                    "skipping feature line pair {}: zero-length segment (source: {}, dest: {})",
                    pair.index,
                    pair.source,
                    pair.dest
                );
                degenerate.push(pair.index);
            }
        }
    }

    (prepared, degenerate)
}

/// Where a destination pixel samples the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SourcePosition {
    /// Weighted average of the per pair positions.
    Field(Vec2),
    /// No pair contributed any weight.
    ZeroWeight,
    /// The weighted average overflowed.
    NonFinite,
}

/// Field interpolation of the source position of `x`.
fn source_position(x: Vec2, pairs: &[PreparedPair], params: &FieldWarpParams) -> SourcePosition {
    let mut dsum = Vec2::ZERO;
    let mut weight_sum = 0.0f32;

    for pair in pairs {
        let (u, v) = pair.dest.coordinates(x);
        let x1 = pair.source.point_at(u, v);
        let dist = pair.dest.distance(x, u, v);
        let weight = line_weight(pair.strength, dist, params.a, params.b);
        dsum += (x1 - x) * weight;
        weight_sum += weight;
    }

    if weight_sum <= 0.0 {
        return SourcePosition::ZeroWeight;
    }

    let x1 = x + dsum / weight_sum;
    if !x1.is_finite() {
        return SourcePosition::NonFinite;
    }

    SourcePosition::Field(x1)
}

/// Source position of `x`, counting the pixels that fall back to the identity.
fn resolve_position(
    x: Vec2,
    pairs: &[PreparedPair],
    params: &FieldWarpParams,
    tally: &mut RowTally,
) -> Vec2 {
    match source_position(x, pairs, params) {
        SourcePosition::Field(x1) => x1,
        SourcePosition::ZeroWeight => {
            tally.zero_weight += 1;
            x
        }
        SourcePosition::NonFinite => {
            tally.non_finite += 1;
            x
        }
    }
}

/// Per row counters, summed across rows.
#[derive(Debug, Default, Clone, Copy)]
struct RowTally {
    zero_weight: usize,
    non_finite: usize,
    clamped: usize,
    cancelled: usize,
}

impl Add for RowTally {
    type Output = RowTally;

    fn add(self, other: RowTally) -> RowTally {
        RowTally {
            zero_weight: self.zero_weight + other.zero_weight,
            non_finite: self.non_finite + other.non_finite,
            clamped: self.clamped + other.clamped,
            cancelled: self.cancelled + other.cancelled,
        }
    }
}

impl RowTally {
    /// Turn the summed counters into the stats of a warp, reporting the fallbacks.
    fn into_stats(self, degenerate_pairs: Vec<usize>) -> Result<WarpStats, WarpError> {
        if self.cancelled > 0 {
            log::warn!("field warp cancelled, {} rows skipped", self.cancelled);
            return Err(WarpError::Cancelled);
        }

        if self.zero_weight > 0 {
            log::warn!(
                "no feature line contributed to {} pixels, identity mapping used",
                self.zero_weight
            );
        }
        if self.non_finite > 0 {
            log::warn!(
                "non-finite source position for {} pixels, identity mapping used",
                self.non_finite
            );
        }

        Ok(WarpStats {
            degenerate_pairs,
            zero_weight_pixels: self.zero_weight,
            non_finite_pixels: self.non_finite,
            clamped_pixels: self.clamped,
        })
    }
}

/// Check the source image can hold the sampling window.
fn check_source_size(size: ImageSize, margin: usize) -> Result<(), WarpError> {
    let min_extent = margin + margin.max(1);
    if size.width < min_extent || size.height < min_extent {
        return Err(WarpError::SourceTooSmall {
            width: size.width,
            height: size.height,
            margin,
        });
    }
    Ok(())
}

/// Warp `src` into the grid of `dst` using feature line pairs.
///
/// For every destination pixel `X` and pair `k` with destination segment
/// `(P, Q)` and source segment `(P1, Q1)`, the line coordinates of `X` relative
/// to `(P, Q)` are re-applied to `(P1, Q1)`, giving a source position `X1_k`.
/// The positions are averaged with weights `(|Q1 - P1|^p / (a + dist_k))^b`,
/// clamped into the sampling window and sampled with nearest neighbor lookup.
///
/// Pairs with a zero-length segment are skipped. Pixels without any
/// contribution keep the identity mapping. Both cases are reported in the
/// returned [`WarpStats`].
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The output image, its size defines the destination grid.
/// * `pairs` - The feature line pairs.
/// * `params` - The weighting parameters.
/// * `options` - Execution strategy and cancellation.
///
/// # Errors
///
/// Invalid parameters, a source image too small for the margin, a failed
/// thread pool or a cancellation.
///
/// # Example
///
/// ```
/// use linemorph_image::Image;
/// use linemorph_imgproc::warp::{field_warp, FieldWarpOptions, FieldWarpParams};
/// use linemorph_lines::{CorrespondenceSet, LineSegment};
///
/// let src = Image::<u8, 3>::from_size_pixel([8, 8].into(), [255, 0, 0]).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val([6, 4].into(), 0).unwrap();
///
/// let lines = [LineSegment::from_coords(1.0, 1.0, 6.0, 1.0)];
/// let set = CorrespondenceSet::new(&lines, &lines).unwrap();
///
/// let stats = field_warp(
///     &src,
///     &mut dst,
///     set.pairs(),
///     &FieldWarpParams::default(),
///     &FieldWarpOptions::default(),
/// )
/// .unwrap();
///
/// assert!(dst.as_slice().chunks_exact(3).all(|px| px == [255, 0, 0]));
/// assert_eq!(stats.zero_weight_pixels, 0);
/// ```
pub fn field_warp<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    pairs: &[FeatureLinePair],
    params: &FieldWarpParams,
    options: &FieldWarpOptions,
) -> Result<WarpStats, WarpError>
where
    T: Copy + Send + Sync,
{
    params.validate()?;
    check_source_size(src.size(), params.margin)?;

    let (prepared, degenerate_pairs) = prepare_pairs(pairs, params);
    let src_size = src.size();

    let tally = parallel::map_reduce_rows(dst, options.strategy, |j, row| {
        let mut tally = RowTally::default();
        if options.is_cancelled() {
            tally.cancelled = 1;
            return tally;
        }

        for (i, dst_pixel) in row.chunks_exact_mut(C).enumerate() {
            let x = Vec2::new(i as f32, j as f32);
            let x1 = resolve_position(x, &prepared, params, &mut tally);

            let (x1, clamped) = clamp_to_margin(x1, src_size, params.margin);
            if clamped {
                tally.clamped += 1;
            }

            dst_pixel.copy_from_slice(&nearest_neighbor_interpolation(src, x1.x, x1.y));
        }

        tally
    })?;

    let stats = tally.into_stats(degenerate_pairs)?;

    log::debug!(
        "field warp {} -> {} with {} pairs: {:?}",
        src_size,
        dst.size(),
        pairs.len(),
        stats
    );

    Ok(stats)
}

/// Warp a source image onto a destination grid of the given size.
///
/// The output image is allocated here, with the channel layout of `src` and
/// the dimensions of `dst_size`.
///
/// # Errors
///
/// [`WarpError::InvalidDestinationSize`] for an empty grid, plus every error of [`field_warp`].
pub fn warp_correspondences<T, const C: usize>(
    src: &Image<T, C>,
    dst_size: ImageSize,
    correspondences: &CorrespondenceSet,
    params: &FieldWarpParams,
    options: &FieldWarpOptions,
) -> Result<WarpResult<T, C>, WarpError>
where
    T: Copy + Default + Send + Sync,
{
    if dst_size.is_empty() {
        return Err(WarpError::InvalidDestinationSize(
            dst_size.width,
            dst_size.height,
        ));
    }
    params.validate()?;
    check_source_size(src.size(), params.margin)?;

    let mut image = Image::from_size_val(dst_size, T::default())?;
    let stats = field_warp(src, &mut image, correspondences.pairs(), params, options)?;

    Ok(WarpResult { image, stats })
}

/// Warp a source image using separate source and destination line lists.
///
/// The lists are paired by position. This is the boundary operation of the
/// engine: mismatched lists are rejected before anything is allocated.
///
/// # Errors
///
/// [`WarpError::Correspondence`] when the lists differ in length, plus every
/// error of [`warp_correspondences`].
///
/// # Example
///
/// ```
/// use linemorph_image::Image;
/// use linemorph_imgproc::warp::{warp_feature_lines, FieldWarpOptions, FieldWarpParams};
/// use linemorph_lines::LineSegment;
///
/// let src = Image::<u8, 1>::from_fn([16, 16].into(), |x, y| [(x + y) as u8]).unwrap();
///
/// let source_lines = [LineSegment::from_coords(4.0, 4.0, 12.0, 4.0)];
/// let dest_lines = [LineSegment::from_coords(4.0, 6.0, 12.0, 6.0)];
///
/// let result = warp_feature_lines(
///     &src,
///     [16, 16].into(),
///     &source_lines,
///     &dest_lines,
///     &FieldWarpParams::default(),
///     &FieldWarpOptions::default(),
/// )
/// .unwrap();
///
/// // a single pair translates the whole image up by two rows
/// assert_eq!(result.image.pixel(8, 8).unwrap(), src.pixel(8, 6).unwrap());
/// ```
pub fn warp_feature_lines<T, const C: usize>(
    src: &Image<T, C>,
    dst_size: ImageSize,
    source_lines: &[LineSegment],
    dest_lines: &[LineSegment],
    params: &FieldWarpParams,
    options: &FieldWarpOptions,
) -> Result<WarpResult<T, C>, WarpError>
where
    T: Copy + Default + Send + Sync,
{
    let correspondences = CorrespondenceSet::new(source_lines, dest_lines)?;
    warp_correspondences(src, dst_size, &correspondences, params, options)
}

/// Compute the source position of every destination pixel.
///
/// The positions are returned before clamping, as two row-major maps of
/// `dst_size` for the x and y coordinates, together with the [`WarpStats`] of
/// the computation. Pixels without any contribution or with a non-finite
/// average map to themselves and are counted. `clamped_pixels` stays 0.
///
/// # Errors
///
/// [`WarpError::InvalidDestinationSize`] for an empty grid, invalid
/// parameters, a failed thread pool or a cancellation.
///
/// # Example
///
/// ```
/// use linemorph_imgproc::warp::{field_warp_map, FieldWarpOptions, FieldWarpParams};
///
/// let (map_x, map_y, stats) = field_warp_map(
///     [3, 2].into(),
///     &[],
///     &FieldWarpParams::default(),
///     &FieldWarpOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(map_x, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
/// assert_eq!(map_y, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
/// assert_eq!(stats.zero_weight_pixels, 6);
/// ```
pub fn field_warp_map(
    dst_size: ImageSize,
    pairs: &[FeatureLinePair],
    params: &FieldWarpParams,
    options: &FieldWarpOptions,
) -> Result<(Vec<f32>, Vec<f32>, WarpStats), WarpError> {
    if dst_size.is_empty() {
        return Err(WarpError::InvalidDestinationSize(
            dst_size.width,
            dst_size.height,
        ));
    }
    params.validate()?;

    let (prepared, degenerate_pairs) = prepare_pairs(pairs, params);

    // interleaved (x, y) positions, split into two planes at the end
    let mut map = Image::<f32, 2>::from_size_val(dst_size, 0.0)?;

    let tally = parallel::map_reduce_rows(&mut map, options.strategy, |j, row| {
        let mut tally = RowTally::default();
        if options.is_cancelled() {
            tally.cancelled = 1;
            return tally;
        }

        for (i, xy) in row.chunks_exact_mut(2).enumerate() {
            let x = Vec2::new(i as f32, j as f32);
            let x1 = resolve_position(x, &prepared, params, &mut tally);
            xy[0] = x1.x;
            xy[1] = x1.y;
        }

        tally
    })?;

    let stats = tally.into_stats(degenerate_pairs)?;

    let (map_x, map_y) = map
        .as_slice()
        .chunks_exact(2)
        .map(|xy| (xy[0], xy[1]))
        .unzip();

    Ok((map_x, map_y, stats))
}
