use glam::Vec2;

use linemorph_image::ImageSize;
use linemorph_lines::LineSegment;

/// Distance below which a mapped coordinate is snapped to the nearest integer.
///
/// Re-expressing a pixel center in line coordinates and back loses a few ulps;
/// without snapping, truncation would turn `2.9999998` into pixel 2 instead of 3.
pub const SNAP_EPSILON: f32 = 1e-3;

/// A line segment expressed as a local coordinate frame.
///
/// `u` runs along the segment (0 at `head`, 1 at `tail`) and `v` is the signed
/// perpendicular offset in pixels, positive on the side of
/// [`LineSegment::normal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFrame {
    origin: Vec2,
    end: Vec2,
    axis: Vec2,
    normal: Vec2,
    length: f32,
    length_squared: f32,
}

impl LineFrame {
    /// Build the frame of a segment, `None` for a degenerate segment.
    pub fn new(segment: &LineSegment) -> Option<Self> {
        if segment.is_degenerate() {
            return None;
        }
        Some(Self {
            origin: segment.head,
            end: segment.tail,
            axis: segment.vector(),
            normal: segment.normal(),
            length: segment.length(),
            length_squared: segment.length_squared(),
        })
    }

    /// Length of the underlying segment.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Line coordinates `(u, v)` of a point.
    ///
    /// `u = dot(x - p, q - p) / |q - p|^2` and `v = dot(x - p, perp(q - p)) / |q - p|`.
    pub fn coordinates(&self, x: Vec2) -> (f32, f32) {
        let rel = x - self.origin;
        let u = rel.dot(self.axis) / self.length_squared;
        let v = rel.dot(self.normal) / self.length;
        (u, v)
    }

    /// The point with line coordinates `(u, v)` in this frame.
    pub fn point_at(&self, u: f32, v: f32) -> Vec2 {
        self.origin + u * self.axis + v * self.normal / self.length
    }

    /// Distance from `x` to the segment, given the line coordinates of `x`.
    ///
    /// Perpendicular distance alongside the segment body, distance to the
    /// closest end point beyond it.
    pub fn distance(&self, x: Vec2, u: f32, v: f32) -> f32 {
        if u < 0.0 {
            x.distance(self.origin)
        } else if u > 1.0 {
            x.distance(self.end)
        } else {
            v.abs()
        }
    }
}

/// Influence of a line on a point, `(strength / (a + dist))^b`.
///
/// `strength` is the source segment length raised to the power `p`, see
/// [`line_strength`].
pub fn line_weight(strength: f32, dist: f32, a: f32, b: f32) -> f32 {
    let base = strength / (a + dist);
    if b == 1.0 {
        base
    } else {
        base.powf(b)
    }
}

/// Length dependent part of the line weight, `length^p`.
pub fn line_strength(length: f32, p: f32) -> f32 {
    length.powf(p)
}

/// Round values within [`SNAP_EPSILON`] of an integer to that integer.
pub fn snap_to_pixel(x: f32) -> f32 {
    let rounded = x.round();
    if (x - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        x
    }
}

/// The sampling window `[min, max]` for a given image extent and margin.
///
/// The window is `[margin, extent - margin]`; with a zero margin the upper bound
/// is `extent - 1` so the last pixel is still addressable.
pub fn margin_bounds(extent: usize, margin: usize) -> (f32, f32) {
    let min = margin as f32;
    let max = extent.saturating_sub(margin.max(1)) as f32;
    (min, max)
}

/// Clamp a source position into the sampling window of an image.
///
/// Each component is snapped to the pixel grid and then clamped into
/// `[margin, width - margin] x [margin, height - margin]`. The returned flag is
/// `true` when the clamp moved the position.
pub fn clamp_to_margin(x: Vec2, size: ImageSize, margin: usize) -> (Vec2, bool) {
    let (min_x, max_x) = margin_bounds(size.width, margin);
    let (min_y, max_y) = margin_bounds(size.height, margin);

    let snapped = Vec2::new(snap_to_pixel(x.x), snap_to_pixel(x.y));
    let clamped = Vec2::new(snapped.x.clamp(min_x, max_x), snapped.y.clamp(min_y, max_y));

    (clamped, clamped != snapped)
}
