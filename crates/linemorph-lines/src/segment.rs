use glam::Vec2;

/// Squared length at or below which a segment is treated as zero-length.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

/// A directed line segment in image pixel coordinates.
///
/// The segment runs from `head` to `tail`. Coordinates are floating point so a
/// segment can be anchored between pixel centers.
///
/// # Examples
///
/// ```
/// use linemorph_lines::LineSegment;
///
/// let line = LineSegment::from_coords(0.0, 0.0, 3.0, 4.0);
/// assert_eq!(line.length(), 5.0);
/// assert!(!line.is_degenerate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineSegment {
    /// Start point of the segment.
    pub head: Vec2,
    /// End point of the segment.
    pub tail: Vec2,
}

impl LineSegment {
    /// Create a segment from its two end points.
    pub fn new(head: Vec2, tail: Vec2) -> Self {
        Self { head, tail }
    }

    /// Create a segment from raw `head.x head.y tail.x tail.y` coordinates.
    pub fn from_coords(head_x: f32, head_y: f32, tail_x: f32, tail_y: f32) -> Self {
        Self::new(Vec2::new(head_x, head_y), Vec2::new(tail_x, tail_y))
    }

    /// The vector from `head` to `tail`.
    pub fn vector(&self) -> Vec2 {
        self.tail - self.head
    }

    /// Euclidean length of the segment.
    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// Squared euclidean length of the segment.
    pub fn length_squared(&self) -> f32 {
        self.vector().length_squared()
    }

    /// The segment vector rotated by a quarter turn, `(d.y, -d.x)`.
    ///
    /// This is the in-plane part of `cross(d, z)` with `z` the out-of-plane unit axis.
    /// It has the same length as the segment, it is not normalized.
    pub fn normal(&self) -> Vec2 {
        let d = self.vector();
        Vec2::new(d.y, -d.x)
    }

    /// Whether the segment has (numerically) zero length or no finite length.
    ///
    /// Finite end points can still be so far apart that the squared length
    /// overflows, such a segment is degenerate too.
    pub fn is_degenerate(&self) -> bool {
        let length_squared = self.length_squared();
        !self.head.is_finite()
            || !self.tail.is_finite()
            || !length_squared.is_finite()
            || length_squared <= DEGENERATE_EPSILON
    }
}

impl std::fmt::Display for LineSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.head.x, self.head.y, self.tail.x, self.tail.y
        )
    }
}

impl From<[f32; 4]> for LineSegment {
    fn from(coords: [f32; 4]) -> Self {
        Self::from_coords(coords[0], coords[1], coords[2], coords[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_geometry() {
        let line = LineSegment::from_coords(1.0, 1.0, 4.0, 5.0);
        assert_eq!(line.vector(), Vec2::new(3.0, 4.0));
        assert_relative_eq!(line.length(), 5.0);
        assert_relative_eq!(line.length_squared(), 25.0);
        assert_eq!(line.normal(), Vec2::new(4.0, -3.0));
        assert_relative_eq!(line.normal().dot(line.vector()), 0.0);
    }

    #[test]
    fn segment_degenerate() {
        assert!(LineSegment::from_coords(2.0, 2.0, 2.0, 2.0).is_degenerate());
        assert!(LineSegment::from_coords(f32::NAN, 0.0, 1.0, 0.0).is_degenerate());
        assert!(LineSegment::from_coords(0.0, 0.0, f32::INFINITY, 0.0).is_degenerate());
        assert!(!LineSegment::from_coords(0.0, 0.0, 0.01, 0.0).is_degenerate());

        // finite end points, squared length overflows f32
        assert!(LineSegment::from_coords(0.0, 0.0, 1e30, 0.0).is_degenerate());
        assert!(!LineSegment::from_coords(0.0, 0.0, 1e18, 0.0).is_degenerate());
    }

    #[test]
    fn segment_display() {
        let line: LineSegment = [0.5, 1.0, 2.0, 3.25].into();
        assert_eq!(line.to_string(), "0.5 1 2 3.25");
    }
}
