use crate::segment::LineSegment;

/// Errors raised while pairing source and destination lines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrespondenceError {
    /// The source and destination lists do not have the same length.
    #[error("Unequal number of feature lines: {source_count} source vs {dest_count} destination")]
    CorrespondenceCountMismatch {
        /// Number of source lines.
        source_count: usize,
        /// Number of destination lines.
        dest_count: usize,
    },
}

/// One source feature line matched to one destination feature line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLinePair {
    /// Position of the pair in the ordered correspondence list.
    pub index: usize,
    /// The segment in source image coordinates.
    pub source: LineSegment,
    /// The segment in destination image coordinates.
    pub dest: LineSegment,
}

impl FeatureLinePair {
    /// Whether either side of the pair is a zero-length segment.
    pub fn is_degenerate(&self) -> bool {
        self.source.is_degenerate() || self.dest.is_degenerate()
    }
}

/// Check that the two line lists can be paired position by position.
///
/// # Errors
///
/// Returns [`CorrespondenceError::CorrespondenceCountMismatch`] when the lists differ in length.
///
/// # Examples
///
/// ```
/// use linemorph_lines::{validate, LineSegment};
///
/// let lines = vec![LineSegment::from_coords(0.0, 0.0, 3.0, 0.0)];
/// assert!(validate(&lines, &lines).is_ok());
/// assert!(validate(&lines, &[]).is_err());
/// ```
pub fn validate(
    source_lines: &[LineSegment],
    dest_lines: &[LineSegment],
) -> Result<(), CorrespondenceError> {
    if source_lines.len() != dest_lines.len() {
        return Err(CorrespondenceError::CorrespondenceCountMismatch {
            source_count: source_lines.len(),
            dest_count: dest_lines.len(),
        });
    }
    Ok(())
}

/// A validated, ordered list of feature line pairs.
///
/// A value of this type can only be built through [`validate`], so the
/// source and destination sides always have the same number of lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrespondenceSet {
    pairs: Vec<FeatureLinePair>,
}

impl CorrespondenceSet {
    /// Pair the source and destination lines by position.
    ///
    /// # Errors
    ///
    /// Returns [`CorrespondenceError::CorrespondenceCountMismatch`] when the lists differ in length.
    pub fn new(
        source_lines: &[LineSegment],
        dest_lines: &[LineSegment],
    ) -> Result<Self, CorrespondenceError> {
        validate(source_lines, dest_lines)?;

        let pairs = source_lines
            .iter()
            .zip(dest_lines.iter())
            .enumerate()
            .map(|(index, (source, dest))| FeatureLinePair {
                index,
                source: *source,
                dest: *dest,
            })
            .collect::<Vec<_>>();

        log::debug!("created correspondence set with {} pairs", pairs.len());

        Ok(Self { pairs })
    }

    /// The ordered pairs.
    pub fn pairs(&self) -> &[FeatureLinePair] {
        &self.pairs
    }

    /// Iterate over the ordered pairs.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureLinePair> {
        self.pairs.iter()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The source side of every pair, in order.
    pub fn source_lines(&self) -> Vec<LineSegment> {
        self.pairs.iter().map(|pair| pair.source).collect()
    }

    /// The destination side of every pair, in order.
    pub fn dest_lines(&self) -> Vec<LineSegment> {
        self.pairs.iter().map(|pair| pair.dest).collect()
    }

    /// Indices of the pairs with a zero-length source or destination segment.
    pub fn degenerate_pairs(&self) -> Vec<usize> {
        self.pairs
            .iter()
            .filter(|pair| pair.is_degenerate())
            .map(|pair| pair.index)
            .collect()
    }
}

impl<'a> IntoIterator for &'a CorrespondenceSet {
    type Item = &'a FeatureLinePair;
    type IntoIter = std::slice::Iter<'a, FeatureLinePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<LineSegment> {
        (0..n)
            .map(|i| LineSegment::from_coords(0.0, i as f32, 10.0, i as f32))
            .collect()
    }

    #[test]
    fn validate_count_mismatch() {
        let res = validate(&lines(3), &lines(2));
        assert_eq!(
            res,
            Err(CorrespondenceError::CorrespondenceCountMismatch {
                source_count: 3,
                dest_count: 2
            })
        );
        assert!(validate(&[], &[]).is_ok());
    }

    #[test]
    fn correspondence_set_pairs_by_position() -> Result<(), CorrespondenceError> {
        let source = lines(3);
        let dest = vec![
            LineSegment::from_coords(1.0, 1.0, 2.0, 2.0),
            LineSegment::from_coords(3.0, 3.0, 4.0, 4.0),
            LineSegment::from_coords(5.0, 5.0, 6.0, 6.0),
        ];
        let set = CorrespondenceSet::new(&source, &dest)?;

        assert_eq!(set.len(), 3);
        for (k, pair) in set.iter().enumerate() {
            assert_eq!(pair.index, k);
            assert_eq!(pair.source, source[k]);
            assert_eq!(pair.dest, dest[k]);
        }
        assert_eq!(set.source_lines(), source);
        assert_eq!(set.dest_lines(), dest);

        Ok(())
    }

    #[test]
    fn correspondence_set_rejects_mismatch() {
        let res = CorrespondenceSet::new(&lines(1), &lines(4));
        assert!(matches!(
            res,
            Err(CorrespondenceError::CorrespondenceCountMismatch {
                source_count: 1,
                dest_count: 4
            })
        ));
    }

    #[test]
    fn correspondence_set_degenerate_pairs() -> Result<(), CorrespondenceError> {
        let source = vec![
            LineSegment::from_coords(0.0, 0.0, 5.0, 0.0),
            LineSegment::from_coords(1.0, 1.0, 1.0, 1.0),
            LineSegment::from_coords(0.0, 0.0, 0.0, 5.0),
        ];
        let dest = vec![
            LineSegment::from_coords(0.0, 0.0, 5.0, 0.0),
            LineSegment::from_coords(0.0, 0.0, 5.0, 5.0),
            LineSegment::from_coords(2.0, 2.0, 2.0, 2.0),
        ];
        let set = CorrespondenceSet::new(&source, &dest)?;
        assert_eq!(set.degenerate_pairs(), vec![1, 2]);
        assert!(CorrespondenceSet::default().is_empty());

        Ok(())
    }
}
