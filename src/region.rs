use std::ops::{Index, Range};

/// Represents an area within source text.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new Region from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Return true if the [`Region`] spans no text.
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// Access the literal value of a [`Region`].
    ///
    /// A `Region` that is out of bounds, or does not fall on character
    /// boundaries, produces an empty string.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source.get(self.begin..self.end).unwrap_or_default()
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        let Region { begin, end } = region;

        &self[begin..end]
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self {
            begin: value.start,
            end: value.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        let source = "Hello, {{name}}!";
        let region = Region::new(9..13);

        assert_eq!(region.literal(source), "name");
        assert_eq!(&source[region], "name");
    }

    #[test]
    fn test_out_of_bounds_literal() {
        let source = "Hello, Taylor!";
        let region = Region::new(7..15);

        assert_eq!(region.literal(source), "");
    }

    #[test]
    fn test_is_empty() {
        assert!(Region::new(4..4).is_empty());
        assert!(!Region::new(4..5).is_empty());
    }
}
