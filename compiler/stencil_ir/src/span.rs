//! Byte ranges into template source.

use std::fmt;
use std::ops::Range;

/// Half-open byte range `start..end` into the template source.
///
/// Offsets are `u32`: the lexer refuses sources over 4 GiB, so every span it
/// builds fits. Lexer spans fall on character boundaries, so slicing the
/// source they came from with [`to_range`](Span::to_range) cannot panic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// For nodes that have no source text of their own.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Saturates offsets past `u32::MAX`.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        let clamp = |offset: usize| u32::try_from(offset).unwrap_or(u32::MAX);
        Span::new(clamp(range.start), clamp(range.end))
    }

    /// Zero-width span at `offset`, e.g. for "expected X here" reports.
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span::new(offset, offset)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// The covered text, or `None` when the span is out of bounds or splits
    /// a character.
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.to_range())
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        assert_eq!(Span::new(20, 30).merge(Span::new(0, 10)), Span::new(0, 30));
        assert_eq!(Span::new(2, 4).merge(Span::new(3, 3)), Span::new(2, 4));
    }

    #[test]
    fn from_range_saturates() {
        let huge = u32::MAX as usize + 7;
        assert_eq!(Span::from_range(1..huge), Span::new(1, u32::MAX));
    }

    #[test]
    fn text_slices_the_source() {
        let source = "hello {{ name }}";
        assert_eq!(Span::new(9, 13).text(source), Some("name"));
        assert_eq!(Span::new(9, 100).text(source), None);
        assert_eq!(Span::new(1, 2).text("é"), None);
    }

    #[test]
    fn points_are_empty() {
        let point = Span::point(42);
        assert!(point.is_empty());
        assert_eq!(format!("{point:?}"), "42..42");
    }
}
