//! Source positions.
//!
//! [`Span`] is a byte range into the parsed text and [`Spanned`] attaches one
//! to a value. [`Location`] is the human-facing line and column form used in
//! diagnostics.

use std::{fmt, ops::Range};

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a span from a byte range.
    ///
    /// ```
    /// # use dotweave_parser::Span;
    /// let span = Span::new(4..9);
    /// assert_eq!(span.len(), 5);
    /// ```
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(self) -> usize {
        self.start
    }

    pub fn end(self) -> usize {
        self.end
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both spans.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns a span shifted right by `offset` bytes.
    pub fn offset(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

/// A value paired with the span it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn inner(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }
}

/// One-based line and column of a byte offset.
///
/// Columns count characters, not bytes. Both `\n` and `\r\n` end a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolves a byte offset in `source` to a line and column.
    ///
    /// Offsets past the end resolve to the position just after the last
    /// character.
    ///
    /// ```
    /// # use dotweave_parser::Location;
    /// let source = "digraph {\n  a;\n}";
    /// let loc = Location::from_offset(source, 12);
    /// assert_eq!((loc.line, loc.column), (2, 3));
    /// ```
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (index, ch) in source.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else if ch != '\r' {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_union() {
        let a = Span::new(3..5);
        let b = Span::new(10..12);
        assert_eq!(a.union(b), Span::new(3..12));
        assert_eq!(b.union(a), Span::new(3..12));
    }

    #[test]
    fn test_span_reversed_range_is_empty() {
        #[allow(clippy::reversed_empty_ranges)]
        let span = Span::new(8..2);
        assert!(span.is_empty());
        assert_eq!(span.start(), 8);
    }

    #[test]
    fn test_span_offset() {
        assert_eq!(Span::new(1..4).offset(10), Span::new(11..14));
    }

    #[test]
    fn test_spanned_map() {
        let spanned = Spanned::new("42", Span::new(0..2));
        let number = spanned.map(|s| s.parse::<i32>().unwrap());
        assert_eq!(*number.inner(), 42);
        assert_eq!(number.span(), Span::new(0..2));
    }

    #[test]
    fn test_location_first_line() {
        let loc = Location::from_offset("abc", 0);
        assert_eq!(loc, Location { line: 1, column: 1 });
    }

    #[test]
    fn test_location_crlf() {
        let source = "a\r\nbc";
        let loc = Location::from_offset(source, 4);
        assert_eq!(loc, Location { line: 2, column: 2 });
    }

    #[test]
    fn test_location_counts_chars() {
        let source = "é x";
        let loc = Location::from_offset(source, 3);
        assert_eq!(loc, Location { line: 1, column: 3 });
    }

    #[test]
    fn test_location_past_end() {
        let loc = Location::from_offset("ab\n", 100);
        assert_eq!(loc, Location { line: 2, column: 1 });
    }
}
