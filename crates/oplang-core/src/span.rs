//! Source location tracking for diagnostics.
//!
//! Provides [`Span`], the position every AST node and every
//! [`CompilationError`](crate::CompilationError) carries.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Nodes built programmatically (tests, synthesized members) use
/// [`Span::default`], which renders as `0:0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed, 0 when unknown).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Extend this span so it also covers `other`.
    ///
    /// Only same-line spans are merged precisely; otherwise the start of
    /// `self` is kept and the lengths are summed.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        if self.line != other.line {
            return Span::new(self.line, self.col, self.len + other.len);
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        assert_eq!(Span::new(3, 15, 5).to_string(), "3:15");
        assert_eq!(Span::default().to_string(), "0:0");
    }

    #[test]
    fn to_same_line() {
        let merged = Span::new(1, 10, 3).to(Span::new(1, 5, 3));
        assert_eq!(merged, Span::new(1, 5, 8));
    }

    #[test]
    fn to_other_line_keeps_start() {
        let merged = Span::new(1, 5, 10).to(Span::new(3, 10, 5));
        assert_eq!(merged, Span::new(1, 5, 15));
    }
}
