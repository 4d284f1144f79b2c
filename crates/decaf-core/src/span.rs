//! Source location tracking for diagnostics.
//!
//! A [`Span`] records the first and last line/column of a construct, the
//! same shape the grammar-driven parser hands over for every node.

use std::fmt;

/// A region of source text.
///
/// Lines and columns are 1-indexed. A default span (all zeros) marks a node
/// built without location information, which only happens in synthetic trees.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line where the construct starts.
    pub first_line: u32,
    /// Column where the construct starts.
    pub first_col: u32,
    /// Line where the construct ends.
    pub last_line: u32,
    /// Column where the construct ends (inclusive).
    pub last_col: u32,
}

impl Span {
    /// Create a span covering `first_line:first_col` through `last_line:last_col`.
    #[inline]
    pub fn new(first_line: u32, first_col: u32, last_line: u32, last_col: u32) -> Self {
        Self {
            first_line,
            first_col,
            last_line,
            last_col,
        }
    }

    /// Create a single-line span starting at `line:col` and `len` columns wide.
    #[inline]
    pub fn on_line(line: u32, col: u32, len: u32) -> Self {
        Self::new(line, col, line, col + len.saturating_sub(1))
    }

    /// Whether this span was built without location information.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.first_line == 0
    }

    /// Join two spans into one running from the start of `self` to the end of `other`.
    ///
    /// An unknown side yields the other side unchanged.
    pub fn join(self, other: Span) -> Span {
        if self.is_unknown() {
            return other;
        }
        if other.is_unknown() {
            return self;
        }
        let starts_first = (self.first_line, self.first_col) <= (other.first_line, other.first_col);
        let (start, end) = if starts_first {
            (self, other)
        } else {
            (other, self)
        };
        let last = if (end.last_line, end.last_col) >= (start.last_line, start.last_col) {
            end
        } else {
            start
        };
        Span::new(start.first_line, start.first_col, last.last_line, last.last_col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.first_line, self.first_col, self.last_line, self.last_col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first_line, self.first_col)
    }
}
