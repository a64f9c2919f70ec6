//! Read-only document access used by the indenter
//!
//! The indenter never owns the buffer. Everything it knows about the text,
//! the highlighting and the tab layout comes through the [`Document`] trait,
//! so a host editor can plug in its own buffer and highlighter.

use std::cmp::Ordering;
use std::fmt;

/// A zero-based line/column location in a document
///
/// Columns are byte offsets into the line's UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// Whitespace as the host's `nextNonSpace`/`firstChar` helpers see it
fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Read-only view of an editor buffer
///
/// Only `line_count`, `line`, the classification queries, the virtual column
/// conversion and `anchor` need implementing; the rest derive from the text.
pub trait Document {
    /// Number of lines in the buffer
    fn line_count(&self) -> usize;

    /// Text of a line without its terminator, empty when out of range
    fn line(&self, line: usize) -> &str;

    /// Whether the byte at `(line, column)` is code (not comment, string, ...)
    fn is_code(&self, line: usize, column: usize) -> bool;

    /// Whether the byte at `(line, column)` belongs to a comment
    fn is_comment(&self, line: usize, column: usize) -> bool;

    /// Whether the highlighting attribute at `(line, column)` has the given name
    fn is_attribute_name(&self, line: usize, column: usize, name: &str) -> bool;

    /// Visual column of `column` on `line` with tabs expanded
    fn to_virtual_column(&self, line: usize, column: usize) -> usize;

    /// Nearest unmatched opening `bracket` strictly before `(line, column)`
    ///
    /// Only brackets in code count. Returns `None` when every bracket of that
    /// kind before the position is closed again.
    fn anchor(&self, line: usize, column: usize, bracket: char) -> Option<Position>;

    fn line_length(&self, line: usize) -> usize {
        self.line(line).len()
    }

    /// First non-whitespace column
    fn first_column(&self, line: usize) -> Option<usize> {
        self.line(line).bytes().position(|b| !is_space(b))
    }

    /// Last non-whitespace column
    fn last_column(&self, line: usize) -> Option<usize> {
        self.line(line).bytes().rposition(|b| !is_space(b))
    }

    /// Closest line `<= line` with any non-whitespace content
    fn prev_non_empty_line(&self, line: usize) -> Option<usize> {
        let last = self.line_count().checked_sub(1)?;
        (0..=line.min(last))
            .rev()
            .find(|&l| self.first_column(l).is_some())
    }

    /// First non-whitespace column at or after `column`
    fn next_non_space_column(&self, line: usize, column: usize) -> Option<usize> {
        let text = self.line(line).as_bytes();
        (column..text.len()).find(|&c| !is_space(text[c]))
    }

    /// Visual column of the first non-whitespace character
    fn first_virtual_column(&self, line: usize) -> Option<usize> {
        self.first_column(line)
            .map(|column| self.to_virtual_column(line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) > Position::new(0, 40));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(
            Position::new(3, 1).max(Position::new(3, 0)),
            Position::new(3, 1)
        );
    }
}
