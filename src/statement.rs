//! Logical statements and backward statement segmentation
//!
//! A [`Statement`] is a range of physical lines that form one logical line of
//! Ruby: lines joined by a trailing backslash, a trailing operator or comma,
//! or an unclosed bracket. Statements are views: their text is rebuilt from
//! the document whenever it is needed.
//!
//! ```text
//! x = foo(1,      <- start
//!         2) +
//!     bar         <- end
//! ```

use crate::config::IndentRules;
use crate::document::{Document, Position};
use std::fmt;

/// Inclusive line range of one logical statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Statement {
    pub start: usize,
    pub end: usize,
}

impl Statement {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "statement start {start} after end {end}");
        Self { start, end }
    }

    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }

    /// Text of the statement
    ///
    /// Lines are joined with a single space and a trailing continuation
    /// backslash becomes a space, so every byte offset maps back to exactly
    /// one document position (see [`Statement::offset_to_cursor`]).
    pub fn content<D: Document + ?Sized>(&self, doc: &D) -> String {
        let mut content = String::new();
        for line in self.start..=self.end {
            let text = doc.line(line);
            match text.strip_suffix('\\') {
                Some(head) => {
                    content.push_str(head);
                    content.push(' ');
                }
                None => content.push_str(text),
            }
            if line < self.end {
                content.push(' ');
            }
        }
        content
    }

    /// Document position of a byte offset into [`Statement::content`]
    ///
    /// Offsets that land on a joining space map to the column just past the
    /// end of that line.
    pub fn offset_to_cursor<D: Document + ?Sized>(&self, doc: &D, offset: usize) -> Position {
        let mut line = self.start;
        let mut offset = offset;
        while line < self.end && doc.line_length(line) < offset {
            offset -= doc.line_length(line) + 1;
            line += 1;
        }
        Position::new(line, offset)
    }

    /// Inverse of [`Statement::offset_to_cursor`]
    pub fn cursor_to_offset<D: Document + ?Sized>(&self, doc: &D, position: Position) -> usize {
        (self.start..position.line)
            .map(|line| doc.line_length(line) + 1)
            .sum::<usize>()
            + position.column
    }

    pub fn is_code<D: Document + ?Sized>(&self, doc: &D, offset: usize) -> bool {
        let cursor = self.offset_to_cursor(doc, offset);
        doc.is_code(cursor.line, cursor.column)
    }

    pub fn is_comment<D: Document + ?Sized>(&self, doc: &D, offset: usize) -> bool {
        let cursor = self.offset_to_cursor(doc, offset);
        doc.is_comment(cursor.line, cursor.column)
    }

    /// Indent (virtual column) of the statement's first line
    pub fn indent<D: Document + ?Sized>(&self, doc: &D) -> usize {
        doc.first_virtual_column(self.start).unwrap_or(0)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.start, self.end)
    }
}

/// Borrowed document and rules for one indent computation
///
/// Nothing is cached: every query goes back to the document.
#[derive(Debug)]
pub struct Analyzer<'a, D: Document + ?Sized> {
    pub(crate) doc: &'a D,
    pub(crate) rules: &'a IndentRules,
}

impl<'a, D: Document + ?Sized> Analyzer<'a, D> {
    pub fn new(doc: &'a D, rules: &'a IndentRules) -> Self {
        Self { doc, rules }
    }

    /// Closest line `<= line` that is neither blank nor a whole-line comment
    pub fn previous_non_comment_line(&self, line: usize) -> Option<usize> {
        let mut line = self.doc.prev_non_empty_line(line)?;
        loop {
            let first = self.doc.first_column(line).unwrap_or(0);
            if !self.doc.is_comment(line, first) {
                return Some(line);
            }
            line = self.doc.prev_non_empty_line(line.checked_sub(1)?)?;
        }
    }

    /// First line of the statement containing `current`
    ///
    /// Steps back while the previous code line continues onto the one after
    /// it. Never returns a line greater than `current`.
    pub fn find_statement_start(&self, current: usize) -> usize {
        let mut line = current;
        loop {
            if line == 0 {
                return 0;
            }
            let Some(prev) = self.previous_non_comment_line(line - 1) else {
                return line;
            };
            // A backslash only joins physically adjacent lines
            let continues = (prev + 1 == line && self.is_line_continuing(prev))
                || self.is_statement_continuing(prev);
            if !continues {
                return line;
            }
            line = prev;
        }
    }

    /// The statement ending at the last code line at or above `line`
    pub fn find_previous_statement(&self, line: usize) -> Option<Statement> {
        let end = self.previous_non_comment_line(line)?;
        let start = self.find_statement_start(end);
        let stmt = Statement::new(start, end);
        tracing::trace!("previous statement for line {}: {}", line, stmt);
        Some(stmt)
    }
}
