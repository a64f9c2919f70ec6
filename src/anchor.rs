//! Nearest still-open bracket

use crate::document::{Document, Position};
use crate::statement::Analyzer;

/// Brackets that can anchor continuation lines
pub const ANCHOR_BRACKETS: [char; 3] = ['(', '{', '['];

/// An unmatched opening bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub position: Position,
    pub bracket: char,
}

impl<D: Document + ?Sized> Analyzer<'_, D> {
    /// The latest unmatched `(`, `{` or `[` before `(line, column)`
    pub fn last_anchor(&self, line: usize, column: usize) -> Option<Anchor> {
        ANCHOR_BRACKETS
            .iter()
            .filter_map(|&bracket| {
                self.doc
                    .anchor(line, column, bracket)
                    .map(|position| Anchor { position, bracket })
            })
            .max_by_key(|anchor| anchor.position)
    }

    /// Whether nothing but whitespace or a comment follows `column` on `line`
    pub fn is_last_code_column(&self, line: usize, column: usize) -> bool {
        match self.doc.last_column(line) {
            Some(last) if column < last => self
                .doc
                .next_non_space_column(line, column + 1)
                .is_some_and(|next| self.doc.is_comment(line, next)),
            _ => true,
        }
    }
}
