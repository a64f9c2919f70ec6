//! Indent decision engine
//!
//! # Overview
//!
//! The host asks "what indent should line L have?" whenever a newline or a
//! trigger character is typed, or when the user re-indents explicitly. The
//! engine answers from the text above L alone:
//!
//! 1. Trigger check: a typed character only counts when it completes a block
//!    closer like `end` or `}` and nothing follows it.
//! 2. The previous statement is rebuilt by walking back over comments, blank
//!    lines and continuation lines.
//! 3. Here documents and `=begin` blocks are left alone ([`IndentDirective::Verbatim`]).
//! 4. Inside an open bracket, continuation lines either align to the content
//!    after the bracket or indent one level past the bracket's line.
//! 5. Lines continuing an operator or backslash get a double indent.
//! 6. Block closers dedent to their opener.
//! 7. Lines after a block opener indent one level.
//! 8. Everything else keeps the previous statement's indent.
//!
//! # Example
//!
//! ```text
//! def foo(a, b)     <- block opener
//!   x = compute(a,  <- statement spans two lines
//!               b)  <- aligned to the bracket
//!   x +
//!       1           <- operator continuation (double indent)
//! end               <- dedented to `def`
//! ```
//!
//! Nothing is cached between calls: the buffer may change arbitrarily between
//! keystrokes, so every call rebuilds what it needs from the document.

use crate::anchor::Anchor;
use crate::config::IndentRules;
use crate::document::Document;
use crate::statement::{Analyzer, Statement};

/// What caused the indent request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Explicit re-indent by the user
    Manual,
    /// A new line was inserted
    Newline,
    /// A trigger character was typed
    Char(char),
}

impl Trigger {
    /// Interpret the host's typed-text convention: `""`, `"\n"` or one character
    pub fn from_typed(typed: &str) -> Self {
        let mut chars = typed.chars();
        match chars.next() {
            None => Trigger::Manual,
            Some('\n') => Trigger::Newline,
            Some(ch) => Trigger::Char(ch),
        }
    }
}

impl From<char> for Trigger {
    fn from(ch: char) -> Self {
        if ch == '\n' {
            Trigger::Newline
        } else {
            Trigger::Char(ch)
        }
    }
}

/// The engine's answer for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirective {
    /// Leave the line exactly as it is (here document, embedded docs)
    Verbatim,
    /// No opinion; keep whatever indent the line has
    NoOpinion,
    /// Indent to this virtual column
    SetIndent(usize),
    /// Indent to the first value, then align with spaces to the second
    AlignTo(usize, usize),
}

impl IndentDirective {
    /// Numeric encoding used by script-based hosts
    ///
    /// `-1` is verbatim, `-2` is no opinion; alignment is returned separately.
    pub fn to_legacy(self) -> (i64, Option<i64>) {
        match self {
            IndentDirective::Verbatim => (-1, None),
            IndentDirective::NoOpinion => (-2, None),
            IndentDirective::SetIndent(indent) => (indent as i64, None),
            IndentDirective::AlignTo(indent, align) => (indent as i64, Some(align as i64)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndentError {
    #[error("line {line} is outside the document ({line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },
}

/// Indent calculator for one language configuration
#[derive(Debug, Clone, Default)]
pub struct IndentEngine {
    rules: IndentRules,
}

impl IndentEngine {
    pub fn new(rules: IndentRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &IndentRules {
        &self.rules
    }

    /// Calculate the indent for `line`
    ///
    /// Never fails: any internal error is logged and reported as
    /// [`IndentDirective::NoOpinion`].
    pub fn indent<D: Document + ?Sized>(
        &self,
        doc: &D,
        line: usize,
        indent_width: usize,
        trigger: Trigger,
    ) -> IndentDirective {
        match self.try_indent(doc, line, indent_width, trigger) {
            Ok(directive) => directive,
            Err(e) => {
                tracing::warn!("indent for line {} aborted: {}", line, e);
                IndentDirective::NoOpinion
            }
        }
    }

    pub fn try_indent<D: Document + ?Sized>(
        &self,
        doc: &D,
        line: usize,
        indent_width: usize,
        trigger: Trigger,
    ) -> Result<IndentDirective, IndentError> {
        let line_count = doc.line_count();
        if line >= line_count {
            return Err(IndentError::LineOutOfRange { line, line_count });
        }

        let directive = Analyzer::new(doc, &self.rules).decide(line, indent_width, trigger);
        tracing::debug!(
            "indent line {} ({:?}): {:?}",
            line,
            trigger,
            directive
        );
        Ok(directive)
    }
}

impl<D: Document + ?Sized> Analyzer<'_, D> {
    /// Typed characters only re-indent a line that is exactly a block closer,
    /// so typing `d` in `endpoint` or `end of story` does nothing.
    fn is_valid_trigger(&self, line: usize, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Manual | Trigger::Newline => true,
            Trigger::Char(_) => self.rules.block_end_match(self.doc.line(line)) == Some(true),
        }
    }

    fn is_verbatim(&self, line: usize) -> bool {
        let Some(prev) = self.doc.prev_non_empty_line(line) else {
            return false;
        };
        let column = self.doc.line_length(prev).saturating_sub(1);
        self.rules
            .verbatim_attributes
            .iter()
            .any(|name| self.doc.is_attribute_name(prev, column, name))
    }

    fn decide(&self, line: usize, indent_width: usize, trigger: Trigger) -> IndentDirective {
        if !self.is_valid_trigger(line, trigger) {
            tracing::trace!("line {}: {:?} is not a valid trigger here", line, trigger);
            return IndentDirective::NoOpinion;
        }

        // Can't indent the first line
        let Some(prev_stmt) = line
            .checked_sub(1)
            .and_then(|above| self.find_previous_statement(above))
        else {
            return IndentDirective::NoOpinion;
        };

        if self.is_verbatim(line) {
            tracing::trace!("line {}: inside a verbatim region", line);
            return IndentDirective::Verbatim;
        }

        let prev_indent = prev_stmt.indent(self.doc);

        // Inside a parameter list, array or hash?
        if let Some(anchor) = self.last_anchor(line, 0) {
            return self.indent_in_brackets(anchor, &prev_stmt, indent_width);
        }

        // Multi-line statements
        if (prev_stmt.end + 1 == line && self.is_line_continuing(prev_stmt.end))
            || self.is_statement_continuing(prev_stmt.end)
        {
            if !prev_stmt.is_single_line() {
                return IndentDirective::SetIndent(
                    self.doc
                        .first_virtual_column(prev_stmt.end)
                        .unwrap_or(prev_indent),
                );
            }
            // Don't force a specific indent level when aligning manually
            if trigger == Trigger::Manual
                && self.doc.first_virtual_column(line)
                    > self.doc.first_virtual_column(prev_stmt.end)
            {
                return IndentDirective::NoOpinion;
            }
            return IndentDirective::SetIndent(prev_indent + indent_width * 2);
        }

        if self.rules.block_end.is_match(self.doc.line(line)) {
            return match self.find_block_start(line) {
                Some(start) => IndentDirective::SetIndent(start.indent(self.doc)),
                None => {
                    tracing::debug!("line {}: no matching block start", line);
                    IndentDirective::NoOpinion
                }
            };
        }

        if self.is_block_start(&prev_stmt)
            || self
                .rules
                .loose_opener
                .is_match(&prev_stmt.content(self.doc))
        {
            return IndentDirective::SetIndent(prev_indent + indent_width);
        }

        IndentDirective::SetIndent(prev_indent)
    }

    /// Indent a line that sits inside the still-open bracket `anchor`
    fn indent_in_brackets(
        &self,
        anchor: Anchor,
        prev_stmt: &Statement,
        indent_width: usize,
    ) -> IndentDirective {
        let position = anchor.position;
        let should_indent = position.line == prev_stmt.end
            || self.test_at_end(prev_stmt, &self.rules.trailing_comma);

        let hanging = self.is_last_code_column(position.line, position.column)
            && self.last_anchor(position.line, position.column).is_none();
        if hanging {
            let base = self.doc.first_virtual_column(position.line).unwrap_or(0);
            return IndentDirective::SetIndent(base + if should_indent { indent_width } else { 0 });
        }

        // Align with the first element after the bracket
        let mut column = position.column;
        if should_indent {
            column += 1;
            if let Some(next) = self.doc.next_non_space_column(position.line, column) {
                if next > 0 && !self.doc.is_comment(position.line, next) {
                    column = next;
                }
            }
        }
        IndentDirective::AlignTo(
            prev_stmt.indent(self.doc),
            self.doc.to_virtual_column(position.line, column),
        )
    }
}
