//! In-memory line buffer implementing [`Document`]
//!
//! Used by the command-line re-indenter and by tests. Highlighting comes from
//! [`crate::highlight`]. The lexer state before every line is kept, so an edit
//! re-highlights from the edited line down until the state settles again.

use crate::document::{Document, Position};
use crate::highlight::{Attribute, RubyHighlighter};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone)]
pub struct TextDocument {
    lines: Vec<String>,
    attributes: Vec<Vec<Attribute>>,
    /// Lexer state at the start of each line
    line_states: Vec<RubyHighlighter>,
    tab_width: usize,
}

impl TextDocument {
    /// Build a document from text; `\r\n` line endings are accepted
    pub fn from_text(text: &str, tab_width: usize) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self::from_lines(lines, tab_width)
    }

    pub fn from_lines<I, S>(lines: I, tab_width: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut doc = Self {
            attributes: vec![Vec::new(); lines.len()],
            line_states: vec![RubyHighlighter::new(); lines.len()],
            lines,
            tab_width: tab_width.max(1),
        };
        doc.rehighlight_from(0, true);
        doc
    }

    /// Re-run the lexer from `start`, stopping once a line begins in the
    /// same state as before (unless `full` is set)
    fn rehighlight_from(&mut self, start: usize, full: bool) {
        let Some(state) = self.line_states.get(start) else {
            return;
        };
        let mut highlighter = state.clone();
        for line in start..self.lines.len() {
            if !full && line > start && self.line_states[line] == highlighter {
                break;
            }
            self.line_states[line] = highlighter.clone();
            self.attributes[line] = highlighter.highlight_line(&self.lines[line]);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// The buffer contents joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Attribute at a position; positions past the end of a line are `Normal`
    pub fn attribute(&self, line: usize, column: usize) -> Attribute {
        self.attributes
            .get(line)
            .and_then(|attrs| attrs.get(column))
            .copied()
            .unwrap_or(Attribute::Normal)
    }

    /// Override the highlighting of one line, e.g. with a host highlighter's
    /// result. The override lasts until an edit re-highlights that line.
    pub fn set_line_attributes(&mut self, line: usize, attributes: Vec<Attribute>) {
        if let Some(slot) = self.attributes.get_mut(line) {
            *slot = attributes;
        }
    }

    /// Replace the leading whitespace of `line`; returns whether it changed
    pub fn set_leading_whitespace(&mut self, line: usize, whitespace: &str) -> bool {
        let Some(text) = self.lines.get_mut(line) else {
            return false;
        };
        let content_start = text
            .bytes()
            .position(|b| b != b' ' && b != b'\t')
            .unwrap_or(text.len());
        if &text[..content_start] == whitespace {
            return false;
        }
        text.replace_range(..content_start, whitespace);
        self.rehighlight_from(line, false);
        true
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> &str {
        self.lines.get(line).map(String::as_str).unwrap_or("")
    }

    fn is_code(&self, line: usize, column: usize) -> bool {
        self.attribute(line, column).is_code()
    }

    fn is_comment(&self, line: usize, column: usize) -> bool {
        self.attribute(line, column).is_comment()
    }

    fn is_attribute_name(&self, line: usize, column: usize, name: &str) -> bool {
        self.attribute(line, column).name() == name
    }

    fn to_virtual_column(&self, line: usize, column: usize) -> usize {
        let text = self.line(line);
        let mut vcol = 0;
        for (_, ch) in text.char_indices().take_while(|(i, _)| *i < column) {
            if ch == '\t' {
                vcol += self.tab_width - vcol % self.tab_width;
            } else {
                vcol += ch.width().unwrap_or(0);
            }
        }
        // Columns past the end of the line count as spaces
        vcol + column.saturating_sub(text.len())
    }

    fn anchor(&self, line: usize, column: usize, bracket: char) -> Option<Position> {
        let (open, close) = match bracket {
            '(' => (b'(', b')'),
            '{' => (b'{', b'}'),
            '[' => (b'[', b']'),
            _ => return None,
        };

        let last = self.lines.len().checked_sub(1)?;
        let (start_line, start_column) = if line > last {
            (last, self.lines[last].len())
        } else {
            (line, column.min(self.lines[line].len()))
        };

        let mut depth = 0usize;
        for l in (0..=start_line).rev() {
            let bytes = self.lines[l].as_bytes();
            let end = if l == start_line {
                start_column
            } else {
                bytes.len()
            };
            for c in (0..end).rev() {
                if !self.is_code(l, c) {
                    continue;
                }
                if bytes[c] == close {
                    depth += 1;
                } else if bytes[c] == open {
                    if depth == 0 {
                        return Some(Position::new(l, c));
                    }
                    depth -= 1;
                }
            }
        }
        None
    }
}
