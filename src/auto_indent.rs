//! Applying indent decisions to a buffer
//!
//! [`AutoIndenter`] is the host side of the engine: it decides when the
//! engine is consulted (typed characters, explicit re-indent of a range),
//! turns an [`IndentDirective`] into leading whitespace and writes it back.

use crate::config::{ConfigError, IndentConfig, IndentRules, IndentSettings};
use crate::indent::{IndentDirective, IndentEngine, Trigger};
use crate::text_document::TextDocument;
use std::ops::RangeInclusive;

/// Upper bound for indent and alignment columns
pub const MAX_INDENT: usize = 256;

/// Leading whitespace for an indent of `length` columns aligned to `align`
///
/// With tabs enabled only the indent part uses tabs; alignment is always
/// done with spaces so it survives a different tab width.
pub fn tab_string(length: usize, align: usize, settings: &IndentSettings) -> String {
    let mut length = length.min(MAX_INDENT);
    let spaces = align.saturating_sub(length).min(MAX_INDENT);
    let mut out = String::new();
    if !settings.use_spaces {
        let tab_width = settings.tab_width.max(1);
        out.extend(std::iter::repeat('\t').take(length / tab_width));
        length %= tab_width;
    }
    out.extend(std::iter::repeat(' ').take(length + spaces));
    out
}

#[derive(Debug, Clone)]
pub struct AutoIndenter {
    engine: IndentEngine,
    settings: IndentSettings,
}

impl Default for AutoIndenter {
    fn default() -> Self {
        Self::new(IndentEngine::default(), IndentSettings::default())
    }
}

impl AutoIndenter {
    pub fn new(engine: IndentEngine, settings: IndentSettings) -> Self {
        Self { engine, settings }
    }

    pub fn from_config(config: &IndentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = IndentRules::compile(config)?;
        Ok(Self::new(IndentEngine::new(rules), config.settings))
    }

    pub fn engine(&self) -> &IndentEngine {
        &self.engine
    }

    pub fn settings(&self) -> &IndentSettings {
        &self.settings
    }

    /// Whether this indenter serves a buffer highlighted with `style`
    ///
    /// An empty required style accepts everything.
    pub fn is_style_provided(&self, style: &str) -> bool {
        let required = self.engine.rules().required_syntax_style();
        required.is_empty() || required.eq_ignore_ascii_case(style)
    }

    /// React to `typed` having been inserted on `line`
    ///
    /// Returns whether the line's whitespace changed. Characters that are
    /// neither a newline nor a trigger character are ignored.
    pub fn user_typed_char(&self, doc: &mut TextDocument, line: usize, typed: char) -> bool {
        if !self.engine.rules().is_trigger(typed) {
            return false;
        }
        self.indent_line(doc, line, Trigger::from(typed))
    }

    /// Re-indent every non-blank line in `lines`; returns how many changed
    pub fn indent_lines(&self, doc: &mut TextDocument, lines: RangeInclusive<usize>) -> usize {
        let Some(last) = doc.lines().len().checked_sub(1) else {
            return 0;
        };
        let (start, end) = (*lines.start(), (*lines.end()).min(last));
        let mut changed = 0;
        for line in start..=end {
            if doc.lines()[line].trim().is_empty() {
                continue;
            }
            if self.indent_line(doc, line, Trigger::Manual) {
                changed += 1;
            }
        }
        tracing::debug!("re-indented lines {}..={}: {} changed", start, end, changed);
        changed
    }

    /// Compute and apply the indent of one line
    pub fn indent_line(&self, doc: &mut TextDocument, line: usize, trigger: Trigger) -> bool {
        let directive = self
            .engine
            .indent(doc, line, self.settings.indent_width, trigger);
        self.apply(doc, line, directive)
    }

    /// Write `directive` to `line`; verbatim and no-opinion leave it untouched
    pub fn apply(&self, doc: &mut TextDocument, line: usize, directive: IndentDirective) -> bool {
        let whitespace = match directive {
            IndentDirective::Verbatim | IndentDirective::NoOpinion => return false,
            IndentDirective::SetIndent(indent) => tab_string(indent, 0, &self.settings),
            IndentDirective::AlignTo(indent, align) => tab_string(indent, align, &self.settings),
        };
        doc.set_leading_whitespace(line, &whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(use_spaces: bool) -> IndentSettings {
        IndentSettings {
            tab_width: 4,
            indent_width: 2,
            use_spaces,
        }
    }

    #[test]
    fn test_tab_string_spaces() {
        assert_eq!(tab_string(0, 0, &settings(true)), "");
        assert_eq!(tab_string(6, 0, &settings(true)), "      ");
        assert_eq!(tab_string(2, 5, &settings(true)), "     ");
    }

    #[test]
    fn test_tab_string_tabs_keep_alignment_in_spaces() {
        assert_eq!(tab_string(9, 0, &settings(false)), "\t\t ");
        assert_eq!(tab_string(4, 7, &settings(false)), "\t   ");
    }

    #[test]
    fn test_tab_string_is_clamped() {
        assert_eq!(tab_string(1000, 0, &settings(true)).len(), MAX_INDENT);
        // alignment below the indent adds nothing
        assert_eq!(tab_string(4, 1, &settings(true)), "    ");
    }

    #[test]
    fn test_typed_end_dedents() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_lines(["if ok", "  x", "  end"], 8);
        assert!(indenter.user_typed_char(&mut doc, 2, 'd'));
        assert_eq!(doc.lines()[2], "end");
    }

    #[test]
    fn test_non_trigger_character_is_ignored() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_lines(["if ok", "  x", "  end"], 8);
        assert!(!indenter.user_typed_char(&mut doc, 2, 'x'));
        assert_eq!(doc.lines()[2], "  end");
    }

    #[test]
    fn test_newline_indents_block_body() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_lines(["class Foo", ""], 8);
        assert!(indenter.user_typed_char(&mut doc, 1, '\n'));
        assert_eq!(doc.lines()[1], "  ");
    }

    #[test]
    fn test_indent_lines_reindents_range() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_text(
            "def foo\nif x\ny\n\nend\n      end",
            8,
        );
        let changed = indenter.indent_lines(&mut doc, 0..=10);
        assert_eq!(changed, 4);
        assert_eq!(doc.text(), "def foo\n  if x\n    y\n\n  end\nend");
    }

    #[test]
    fn test_indent_lines_on_empty_document() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_lines(Vec::<String>::new(), 8);
        assert_eq!(indenter.indent_lines(&mut doc, 0..=0), 0);
        assert_eq!(indenter.indent_lines(&mut doc, 3..=7), 0);
        assert!(doc.lines().is_empty());
    }

    #[test]
    fn test_alignment_uses_spaces_after_tabs() {
        let indenter = AutoIndenter::new(IndentEngine::default(), settings(false));
        let mut doc = TextDocument::from_lines(["\tfoo(a,", "b)"], 4);
        assert!(indenter.indent_line(&mut doc, 1, Trigger::Newline));
        // indent of 4 is one tab, alignment to column 8 adds spaces
        assert_eq!(doc.lines()[1], "\t    b)");
    }

    #[test]
    fn test_verbatim_leaves_line_alone() {
        let indenter = AutoIndenter::default();
        let mut doc = TextDocument::from_lines(["s = <<EOS", "   body", "     more"], 8);
        assert!(!indenter.indent_line(&mut doc, 2, Trigger::Manual));
        assert_eq!(doc.lines()[2], "     more");
    }

    #[test]
    fn test_style_check() {
        let indenter = AutoIndenter::default();
        assert!(indenter.is_style_provided("Ruby"));
        assert!(!indenter.is_style_provided("python"));

        let config = IndentConfig {
            required_syntax_style: String::new(),
            ..IndentConfig::default()
        };
        let any = AutoIndenter::from_config(&config).unwrap();
        assert!(any.is_style_provided("python"));
    }
}
