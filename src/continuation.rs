//! Detection of statements that continue onto the next line

use crate::document::Document;
use crate::statement::{Analyzer, Statement};
use regex::Regex;

/// Look for `pattern` at the end of a statement
///
/// A match counts when it starts in code and ends either at the end of the
/// statement text or where a comment begins. Every match is considered, not
/// just the first: an earlier match inside a string must not hide a later
/// one in real code.
pub fn test_at_end<D: Document + ?Sized>(doc: &D, stmt: &Statement, pattern: &Regex) -> bool {
    let content = stmt.content(doc);
    pattern.find_iter(&content).any(|m| {
        stmt.is_code(doc, m.start())
            && (m.end() == content.len() || stmt.is_comment(doc, m.end()))
    })
}

impl<D: Document + ?Sized> Analyzer<'_, D> {
    pub fn test_at_end(&self, stmt: &Statement, pattern: &Regex) -> bool {
        test_at_end(self.doc, stmt, pattern)
    }

    /// Whether `line` ends with a continuation backslash
    pub fn is_line_continuing(&self, line: usize) -> bool {
        self.doc.line(line).ends_with('\\')
    }

    /// Whether the statement ending on `line` carries on to the next line
    ///
    /// True inside an unclosed bracket, or when the line ends with an
    /// operator, `and`/`or`, or a comma.
    pub fn is_statement_continuing(&self, line: usize) -> bool {
        if self.last_anchor(line + 1, 0).is_some() {
            return true;
        }
        self.test_at_end(&Statement::new(line, line), &self.rules.continuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndentRules;
    use crate::text_document::TextDocument;

    fn continuing(lines: &[&str], line: usize) -> bool {
        let rules = IndentRules::default();
        let doc = TextDocument::from_lines(lines.iter().copied(), 8);
        Analyzer::new(&doc, &rules).is_statement_continuing(line)
    }

    #[test]
    fn test_trailing_operators_continue() {
        assert!(continuing(&["x = 1 +"], 0));
        assert!(continuing(&["ok = a &&  "], 0));
        assert!(continuing(&["foo a,"], 0));
        assert!(continuing(&["valid = x and"], 0));
        assert!(!continuing(&["x = 1"], 0));
        assert!(!continuing(&["x = band"], 0));
    }

    #[test]
    fn test_operator_before_comment_continues() {
        assert!(continuing(&["total = a + # more below"], 0));
    }

    #[test]
    fn test_operator_inside_string_does_not_continue() {
        assert!(!continuing(&["puts 'a +'"], 0));
        assert!(!continuing(&["x = 1 # trailing +"], 0));
    }

    #[test]
    fn test_later_match_wins_over_string_match() {
        let rules = IndentRules::default();
        let doc = TextDocument::from_lines(["s = \"a,\" +"], 8);
        let stmt = Statement::new(0, 0);
        // the first `,` sits in the string; the trailing `+` is code
        assert!(test_at_end(&doc, &stmt, &rules.continuation));
        assert!(!test_at_end(&doc, &stmt, &rules.trailing_comma));
    }

    #[test]
    fn test_unclosed_bracket_continues() {
        assert!(continuing(&["call(a", "  b"], 0));
        assert!(!continuing(&["call(a)", "b"], 0));
    }

    #[test]
    fn test_backslash_continuation() {
        let rules = IndentRules::default();
        let doc = TextDocument::from_lines(["x = 1 \\", "y"], 8);
        let analyzer = Analyzer::new(&doc, &rules);
        assert!(analyzer.is_line_continuing(0));
        assert!(!analyzer.is_line_continuing(1));
    }
}
