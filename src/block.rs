//! Block openers and closers
//!
//! Blocks open with a leading keyword (`def`, `if`, `class`, ...) or a
//! trailing `do`/`{` with optional `|params|`, and close with `end`, a branch
//! keyword (`else`, `when`, `rescue`, ...) or a closing bracket at the start
//! of a line. Branch keywords both close and open, so they leave the nesting
//! level unchanged while searching backwards.

use crate::document::Document;
use crate::statement::{Analyzer, Statement};

impl<D: Document + ?Sized> Analyzer<'_, D> {
    pub fn is_block_start(&self, stmt: &Statement) -> bool {
        let content = stmt.content(self.doc);
        if self.rules.block_start.is_match(&content) {
            return true;
        }
        self.test_at_end(stmt, &self.rules.block_opener_tail)
    }

    pub fn is_block_end(&self, stmt: &Statement) -> bool {
        self.rules.block_end.is_match(&stmt.content(self.doc))
    }

    /// The statement opening the block that `line` closes
    ///
    /// Walks back statement by statement, skipping nested blocks. Returns
    /// `None` when the start of the buffer is reached first.
    pub fn find_block_start(&self, line: usize) -> Option<Statement> {
        let mut nested = 0usize;
        let mut stmt = Statement::new(line, line);
        loop {
            if stmt.start == 0 {
                return None;
            }
            stmt = self.find_previous_statement(stmt.start - 1)?;
            if self.is_block_end(&stmt) {
                nested += 1;
            }
            if self.is_block_start(&stmt) {
                if nested == 0 {
                    return Some(stmt);
                }
                nested -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndentRules;
    use crate::text_document::TextDocument;

    fn doc(lines: &[&str]) -> TextDocument {
        TextDocument::from_lines(lines.iter().copied(), 8)
    }

    #[test]
    fn test_keyword_block_start() {
        let rules = IndentRules::default();
        let d = doc(&["  def foo(a)", "unless x", "x = if y", "definitely"]);
        let analyzer = Analyzer::new(&d, &rules);
        assert!(analyzer.is_block_start(&Statement::new(0, 0)));
        assert!(analyzer.is_block_start(&Statement::new(1, 1)));
        assert!(!analyzer.is_block_start(&Statement::new(2, 2)));
        assert!(!analyzer.is_block_start(&Statement::new(3, 3)));
    }

    #[test]
    fn test_do_and_brace_block_start() {
        let rules = IndentRules::default();
        let d = doc(&[
            "items.each do |item|",
            "items.map { |x, y| # pairs",
            "loop do",
            "puts 'do'",
            "x = { a: 1 }",
        ]);
        let analyzer = Analyzer::new(&d, &rules);
        assert!(analyzer.is_block_start(&Statement::new(0, 0)));
        assert!(analyzer.is_block_start(&Statement::new(1, 1)));
        assert!(analyzer.is_block_start(&Statement::new(2, 2)));
        assert!(!analyzer.is_block_start(&Statement::new(3, 3)));
        assert!(!analyzer.is_block_start(&Statement::new(4, 4)));
    }

    #[test]
    fn test_block_end() {
        let rules = IndentRules::default();
        let d = doc(&["  end", "else", "}", "endpoint = 1", "  ] + x"]);
        let analyzer = Analyzer::new(&d, &rules);
        assert!(analyzer.is_block_end(&Statement::new(0, 0)));
        assert!(analyzer.is_block_end(&Statement::new(1, 1)));
        assert!(analyzer.is_block_end(&Statement::new(2, 2)));
        assert!(!analyzer.is_block_end(&Statement::new(3, 3)));
        assert!(analyzer.is_block_end(&Statement::new(4, 4)));
    }

    #[test]
    fn test_find_block_start_skips_nested_blocks() {
        let rules = IndentRules::default();
        let d = doc(&[
            "class Foo",
            "  def bar",
            "    if x",
            "      y",
            "    else",
            "      z",
            "    end",
            "  end",
            "end",
        ]);
        let analyzer = Analyzer::new(&d, &rules);
        assert_eq!(analyzer.find_block_start(8), Some(Statement::new(0, 0)));
        assert_eq!(analyzer.find_block_start(7), Some(Statement::new(1, 1)));
        // `else` both closes and reopens, so `end` pairs with the `if`
        assert_eq!(analyzer.find_block_start(6), Some(Statement::new(2, 2)));
        assert_eq!(analyzer.find_block_start(4), Some(Statement::new(2, 2)));
    }

    #[test]
    fn test_find_block_start_unbalanced() {
        let rules = IndentRules::default();
        let d = doc(&["x = 1", "end"]);
        let analyzer = Analyzer::new(&d, &rules);
        assert_eq!(analyzer.find_block_start(1), None);
        assert_eq!(analyzer.find_block_start(0), None);
    }
}
