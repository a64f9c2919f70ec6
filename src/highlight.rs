//! Lexical classification of Ruby source
//!
//! A line-oriented lexer that is just precise enough for indentation: it
//! tells code apart from comments, strings, here documents and embedded
//! documentation, and assigns one [`Attribute`] to every byte. It does not
//! produce tokens and does not validate anything.
//!
//! State carries across lines, so a string or `=begin` block opened on one
//! line colours the following lines until it is closed.

use std::collections::VecDeque;

/// Highlighting attribute of a single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Normal,
    Comment,
    BlockComment,
    String,
    HereDocument,
}

impl Attribute {
    /// Attribute name as exposed to indenters
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Normal => "Ruby:Normal Text",
            Attribute::Comment => "Ruby:Comment",
            Attribute::BlockComment => "Ruby:Blockcomment",
            Attribute::String => "Ruby:String",
            Attribute::HereDocument => "Ruby:Here Document",
        }
    }

    pub fn is_code(self) -> bool {
        matches!(self, Attribute::Normal)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Attribute::Comment | Attribute::BlockComment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HereDoc {
    terminator: String,
    /// `<<-` and `<<~` allow the terminator to be indented
    indented: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Context {
    #[default]
    Code,
    Quoted {
        close: u8,
        /// Opening delimiter for nestable percent literals like `%w(...)`
        open: Option<u8>,
        depth: usize,
    },
    BlockComment,
}

fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Keywords after which an expression starts, so `/` or `?` opens a literal
const VALUE_KEYWORDS: &[&[u8]] = &[
    b"if", b"elsif", b"unless", b"while", b"until", b"when", b"and", b"or", b"not", b"return",
    b"then", b"in",
];

/// Whether the code before `i` ends with a value, making the byte at `i` a
/// binary operator (`a / b`, `a % (b)`, `x ? y : z`) rather than a literal.
fn operand_before(bytes: &[u8], i: usize) -> bool {
    let Some(p) = bytes[..i].iter().rposition(|&b| !is_space(b)) else {
        return false;
    };
    let last = bytes[p];
    if matches!(last, b')' | b']' | b'}') {
        return true;
    }
    if !is_ident_byte(last) {
        return false;
    }
    let word_start = bytes[..p]
        .iter()
        .rposition(|&b| !is_ident_byte(b))
        .map_or(0, |s| s + 1);
    !VALUE_KEYWORDS.contains(&&bytes[word_start..=p])
}

fn closing_delimiter(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    }
}

/// Incremental highlighter; feed it the lines of a buffer in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RubyHighlighter {
    context: Context,
    heredocs: VecDeque<HereDoc>,
}

impl RubyHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every byte of the next line
    pub fn highlight_line(&mut self, line: &str) -> Vec<Attribute> {
        let bytes = line.as_bytes();
        let mut attrs = vec![Attribute::Normal; bytes.len()];

        if let Some(doc) = self.heredocs.front() {
            let candidate = if doc.indented {
                line.trim_start()
            } else {
                line
            };
            // the terminator line belongs to the here document too
            if candidate.trim_end() == doc.terminator {
                self.heredocs.pop_front();
            }
            attrs.fill(Attribute::HereDocument);
            return attrs;
        }

        if self.context == Context::BlockComment {
            attrs.fill(Attribute::BlockComment);
            if line.starts_with("=end") {
                self.context = Context::Code;
            }
            return attrs;
        }

        if self.context == Context::Code && line.starts_with("=begin") {
            attrs.fill(Attribute::BlockComment);
            self.context = Context::BlockComment;
            return attrs;
        }

        let mut i = 0;
        while i < bytes.len() {
            match self.context {
                Context::Quoted {
                    close,
                    open,
                    ref mut depth,
                } => {
                    attrs[i] = Attribute::String;
                    let byte = bytes[i];
                    if byte == b'\\' {
                        if let Some(next) = attrs.get_mut(i + 1) {
                            *next = Attribute::String;
                        }
                        i += 2;
                        continue;
                    }
                    if Some(byte) == open {
                        *depth += 1;
                    } else if byte == close {
                        if *depth == 0 {
                            self.context = Context::Code;
                        } else {
                            *depth -= 1;
                        }
                    }
                    i += 1;
                }
                Context::BlockComment => {
                    attrs[i] = Attribute::BlockComment;
                    i += 1;
                }
                Context::Code => {
                    i = self.scan_code(bytes, i, &mut attrs);
                }
            }
        }

        attrs
    }

    /// Handle the code byte at `i`, returning the index to continue from
    fn scan_code(&mut self, bytes: &[u8], i: usize, attrs: &mut [Attribute]) -> usize {
        match bytes[i] {
            b'#' => {
                attrs[i..].fill(Attribute::Comment);
                bytes.len()
            }
            quote @ (b'"' | b'\'' | b'`') => {
                attrs[i] = Attribute::String;
                self.context = Context::Quoted {
                    close: quote,
                    open: None,
                    depth: 0,
                };
                i + 1
            }
            b'%' => match percent_literal(bytes, i) {
                Some((delimiter, end)) => {
                    attrs[i..end].fill(Attribute::String);
                    let close = closing_delimiter(delimiter);
                    self.context = Context::Quoted {
                        close,
                        open: (close != delimiter).then_some(delimiter),
                        depth: 0,
                    };
                    end
                }
                None => i + 1,
            },
            b'/' if !operand_before(bytes, i) => {
                attrs[i] = Attribute::String;
                self.context = Context::Quoted {
                    close: b'/',
                    open: None,
                    depth: 0,
                };
                i + 1
            }
            b'?' => match char_literal(bytes, i) {
                Some(end) => {
                    attrs[i..end].fill(Attribute::String);
                    end
                }
                None => i + 1,
            },
            b'<' if bytes.get(i + 1) == Some(&b'<') => match heredoc_opener(bytes, i + 2) {
                Some((doc, end)) => {
                    tracing::trace!("here document opened, terminator {:?}", doc.terminator);
                    self.heredocs.push_back(doc);
                    end
                }
                None => i + 2,
            },
            _ => i + 1,
        }
    }
}

/// Recognize `%w(`, `%q{`, `%(`, ... at `i`; returns the delimiter and the
/// index just past it.
fn percent_literal(bytes: &[u8], i: usize) -> Option<(u8, usize)> {
    let mut j = i + 1;
    let has_type = matches!(
        bytes.get(j),
        Some(b'q' | b'Q' | b'w' | b'W' | b'i' | b'I' | b'r' | b's' | b'x')
    );
    if has_type {
        j += 1;
    }
    let delimiter = *bytes.get(j)?;
    if !matches!(
        delimiter,
        b'(' | b'[' | b'{' | b'<' | b'|' | b'!' | b'/' | b'^'
    ) {
        return None;
    }

    // `a % (b)` is a modulo; only accept a literal where a value can start
    let operand_before = operand_before(bytes, i);
    let touching = i > 0 && !is_space(bytes[i - 1]);
    let accepted = if has_type {
        !(touching && operand_before)
    } else {
        !operand_before
    };
    accepted.then_some((delimiter, j + 1))
}

/// Recognize a character literal like `?a` or `?\n` at `i`; returns the
/// index just past it. `empty?` and the ternary `a ? b : c` are not literals.
fn char_literal(bytes: &[u8], i: usize) -> Option<usize> {
    if operand_before(bytes, i) {
        return None;
    }
    let end = match *bytes.get(i + 1)? {
        b' ' | b'\t' => return None,
        b'\\' => (i + 3).min(bytes.len()),
        _ => i + 2,
    };
    if bytes.get(end).is_some_and(|&b| is_ident_byte(b)) {
        return None;
    }
    Some(end)
}

/// Parse a here document opener starting right after `<<`
fn heredoc_opener(bytes: &[u8], start: usize) -> Option<(HereDoc, usize)> {
    let mut j = start;
    let indented = matches!(bytes.get(j), Some(b'-' | b'~'));
    if indented {
        j += 1;
    }

    let quote = bytes
        .get(j)
        .copied()
        .filter(|b| matches!(b, b'"' | b'\'' | b'`'));
    if let Some(quote) = quote {
        let body_start = j + 1;
        let len = bytes[body_start..].iter().position(|&b| b == quote)?;
        if len == 0 {
            return None;
        }
        let terminator = String::from_utf8_lossy(&bytes[body_start..body_start + len]).into_owned();
        return Some((
            HereDoc {
                terminator,
                indented,
            },
            body_start + len + 1,
        ));
    }

    let first = *bytes.get(j)?;
    // Bare identifiers must look like constants unless `-`/`~` made it explicit
    let starts_ok = if indented {
        first.is_ascii_alphabetic() || first == b'_'
    } else {
        first.is_ascii_uppercase()
    };
    if !starts_ok {
        return None;
    }
    let len = bytes[j..].iter().take_while(|&&b| is_ident_byte(b)).count();
    let terminator = String::from_utf8_lossy(&bytes[j..j + len]).into_owned();
    Some((
        HereDoc {
            terminator,
            indented,
        },
        j + len,
    ))
}

/// Highlight a whole buffer
pub fn highlight<S: AsRef<str>>(lines: &[S]) -> Vec<Vec<Attribute>> {
    let mut highlighter = RubyHighlighter::new();
    lines
        .iter()
        .map(|line| highlighter.highlight_line(line.as_ref()))
        .collect()
}
