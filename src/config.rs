//! Indenter configuration: JSON settings and the compiled pattern rules

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Keywords that open a block when they start a statement
pub const DEFAULT_BLOCK_START_PATTERN: &str =
    r"^\s*(def|if|unless|for|while|until|class|module|else|elsif|case|when|begin|rescue|ensure|catch)\b";

/// Keywords and brackets that close a block; `trailing` captures the rest of the line
pub const DEFAULT_BLOCK_END_PATTERN: &str =
    r"^\s*((end|when|else|elsif|rescue|ensure)\b|[\]\}])(?P<trailing>.*)$";

/// Trailing operators, `and`/`or` and commas that continue a statement
pub const DEFAULT_CONTINUATION_PATTERN: &str = r"((\+|-|\*|/|=|&&|\|\||\band\b|\bor\b|,)\s*)";

/// A trailing `do` or `{` with an optional `|params|` list
pub const DEFAULT_BLOCK_OPENER_TAIL_PATTERN: &str = r"((\bdo\b|\{)(\s*\|.*\|)?\s*)";

pub const DEFAULT_TRAILING_COMMA_PATTERN: &str = r",\s*";

/// `[` or `{` as the last thing in a statement
pub const DEFAULT_LOOSE_OPENER_PATTERN: &str = r"[\[\{]\s*$";

/// Name of the capture group the block-end pattern must define
pub const TRAILING_GROUP: &str = "trailing";

/// Whitespace layout used when applying an indent to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndentSettings {
    /// Number of columns a tab character advances to
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Number of columns per indentation level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Indent with spaces only (otherwise whole tab widths become tabs)
    #[serde(default = "default_true")]
    pub use_spaces: bool,
}

impl Default for IndentSettings {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
            indent_width: default_indent_width(),
            use_spaces: true,
        }
    }
}

/// Language configuration of the indenter
///
/// Every pattern is a regular expression in `regex` crate syntax. Patterns
/// tested "at end" are applied to the whole statement text, and only a match
/// that starts in code and ends at the end of the statement (or at a comment)
/// counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndentConfig {
    /// Display name of the indenter
    #[serde(default = "default_name")]
    pub name: String,

    /// Highlighting style the indenter needs for code/comment classification
    #[serde(default = "default_required_syntax_style")]
    pub required_syntax_style: String,

    /// Languages this indenter applies to
    #[serde(default = "default_indent_languages")]
    pub indent_languages: Vec<String>,

    /// Characters, besides newline, whose insertion re-indents the line
    #[serde(default = "default_trigger_characters")]
    pub trigger_characters: String,

    /// Statements matching this open a block
    #[serde(default = "default_block_start_pattern")]
    pub block_start_pattern: String,

    /// Lines matching this close a block; must define a `trailing` group
    #[serde(default = "default_block_end_pattern")]
    pub block_end_pattern: String,

    /// Tested at end: the statement continues on the next line
    #[serde(default = "default_continuation_pattern")]
    pub continuation_pattern: String,

    /// Tested at end: a block opened by `do` or `{`
    #[serde(default = "default_block_opener_tail_pattern")]
    pub block_opener_tail_pattern: String,

    /// Tested at end: the statement ends in a comma
    #[serde(default = "default_trailing_comma_pattern")]
    pub trailing_comma_pattern: String,

    /// Searched in the statement text: an opening bracket with nothing after it
    #[serde(default = "default_loose_opener_pattern")]
    pub loose_opener_pattern: String,

    /// Highlighting attributes whose lines are left exactly as they are
    #[serde(default = "default_verbatim_attributes")]
    pub verbatim_attributes: Vec<String>,

    #[serde(default)]
    pub settings: IndentSettings,
}

fn default_name() -> String {
    "Ruby".to_string()
}

fn default_required_syntax_style() -> String {
    "ruby".to_string()
}

fn default_indent_languages() -> Vec<String> {
    vec!["ruby".to_string()]
}

fn default_trigger_characters() -> String {
    "cdefhilnrsuw}]".to_string()
}

fn default_block_start_pattern() -> String {
    DEFAULT_BLOCK_START_PATTERN.to_string()
}

fn default_block_end_pattern() -> String {
    DEFAULT_BLOCK_END_PATTERN.to_string()
}

fn default_continuation_pattern() -> String {
    DEFAULT_CONTINUATION_PATTERN.to_string()
}

fn default_block_opener_tail_pattern() -> String {
    DEFAULT_BLOCK_OPENER_TAIL_PATTERN.to_string()
}

fn default_trailing_comma_pattern() -> String {
    DEFAULT_TRAILING_COMMA_PATTERN.to_string()
}

fn default_loose_opener_pattern() -> String {
    DEFAULT_LOOSE_OPENER_PATTERN.to_string()
}

fn default_verbatim_attributes() -> Vec<String> {
    vec![
        "Ruby:Here Document".to_string(),
        "Ruby:Blockcomment".to_string(),
    ]
}

fn default_tab_width() -> usize {
    8
}

fn default_indent_width() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            required_syntax_style: default_required_syntax_style(),
            indent_languages: default_indent_languages(),
            trigger_characters: default_trigger_characters(),
            block_start_pattern: default_block_start_pattern(),
            block_end_pattern: default_block_end_pattern(),
            continuation_pattern: default_continuation_pattern(),
            block_opener_tail_pattern: default_block_opener_tail_pattern(),
            trailing_comma_pattern: default_trailing_comma_pattern(),
            loose_opener_pattern: default_loose_opener_pattern(),
            verbatim_attributes: default_verbatim_attributes(),
            settings: IndentSettings::default(),
        }
    }
}

impl IndentConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: IndentConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.tab_width == 0 {
            return Err(ConfigError::ValidationError(
                "tab_width must be greater than 0".to_string(),
            ));
        }

        if self.settings.indent_width == 0 {
            return Err(ConfigError::ValidationError(
                "indent_width must be greater than 0".to_string(),
            ));
        }

        if self.trigger_characters.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(
                "trigger_characters must not contain whitespace".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid pattern in `{field}`: {message}")]
    InvalidPattern { field: &'static str, message: String },
    #[error("`block_end_pattern` must define a capture group named `trailing`")]
    MissingTrailingGroup,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Compiled, immutable form of an [`IndentConfig`]
#[derive(Debug, Clone)]
pub struct IndentRules {
    pub(crate) trigger_characters: Vec<char>,
    pub(crate) block_start: Regex,
    pub(crate) block_end: Regex,
    pub(crate) continuation: Regex,
    pub(crate) block_opener_tail: Regex,
    pub(crate) trailing_comma: Regex,
    pub(crate) loose_opener: Regex,
    pub(crate) verbatim_attributes: Vec<String>,
    required_syntax_style: String,
}

fn compile_pattern(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field,
        message: e.to_string(),
    })
}

impl IndentRules {
    pub fn compile(config: &IndentConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let block_end = compile_pattern("block_end_pattern", &config.block_end_pattern)?;
        if !block_end
            .capture_names()
            .flatten()
            .any(|name| name == TRAILING_GROUP)
        {
            return Err(ConfigError::MissingTrailingGroup);
        }

        Ok(Self {
            trigger_characters: config.trigger_characters.chars().collect(),
            block_start: compile_pattern("block_start_pattern", &config.block_start_pattern)?,
            block_end,
            continuation: compile_pattern("continuation_pattern", &config.continuation_pattern)?,
            block_opener_tail: compile_pattern(
                "block_opener_tail_pattern",
                &config.block_opener_tail_pattern,
            )?,
            trailing_comma: compile_pattern(
                "trailing_comma_pattern",
                &config.trailing_comma_pattern,
            )?,
            loose_opener: compile_pattern("loose_opener_pattern", &config.loose_opener_pattern)?,
            verbatim_attributes: config.verbatim_attributes.clone(),
            required_syntax_style: config.required_syntax_style.clone(),
        })
    }

    /// Whether typing `ch` should re-run the indenter (newline always does)
    pub fn is_trigger(&self, ch: char) -> bool {
        ch == '\n' || self.trigger_characters.contains(&ch)
    }

    pub fn required_syntax_style(&self) -> &str {
        &self.required_syntax_style
    }

    /// Match `text` against the block-end pattern
    ///
    /// Returns `None` when it is not a block closer, otherwise whether the
    /// closer is exact (nothing trails the keyword or bracket).
    pub fn block_end_match(&self, text: &str) -> Option<bool> {
        let captures = self.block_end.captures(text)?;
        Some(
            captures
                .name(TRAILING_GROUP)
                .map_or(true, |trailing| trailing.as_str().is_empty()),
        )
    }
}

impl Default for IndentRules {
    fn default() -> Self {
        Self::compile(&IndentConfig::default()).expect("built-in Ruby indent rules must compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let rules = IndentRules::default();
        assert!(rules.is_trigger('\n'));
        assert!(rules.is_trigger('d'));
        assert!(rules.is_trigger('}'));
        assert!(!rules.is_trigger('x'));
        assert_eq!(rules.required_syntax_style(), "ruby");
    }

    #[test]
    fn test_block_end_match_reports_exactness() {
        let rules = IndentRules::default();
        assert_eq!(rules.block_end_match("  end"), Some(true));
        assert_eq!(rules.block_end_match("}"), Some(true));
        assert_eq!(rules.block_end_match("end of story"), Some(false));
        assert_eq!(rules.block_end_match("endpoint"), None);
        assert_eq!(rules.block_end_match("x = 1"), None);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = IndentConfig::from_json_str(
            r#"{ "trigger_characters": "d}", "settings": { "indent_width": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.trigger_characters, "d}");
        assert_eq!(config.settings.indent_width, 4);
        assert_eq!(config.settings.tab_width, 8);
        assert_eq!(config.block_start_pattern, DEFAULT_BLOCK_START_PATTERN);
    }

    #[test]
    fn test_invalid_pattern_names_field() {
        let config = IndentConfig {
            continuation_pattern: "(".to_string(),
            ..IndentConfig::default()
        };
        match IndentRules::compile(&config) {
            Err(ConfigError::InvalidPattern { field, .. }) => {
                assert_eq!(field, "continuation_pattern")
            }
            other => panic!("expected invalid pattern error, got {other:?}"),
        }
    }

    #[test]
    fn test_block_end_requires_trailing_group() {
        let config = IndentConfig {
            block_end_pattern: r"^\s*end\b(.*)$".to_string(),
            ..IndentConfig::default()
        };
        assert!(matches!(
            IndentRules::compile(&config),
            Err(ConfigError::MissingTrailingGroup)
        ));
    }

    #[test]
    fn test_validation_rejects_zero_widths() {
        let result = IndentConfig::from_json_str(r#"{ "settings": { "tab_width": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ruby-indent.json");
        std::fs::write(&path, r#"{ "name": "Custom Ruby" }"#).unwrap();

        let config = IndentConfig::load_from_file(&path).unwrap();
        assert_eq!(config.name, "Custom Ruby");

        let missing = IndentConfig::load_from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
