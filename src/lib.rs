// Ruby indentation library - the engine, its document model and a text buffer

// Document model
pub mod document;
pub mod highlight;
pub mod text_document;

// Configuration (always available, needed for schema generation)
pub mod config;

// Analysis
pub mod anchor;
pub mod block;
pub mod continuation;
pub mod statement;

// Decisions and applying them
pub mod auto_indent;
pub mod indent;

pub use auto_indent::{tab_string, AutoIndenter};
pub use config::{ConfigError, IndentConfig, IndentRules, IndentSettings};
pub use document::{Document, Position};
pub use indent::{IndentDirective, IndentEngine, IndentError, Trigger};
pub use statement::Statement;
pub use text_document::TextDocument;
