#![allow(clippy::needless_return)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod logging;
pub mod row_parser;
pub mod source;
pub mod tokenizer;

pub use config::{IncrementalMode, ParserConfig};
pub use row_parser::{
    grammar,
    nodes_types::{NodeExt, SyntaxElement, SyntaxNode, SyntaxToken},
    parse, parse_with, reparse,
    reparsing::{Edit, EditError, ReparseOutcome},
    syntax_error::SyntaxError,
    syntax_kind::SyntaxKind,
    Tree,
};
pub use source::Source;
