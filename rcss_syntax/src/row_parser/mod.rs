//! Lexing, table-driven parsing and incremental reparsing of RCSS.

pub mod ast;
pub mod fuzz;
pub mod lex_to_syn;
pub mod nodes_types;
pub mod parse_error;
pub(crate) mod parser;
pub mod rcss_grammar;
pub mod reparsing;
pub mod syntax_error;
pub mod syntax_kind;
pub mod table;
pub(crate) mod token_set;


use itertools::Itertools;
use once_cell::sync::Lazy;
use rowan::{GreenNode, NodeOrToken, TextSize};
use triomphe::Arc;

use crate::config::ParserConfig;

use self::{
    ast::AstNode,
    lex_to_syn::LexedStr,
    nodes_types::SyntaxNode,
    parser::Parser,
    rcss_grammar::{EntryPoint, RCSS_GRAMMAR},
    reparsing::Edit,
    syntax_error::{collect_errors, SyntaxError},
    table::ParseTable,
};

static GRAMMAR: Lazy<ParseTable> = Lazy::new(|| {
    let entries = EntryPoint::ALL.map(EntryPoint::nonterminal);
    match ParseTable::build(RCSS_GRAMMAR, &entries) {
        Ok(table) => table,
        Err(err) => panic!("invalid RCSS grammar: {err}"),
    }
});

/// The compiled RCSS parse table, built on first use.
pub fn grammar() -> &'static ParseTable {
    &GRAMMAR
}

/// A parsed document: an immutable green tree and the errors found in it.
///
/// A tree is always produced, even for completely invalid input, and its text
/// is always exactly the parsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    green: GreenNode,
    errors: Option<Arc<[SyntaxError]>>,
}

impl Tree {
    pub(crate) fn new(green: GreenNode) -> Tree {
        let mut errors = Vec::new();
        collect_errors(NodeOrToken::Node(&*green), TextSize::from(0), &mut errors);
        Tree::with_errors(green, errors)
    }

    pub(crate) fn with_errors(green: GreenNode, errors: Vec<SyntaxError>) -> Tree {
        Tree { green, errors: if errors.is_empty() { None } else { Some(errors.into()) } }
    }

    pub(crate) fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn stylesheet(&self) -> ast::Stylesheet {
        match ast::Stylesheet::cast(self.root()) {
            Some(stylesheet) => stylesheet,
            None => panic!("tree root is not a stylesheet"),
        }
    }

    pub fn source_len(&self) -> usize {
        u32::from(self.green.text_len()) as usize
    }

    pub fn errors(&self) -> &[SyntaxError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn reparse(&self, edit: &Edit, new_text: &str) -> Tree {
        self.reparse_with(edit, new_text, &ParserConfig::default())
    }

    pub fn reparse_with(&self, edit: &Edit, new_text: &str, config: &ParserConfig) -> Tree {
        reparsing::reparse(self, edit, new_text, config).0
    }

    pub fn debug_dump(&self) -> String {
        let mut buf = format!("{:#?}", self.root());
        for err in self.errors() {
            buf += &format!("error {:?}: {}\n", err.range(), err);
        }
        buf
    }

    /// A compact outline of the node structure, one node per line.
    pub fn fancy_string(&self) -> String {
        let mut res = String::from("Tree");
        res += "\n    Errors: ";
        res += &self
            .errors()
            .iter()
            .map(|e| format!("{} at {:?}", e, e.range()))
            .join(";\n        ");
        res += &Self::fancy_string_internal(&self.root(), 0);
        res
    }

    fn fancy_string_internal(node: &SyntaxNode, indent: usize) -> String {
        let indent_s = "    ".repeat(indent);
        let range = node.text_range();
        format!("\n{indent_s}{:?}({:?}+{:?}={:?}) {{", node.kind(), range.start(), range.len(), range.end())
            + &node
                .children()
                .map(|child| Self::fancy_string_internal(&child, indent + 1))
                .join("")
            + "\n"
            + &indent_s
            + "}"
    }
}

pub fn parse(text: &str) -> Tree {
    parse_with(text, &ParserConfig::default())
}

pub fn parse_with(text: &str, config: &ParserConfig) -> Tree {
    let _p = tracing::span!(tracing::Level::INFO, "parse", len = text.len()).entered();
    let lexed = LexedStr::new(text);
    Tree::new(parse_lexed(&lexed, config))
}

pub fn reparse(old: &Tree, edit: &Edit, new_text: &str) -> Tree {
    old.reparse(edit, new_text)
}

pub(crate) fn parse_lexed(lexed: &LexedStr<'_>, config: &ParserConfig) -> GreenNode {
    let parser = Parser::new(lexed, grammar(), EntryPoint::Stylesheet, config.recovery_window);
    match parser.parse() {
        Some(green) => green,
        None => panic!("stylesheet parse did not complete"),
    }
}
