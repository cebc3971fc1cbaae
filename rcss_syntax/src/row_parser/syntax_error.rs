use std::fmt;

use rowan::{GreenNodeData, NodeOrToken, TextRange, TextSize};

use super::{
    nodes_types::{green_kind, GreenElementRef},
    parse_error::ParseError,
    syntax_kind::SyntaxKind,
};

/// An error found in a syntax tree, with the range it covers.
///
/// Syntax errors are not stored in the tree: they are read back from `ERROR`
/// nodes, Missing tokens and malformed tokens, so two structurally equal trees
/// always report equal errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxError(ParseError, TextRange);

impl SyntaxError {
    pub fn new(error: ParseError, range: TextRange) -> Self {
        Self(error, range)
    }

    pub fn new_at_offset(error: ParseError, offset: TextSize) -> Self {
        Self(error, TextRange::empty(offset))
    }

    pub fn error(&self) -> ParseError {
        self.0
    }

    pub fn range(&self) -> TextRange {
        self.1
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.1 = range;
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SyntaxError {}

/// Reads the errors of a green subtree placed at `offset`, in document order.
pub(crate) fn collect_errors(
    element: GreenElementRef<'_>,
    offset: TextSize,
    acc: &mut Vec<SyntaxError>,
) {
    let mut work = vec![(element, offset)];
    while let Some((element, offset)) = work.pop() {
        match element {
            NodeOrToken::Node(node) => {
                if green_kind(node.kind()) == SyntaxKind::ERROR && !only_lex_errors(node) {
                    let range = TextRange::at(offset, node.text_len());
                    acc.push(SyntaxError::new(ParseError::UnexpectedInput, range));
                }
                let mut offset = offset;
                let children: Vec<_> = node
                    .children()
                    .map(|child| {
                        let at = offset;
                        offset += child.text_len();
                        (child, at)
                    })
                    .collect();
                work.extend(children.into_iter().rev());
            }
            NodeOrToken::Token(token) => {
                let kind = green_kind(token.kind());
                let range = TextRange::at(offset, token.text_len());
                if token.text().is_empty() {
                    acc.push(SyntaxError::new(ParseError::expected(kind), range));
                } else if let Some(error) = ParseError::from_token(kind, token.text()) {
                    acc.push(SyntaxError::new(error, range));
                }
            }
        }
    }
}

/// An `ERROR` node made only of tokens that already report their own error.
fn only_lex_errors(node: &GreenNodeData) -> bool {
    let mut work = vec![node];
    while let Some(node) = work.pop() {
        for child in node.children() {
            match child {
                NodeOrToken::Node(node) => work.push(node),
                NodeOrToken::Token(token) => {
                    let kind = green_kind(token.kind());
                    if token.text().is_empty() || !(kind.is_trivia() || kind.is_lex_error()) {
                        return false;
                    }
                }
            }
        }
    }
    true
}
