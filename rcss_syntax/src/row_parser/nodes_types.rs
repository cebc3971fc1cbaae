//! The concrete syntax tree.
//!
//! The tree keeps every byte of the input, trivia included. Green nodes are
//! immutable and atomically reference counted, so subtrees are shared freely
//! between the trees produced by successive edits.
//!
//! The implementation is the language-agnostic `rowan` crate; this module
//! pins it to RCSS kinds.

use std::{ops::Range, ptr};

use rowan::{GreenNode, GreenToken, Language, NodeOrToken};

use super::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RcssLanguage {}
impl Language for RcssLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        SyntaxKind::from_raw(raw.0).unwrap_or_else(|| panic!("invalid syntax kind {}", raw.0))
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<RcssLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<RcssLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<RcssLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<RcssLanguage>;

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;
pub type GreenElementRef<'a> = NodeOrToken<&'a rowan::GreenNodeData, &'a rowan::GreenTokenData>;

pub(crate) fn green_kind(raw: rowan::SyntaxKind) -> SyntaxKind {
    RcssLanguage::kind_from_raw(raw)
}

/// Uniform queries over nodes and tokens.
pub trait NodeExt {
    fn symbol(&self) -> SyntaxKind;

    fn byte_range(&self) -> Range<usize>;

    /// An `ERROR` node, or a token the lexer could not make sense of.
    fn is_error(&self) -> bool;

    /// A zero-width token inserted by error recovery.
    fn is_missing(&self) -> bool;

    /// Whether both handles point at the same green element, which is how
    /// subtrees reused across reparses are recognized.
    fn shares_green(&self, other: &Self) -> bool;
}

impl NodeExt for SyntaxNode {
    fn symbol(&self) -> SyntaxKind {
        self.kind()
    }

    fn byte_range(&self) -> Range<usize> {
        self.text_range().into()
    }

    fn is_error(&self) -> bool {
        self.kind() == SyntaxKind::ERROR
    }

    fn is_missing(&self) -> bool {
        false
    }

    fn shares_green(&self, other: &Self) -> bool {
        ptr::eq(&*self.green(), &*other.green())
    }
}

impl NodeExt for SyntaxToken {
    fn symbol(&self) -> SyntaxKind {
        self.kind()
    }

    fn byte_range(&self) -> Range<usize> {
        self.text_range().into()
    }

    fn is_error(&self) -> bool {
        self.kind().is_lex_error()
    }

    fn is_missing(&self) -> bool {
        self.text().is_empty()
    }

    fn shares_green(&self, other: &Self) -> bool {
        ptr::eq(self.green(), other.green())
    }
}

impl NodeExt for SyntaxElement {
    fn symbol(&self) -> SyntaxKind {
        self.kind()
    }

    fn byte_range(&self) -> Range<usize> {
        self.text_range().into()
    }

    fn is_error(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.is_error(),
            NodeOrToken::Token(token) => token.is_error(),
        }
    }

    fn is_missing(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.is_missing(),
            NodeOrToken::Token(token) => token.is_missing(),
        }
    }

    fn shares_green(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeOrToken::Node(a), NodeOrToken::Node(b)) => a.shares_green(b),
            (NodeOrToken::Token(a), NodeOrToken::Token(b)) => a.shares_green(b),
            _ => false,
        }
    }
}
