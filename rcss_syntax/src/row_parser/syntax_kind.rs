//! The set of all token and node kinds of an RCSS syntax tree.
//!
//! Token kinds come first and stay below 128 so that they fit into a
//! [`TokenSet`](super::token_set::TokenSet). `EOF` separates tokens from nodes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::FromRepr)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // trivia
    WHITESPACE = 0,
    COMMENT,

    // punctuation
    SEMICOLON,
    COLON,
    COMMA,
    L_PAREN,
    R_PAREN,
    L_BRACK,
    R_BRACK,
    L_CURLY,
    R_CURLY,
    DOT,
    STAR,
    AMP,
    PLUS,
    MINUS,
    SLASH,
    R_ANGLE,
    TILDE,
    BANG,
    EQ,
    PERCENT,
    INCLUDE_MATCH,
    DASH_MATCH,
    PREFIX_MATCH,
    SUFFIX_MATCH,
    SUBSTRING_MATCH,

    // names and literals
    IDENT,
    PROPERTY_NAME,
    FUNCTION,
    AT_KEYWORD,
    HASH,
    STRING,
    URL,
    NUMBER,
    DIMENSION,
    PERCENTAGE,
    /// `$name`
    VARIABLE,
    /// `@family-shade` inside a value
    THEME_TOKEN,

    /// Whitespace between two compound selectors.
    DESCENDANT,
    /// End of a `%` preset directive line.
    LINE_BREAK,

    // lexer errors
    BAD_CHAR,
    BAD_STRING,
    BAD_URL,

    EOF,

    // nodes
    STYLESHEET,
    RULE_SET,
    SELECTOR_LIST,
    SELECTOR,
    COMPOUND_SELECTOR,
    TYPE_SELECTOR,
    UNIVERSAL_SELECTOR,
    CLASS_SELECTOR,
    ID_SELECTOR,
    NESTING_SELECTOR,
    KEYFRAME_SELECTOR,
    PSEUDO_CLASS,
    PSEUDO_ELEMENT,
    ATTRIBUTE_SELECTOR,
    COMBINATOR,
    NTH_EXPR,
    BLOCK,
    DECLARATION,
    VALUE,
    FUNCTION_CALL,
    PAREN_GROUP,
    IMPORTANT,
    AT_RULE,
    PRELUDE,
    VARIABLE_DECL,
    MIXIN_DEF,
    PRESET_DIRECTIVE,
    MEDIA_SHORTHAND,
    ERROR,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        SyntaxKind::from_repr(raw).filter(|kind| *kind != __LAST)
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | COMMENT)
    }

    /// Any kind that the lexer can produce, `EOF` included.
    #[inline]
    pub fn is_token(self) -> bool {
        self <= EOF
    }

    #[inline]
    pub fn is_node(self) -> bool {
        self > EOF && self < __LAST
    }

    #[inline]
    pub fn is_lex_error(self) -> bool {
        matches!(self, BAD_CHAR | BAD_STRING | BAD_URL)
    }

    /// Fixed text of punctuation tokens.
    pub fn punct_text(self) -> Option<&'static str> {
        let text = match self {
            SEMICOLON => ";",
            COLON => ":",
            COMMA => ",",
            L_PAREN => "(",
            R_PAREN => ")",
            L_BRACK => "[",
            R_BRACK => "]",
            L_CURLY => "{",
            R_CURLY => "}",
            DOT => ".",
            STAR => "*",
            AMP => "&",
            PLUS => "+",
            MINUS => "-",
            SLASH => "/",
            R_ANGLE => ">",
            TILDE => "~",
            BANG => "!",
            EQ => "=",
            PERCENT => "%",
            INCLUDE_MATCH => "~=",
            DASH_MATCH => "|=",
            PREFIX_MATCH => "^=",
            SUFFIX_MATCH => "$=",
            SUBSTRING_MATCH => "*=",
            _ => return None,
        };
        Some(text)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[macro_export]
macro_rules! T {
    [;] => { $crate::row_parser::syntax_kind::SyntaxKind::SEMICOLON };
    [:] => { $crate::row_parser::syntax_kind::SyntaxKind::COLON };
    [,] => { $crate::row_parser::syntax_kind::SyntaxKind::COMMA };
    ['('] => { $crate::row_parser::syntax_kind::SyntaxKind::L_PAREN };
    [')'] => { $crate::row_parser::syntax_kind::SyntaxKind::R_PAREN };
    ['['] => { $crate::row_parser::syntax_kind::SyntaxKind::L_BRACK };
    [']'] => { $crate::row_parser::syntax_kind::SyntaxKind::R_BRACK };
    ['{'] => { $crate::row_parser::syntax_kind::SyntaxKind::L_CURLY };
    ['}'] => { $crate::row_parser::syntax_kind::SyntaxKind::R_CURLY };
    [.] => { $crate::row_parser::syntax_kind::SyntaxKind::DOT };
    [*] => { $crate::row_parser::syntax_kind::SyntaxKind::STAR };
    [&] => { $crate::row_parser::syntax_kind::SyntaxKind::AMP };
    [+] => { $crate::row_parser::syntax_kind::SyntaxKind::PLUS };
    [-] => { $crate::row_parser::syntax_kind::SyntaxKind::MINUS };
    [/] => { $crate::row_parser::syntax_kind::SyntaxKind::SLASH };
    [>] => { $crate::row_parser::syntax_kind::SyntaxKind::R_ANGLE };
    [~] => { $crate::row_parser::syntax_kind::SyntaxKind::TILDE };
    [!] => { $crate::row_parser::syntax_kind::SyntaxKind::BANG };
    [=] => { $crate::row_parser::syntax_kind::SyntaxKind::EQ };
    [%] => { $crate::row_parser::syntax_kind::SyntaxKind::PERCENT };
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind;

    #[test]
    fn tokens_fit_in_token_set() {
        assert!((SyntaxKind::EOF as u16) < 128);
    }

    #[test]
    fn raw_round_trip() {
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::BLOCK as u16), Some(SyntaxKind::BLOCK));
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::__LAST as u16), None);
        assert!(SyntaxKind::ERROR.is_node());
        assert!(!SyntaxKind::EOF.is_node());
    }
}
