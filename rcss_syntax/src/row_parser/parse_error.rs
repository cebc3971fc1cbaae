use super::syntax_kind::SyntaxKind::{self, *};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(id: &'static str, message: &'static str) -> Self {
        Rule { id, message }
    }
}

/// The kinds of problems a syntax tree can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseError {
    SemiColonExpected,
    ColonExpected,
    CommaExpected,
    IdentifierExpected,
    PropertyNameExpected,
    NumberExpected,
    LeftCurlyExpected,
    RightCurlyExpected,
    LeftSquareBracketExpected,
    RightSquareBracketExpected,
    LeftParenthesisExpected,
    RightParenthesisExpected,
    TokenExpected(SyntaxKind),
    UnexpectedInput,
    UnknownCharacter,
    UnterminatedString,
    UnterminatedComment,
    MalformedUrl,
}

impl ParseError {
    /// The error for a Missing token of `kind`.
    pub fn expected(kind: SyntaxKind) -> ParseError {
        use ParseError::*;
        match kind {
            SEMICOLON => SemiColonExpected,
            COLON => ColonExpected,
            COMMA => CommaExpected,
            IDENT => IdentifierExpected,
            PROPERTY_NAME => PropertyNameExpected,
            NUMBER => NumberExpected,
            L_CURLY => LeftCurlyExpected,
            R_CURLY => RightCurlyExpected,
            L_BRACK => LeftSquareBracketExpected,
            R_BRACK => RightSquareBracketExpected,
            L_PAREN => LeftParenthesisExpected,
            R_PAREN => RightParenthesisExpected,
            kind => TokenExpected(kind),
        }
    }

    /// The lexical error carried by a token, if any.
    pub fn from_token(kind: SyntaxKind, text: &str) -> Option<ParseError> {
        match kind {
            BAD_CHAR => Some(ParseError::UnknownCharacter),
            BAD_STRING => Some(ParseError::UnterminatedString),
            BAD_URL => Some(ParseError::MalformedUrl),
            COMMENT if text.starts_with("/*") && (text.len() < 4 || !text.ends_with("*/")) => {
                Some(ParseError::UnterminatedComment)
            }
            _ => None,
        }
    }

    pub fn issue(&self) -> Rule {
        use ParseError::*;
        match self {
            SemiColonExpected => Rule::new("rcss-semicolonexpected", "semi-colon expected"),
            ColonExpected => Rule::new("rcss-colonexpected", "colon expected"),
            CommaExpected => Rule::new("rcss-commaexpected", "comma expected"),
            IdentifierExpected => Rule::new("rcss-identifierexpected", "identifier expected"),
            PropertyNameExpected => {
                Rule::new("rcss-propertynameexpected", "property name expected")
            }
            NumberExpected => Rule::new("rcss-numberexpected", "number expected"),
            LeftCurlyExpected => Rule::new("rcss-lcurlyexpected", "{ expected"),
            RightCurlyExpected => Rule::new("rcss-rcurlyexpected", "} expected"),
            LeftSquareBracketExpected => Rule::new("rcss-lbracketexpected", "[ expected"),
            RightSquareBracketExpected => Rule::new("rcss-rbracketexpected", "] expected"),
            LeftParenthesisExpected => Rule::new("rcss-lparentexpected", "( expected"),
            RightParenthesisExpected => Rule::new("rcss-rparentexpected", ") expected"),
            TokenExpected(_) => Rule::new("rcss-tokenexpected", "token expected"),
            UnexpectedInput => Rule::new("rcss-unexpectedinput", "unexpected input"),
            UnknownCharacter => Rule::new("rcss-unknowncharacter", "unknown character"),
            UnterminatedString => Rule::new("rcss-unterminatedstring", "unterminated string"),
            UnterminatedComment => Rule::new("rcss-unterminatedcomment", "unterminated comment"),
            MalformedUrl => Rule::new("rcss-malformedurl", "malformed url"),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::TokenExpected(kind) => write!(f, "{kind:?} expected"),
            err => f.write_str(err.issue().message),
        }
    }
}
