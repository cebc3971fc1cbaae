/// An RCSS lexer based on [CSS Syntax Module Level 3](https://drafts.csswg.org/css-syntax/)
/// with some notable differences:
/// - tokens are produced directly as `SyntaxKind`s, delimiters are flattened into punctuation kinds
/// - comments are kept, `//` line comments are allowed
/// - lexing is context sensitive: a `ScannerState` is threaded through every call to
///     `next_token`, the same characters can lex differently in a selector, a property
///     name, a value, an at-rule prelude or a `%` preset directive
/// - RCSS tokens: `$variable`, `@theme-token` (in values), `%` directives
/// - a character that starts no token yields `BAD_CHAR`, lexing never fails

mod cursor;

pub use cursor::Cursor;
use cursor::EOF_CHAR;

use crate::row_parser::syntax_kind::SyntaxKind::{self, *};

/// Lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub len: u32,
}

impl Token {
    pub fn new(kind: SyntaxKind, len: u32) -> Self {
        Self { kind, len }
    }
}

/// What the scanner expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanMode {
    /// Start of an item, after `{`, `}` or `;`. Resolved into another mode at the
    /// first significant character.
    #[default]
    Item,
    Selector,
    Property,
    Value,
    AtPrelude,
    /// Inside a `%` preset line.
    Directive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScannerState {
    mode: ScanMode,
    /// In `Selector` mode: the last significant token ended a compound selector.
    after_compound: bool,
}

impl ScannerState {
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    fn advance(self, mode: ScanMode, kind: SyntaxKind) -> ScannerState {
        if matches!(kind, L_CURLY | R_CURLY | SEMICOLON) {
            return ScannerState::default();
        }
        if kind.is_trivia() {
            return ScannerState { mode, ..self };
        }
        let mode = match (mode, kind) {
            (ScanMode::Item, PERCENT) => ScanMode::Directive,
            (ScanMode::Item, AT_KEYWORD) => ScanMode::AtPrelude,
            (ScanMode::Item, VARIABLE) => ScanMode::Property,
            (ScanMode::Property, COLON) => ScanMode::Value,
            (ScanMode::Directive, LINE_BREAK) => ScanMode::Item,
            (mode, _) => mode,
        };
        ScannerState {
            mode,
            after_compound: mode == ScanMode::Selector && ends_compound(kind),
        }
    }
}

/// Lexes one token at the cursor, returning it with the state for the next call.
/// At the end of input an `EOF` token of length 0 is returned, every other token
/// is at least one byte long.
pub fn next_token(cursor: &mut Cursor<'_>, state: ScannerState) -> (Token, ScannerState) {
    if cursor.is_eof() {
        return (Token::new(EOF, 0), state);
    }
    let mode = match state.mode {
        ScanMode::Item => cursor.item_mode(),
        mode => mode,
    };
    let kind = cursor.lex(mode, state.after_compound);
    let token = Token::new(kind, cursor.pos_within_token());
    cursor.reset_pos_within_token();
    debug_assert!(token.len > 0, "empty {kind:?} token");
    (token, state.advance(mode, kind))
}

/// Tokenizes a whole document, starting at the beginning of an item.
pub fn tokenize(input: &str) -> impl Iterator<Item = Token> + '_ {
    let mut cursor = Cursor::new(input);
    let mut state = ScannerState::default();
    std::iter::from_fn(move || {
        let (token, next) = next_token(&mut cursor, state);
        state = next;
        (token.kind != EOF).then_some(token)
    })
}

fn ends_compound(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        IDENT | HASH | STAR | AMP | R_BRACK | R_PAREN | NUMBER | DIMENSION | PERCENTAGE
    )
}

impl Cursor<'_> {
    /// Decides how an item starting at the cursor is lexed.
    fn item_mode(&self) -> ScanMode {
        match self.first() {
            c if is_white_space(c) => ScanMode::Item,
            '/' if matches!(self.second(), '*' | '/') => ScanMode::Item,
            '{' | '}' | ';' | '%' | '@' | '$' => ScanMode::Item,
            '.' | '#' | '&' | '*' | '[' | ':' | '>' | '+' | '~' => ScanMode::Selector,
            _ => self.scan_item_kind(),
        }
    }

    /// Lexes ahead on a copy of the cursor: an item whose first `{`, `;` or `}`
    /// is a `{` is a rule, anything else is a declaration.
    fn scan_item_kind(&self) -> ScanMode {
        let mut ahead = self.clone();
        loop {
            let kind = ahead.lex(ScanMode::Value, false);
            ahead.reset_pos_within_token();
            match kind {
                L_CURLY => return ScanMode::Selector,
                SEMICOLON | R_CURLY => return ScanMode::Property,
                _ if ahead.is_eof() => return ScanMode::Property,
                _ => {}
            }
        }
    }

    fn lex(&mut self, mode: ScanMode, after_compound: bool) -> SyntaxKind {
        let first_char = self.first();
        match first_char {
            '/' => match self.second() {
                '*' => {
                    self.bump_two();
                    self.consume_block_comment()
                }
                '/' => {
                    self.bump_two();
                    self.bump_while_first(|ch| !is_newline(ch));
                    COMMENT
                }
                _ => {
                    self.bump();
                    SLASH
                }
            },
            c if is_white_space(c) => self.consume_whitespace(mode, after_compound),
            '"' | '\'' => {
                self.bump();
                self.consume_string(first_char)
            }
            '#' => {
                self.bump();
                if is_ident_mid_char(self.first()) || is_valid_escape(self.first(), self.second()) {
                    self.consume_ident_seq();
                    HASH
                } else {
                    BAD_CHAR
                }
            }
            '+' => {
                if matches!(mode, ScanMode::Value | ScanMode::AtPrelude) && self.is_number_seq_start() {
                    self.consume_numeric_token()
                } else {
                    self.bump();
                    PLUS
                }
            }
            '-' => {
                if self.is_number_seq_start() {
                    self.consume_numeric_token()
                } else if self.is_ident_seq_start() {
                    self.consume_ident_like(mode)
                } else {
                    self.bump();
                    MINUS
                }
            }
            '.' => {
                if mode != ScanMode::Selector && self.is_number_seq_start() {
                    self.consume_numeric_token()
                } else {
                    self.bump();
                    DOT
                }
            }
            '@' => {
                self.bump();
                if mode == ScanMode::Value {
                    if is_ident_mid_char(self.first()) {
                        self.consume_ident_seq();
                        THEME_TOKEN
                    } else {
                        BAD_CHAR
                    }
                } else if self.is_ident_seq_start() {
                    self.consume_ident_seq();
                    AT_KEYWORD
                } else {
                    BAD_CHAR
                }
            }
            '$' => {
                self.bump();
                if self.first() == '=' {
                    self.bump();
                    SUFFIX_MATCH
                } else if is_ident_mid_char(self.first()) {
                    self.consume_ident_seq();
                    VARIABLE
                } else {
                    BAD_CHAR
                }
            }
            '\\' => {
                if is_valid_escape_second_char(self.second()) {
                    self.consume_ident_like(mode)
                } else {
                    self.bump();
                    BAD_CHAR
                }
            }
            c if c.is_ascii_digit() => self.consume_numeric_token(),
            c if is_ident_start_char(c) => self.consume_ident_like(mode),
            '~' | '|' | '^' | '*' => {
                self.bump();
                if self.first() == '=' {
                    self.bump();
                    match first_char {
                        '~' => INCLUDE_MATCH,
                        '|' => DASH_MATCH,
                        '^' => PREFIX_MATCH,
                        _ => SUBSTRING_MATCH,
                    }
                } else {
                    match first_char {
                        '~' => TILDE,
                        '*' => STAR,
                        _ => BAD_CHAR,
                    }
                }
            }
            _ => {
                self.bump();
                match first_char {
                    ',' => COMMA,
                    ':' => COLON,
                    ';' => SEMICOLON,
                    '(' => L_PAREN,
                    ')' => R_PAREN,
                    '[' => L_BRACK,
                    ']' => R_BRACK,
                    '{' => L_CURLY,
                    '}' => R_CURLY,
                    '>' => R_ANGLE,
                    '!' => BANG,
                    '&' => AMP,
                    '=' => EQ,
                    '%' => PERCENT,
                    _ => BAD_CHAR,
                }
            }
        }
    }

    /// PRECONDITION: `/*` has just been consumed.
    /// An unterminated comment runs to the end of input.
    fn consume_block_comment(&mut self) -> SyntaxKind {
        loop {
            match self.bump() {
                Some('*') if self.first() == '/' => {
                    self.bump();
                    break;
                }
                Some(_) => {}
                None => break,
            }
        }
        COMMENT
    }

    /// https://drafts.csswg.org/css-syntax/#whitespace
    /// Consume as much whitespace as possible. Depending on the mode the run is
    /// significant: a line break ends a preset directive and a run between two
    /// compound selectors is a descendant combinator.
    fn consume_whitespace(&mut self, mode: ScanMode, after_compound: bool) -> SyntaxKind {
        let mut has_newline = false;
        self.bump_while_first(|ch| {
            has_newline |= is_newline(ch);
            is_white_space(ch)
        });
        match mode {
            ScanMode::Directive if has_newline => LINE_BREAK,
            ScanMode::Selector if after_compound && self.compound_follows() => DESCENDANT,
            _ => WHITESPACE,
        }
    }

    /// Whether a compound selector starts after any further trivia.
    fn compound_follows(&self) -> bool {
        let mut ahead = self.clone();
        loop {
            match (ahead.first(), ahead.second()) {
                (c, _) if is_white_space(c) => ahead.bump_while_first(is_white_space),
                ('/', '*') => {
                    ahead.bump_two();
                    ahead.consume_block_comment();
                }
                ('/', '/') => ahead.bump_while_first(|ch| !is_newline(ch)),
                (c, next) => {
                    return !ahead.is_eof() && starts_compound(c, next);
                }
            }
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-a-string-token
    /// Returns STRING or BAD_STRING. A newline is not consumed.
    fn consume_string(&mut self, delimiter: char) -> SyntaxKind {
        loop {
            match self.first() {
                c if c == delimiter => {
                    self.bump();
                    return STRING;
                }
                EOF_CHAR if self.is_eof() => return BAD_STRING,
                c if is_newline(c) => return BAD_STRING,
                '\\' => {
                    self.bump();
                    let first = self.first();
                    if self.is_eof() {
                        return BAD_STRING;
                    } else if is_newline(first) {
                        self.bump();
                    } else {
                        self.consume_escaped();
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-url-token
    /// Return URL or BAD_URL
    /// PRECONDITION: initial "url(" has just been consumed and the value is unquoted
    fn consume_url(&mut self) -> SyntaxKind {
        self.bump_while_first(is_white_space);
        loop {
            match self.first() {
                _ if self.is_eof() => return BAD_URL,
                ')' => {
                    self.bump();
                    return URL;
                }
                c if is_white_space(c) => {
                    self.bump_while_first(is_white_space);
                    return match self.first() {
                        _ if self.is_eof() => BAD_URL,
                        ')' => {
                            self.bump();
                            URL
                        }
                        _ => self.consume_bad_url_remnants(),
                    };
                }
                '"' | '\'' | '(' => return self.consume_bad_url_remnants(),
                c if non_printable_char(c) => return self.consume_bad_url_remnants(),
                '\\' => {
                    if is_valid_escape_second_char(self.second()) {
                        self.bump();
                        self.consume_escaped();
                    } else {
                        return self.consume_bad_url_remnants();
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-the-remnants-of-a-bad-url
    fn consume_bad_url_remnants(&mut self) -> SyntaxKind {
        while let Some(curr) = self.bump() {
            match curr {
                ')' => break,
                '\\' if is_valid_escape_second_char(self.first()) && !self.is_eof() => {
                    self.consume_escaped();
                }
                _ => {}
            }
        }
        BAD_URL
    }

    /// https://drafts.csswg.org/css-syntax/#consume-numeric-token
    fn consume_numeric_token(&mut self) -> SyntaxKind {
        self.consume_number();
        if self.is_ident_seq_start() {
            self.consume_ident_seq();
            DIMENSION
        } else if self.first() == '%' {
            self.bump();
            PERCENTAGE
        } else {
            NUMBER
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-a-number
    /// PRECONDITION: self.is_number_seq_start() returns true
    fn consume_number(&mut self) {
        debug_assert!(self.is_number_seq_start());
        if matches!(self.first(), '+' | '-') {
            self.bump();
        }
        self.bump_while_first(|ch| ch.is_ascii_digit());

        if self.first() == '.' && self.second().is_ascii_digit() {
            self.bump();
            self.bump_while_first(|ch| ch.is_ascii_digit());
        }

        if matches!(self.first(), 'e' | 'E') {
            let second = self.second();
            let exponent_digit = if matches!(second, '+' | '-') { self.third() } else { second };
            if exponent_digit.is_ascii_digit() {
                self.bump();
                if matches!(self.first(), '+' | '-') {
                    self.bump();
                }
                self.bump_while_first(|ch| ch.is_ascii_digit());
            }
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-name
    /// PRECONDITION: the next code point is an ident code point or a valid escape
    fn consume_ident_seq(&mut self) {
        loop {
            let curr = self.first();
            if is_ident_mid_char(curr) && !self.is_eof() {
                self.bump();
            } else if is_valid_escape(curr, self.second()) {
                self.bump();
                self.consume_escaped();
            } else {
                break;
            }
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-ident-like-token
    /// Returns IDENT (PROPERTY_NAME in a property position), FUNCTION, URL or BAD_URL
    fn consume_ident_like(&mut self, mode: ScanMode) -> SyntaxKind {
        let starts_with_url = matches!(self.first(), 'u' | 'U')
            && matches!(self.second(), 'r' | 'R')
            && matches!(self.third(), 'l' | 'L');
        let before = self.pos_within_token();
        self.consume_ident_seq();
        let is_url = starts_with_url && self.pos_within_token() - before == 3;
        if self.first() == '(' {
            self.bump();
            if !is_url {
                return FUNCTION;
            }
            while is_white_space(self.first()) && is_white_space(self.second()) {
                self.bump();
            }
            let first = self.first();
            let quoted = matches!(first, '\'' | '"')
                || (is_white_space(first) && matches!(self.second(), '\'' | '"'));
            if quoted {
                FUNCTION
            } else {
                self.consume_url()
            }
        } else if mode == ScanMode::Property {
            PROPERTY_NAME
        } else {
            IDENT
        }
    }

    /// https://drafts.csswg.org/css-syntax/#consume-an-escaped-code-point
    /// PRECONDITION: '\\' has just been consumed
    /// The value of the escape is not needed, only its extent.
    fn consume_escaped(&mut self) {
        match self.bump() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut digits = 1;
                self.bump_while_first(|ch| {
                    let more = ch.is_ascii_hexdigit() && digits < 6;
                    digits += more as usize;
                    more
                });
                if is_white_space(self.first()) && !self.is_eof() {
                    self.bump();
                }
            }
            _ => {}
        }
    }

    /// https://drafts.csswg.org/css-syntax/#starts-with-a-number
    fn is_number_seq_start(&self) -> bool {
        match self.first() {
            '+' | '-' => match self.second() {
                c if c.is_ascii_digit() => true,
                '.' => self.third().is_ascii_digit(),
                _ => false,
            },
            '.' => self.second().is_ascii_digit(),
            c => c.is_ascii_digit(),
        }
    }

    /// https://drafts.csswg.org/css-syntax/#would-start-an-identifier
    fn is_ident_seq_start(&self) -> bool {
        match self.first() {
            '-' => match self.second() {
                c if c == '-' || is_ident_start_char(c) => true,
                '\\' => is_valid_escape_second_char(self.third()),
                _ => false,
            },
            '\\' => is_valid_escape_second_char(self.second()),
            c => is_ident_start_char(c) && !self.is_eof(),
        }
    }
}

/// https://drafts.csswg.org/css-syntax/#ident-start-code-point
#[inline]
fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || !c.is_ascii() || c == '_'
}

/// https://drafts.csswg.org/css-syntax/#ident-code-point
#[inline]
fn is_ident_mid_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// https://drafts.csswg.org/css-syntax/#check-if-two-code-points-are-a-valid-escape
#[inline]
fn is_valid_escape(first_char: char, second_char: char) -> bool {
    first_char == '\\' && is_valid_escape_second_char(second_char)
}

#[inline]
fn is_valid_escape_second_char(ch: char) -> bool {
    !is_newline(ch) && ch != EOF_CHAR
}

#[inline]
fn is_newline(ch: char) -> bool {
    ch == '\n' || ch == '\r' || ch == '\x0C'
}

fn is_white_space(ch: char) -> bool {
    ch == ' ' || ch == '\t' || is_newline(ch)
}

fn starts_compound(c: char, next: char) -> bool {
    match c {
        '.' | '#' | '[' | ':' | '*' | '&' | '\\' => true,
        '-' => next == '-' || is_ident_start_char(next),
        c => is_ident_start_char(c) || c.is_ascii_digit(),
    }
}

/// https://drafts.csswg.org/css-syntax/#non-printable-code-point
fn non_printable_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}')
}
