//! Lexing `&str` into a flat buffer of tokens, the input of the parser.

use std::ops;

use super::parse_error::ParseError;
use super::syntax_kind::SyntaxKind;
use crate::tokenizer::tokenize;

pub struct LexedStr<'a> {
    text: &'a str,
    kind: Vec<SyntaxKind>,
    start: Vec<u32>,
}

impl<'a> LexedStr<'a> {
    pub fn new(text: &'a str) -> LexedStr<'a> {
        let _p = tracing::span!(tracing::Level::TRACE, "lex", len = text.len()).entered();
        let mut conv = Converter::new(text);
        for token in tokenize(text) {
            conv.push(token.kind, token.len as usize);
        }
        conv.finalize_with_eof()
    }

    pub fn as_str(&self) -> &str {
        self.text
    }

    /// Number of tokens, `EOF` excluded.
    pub fn len(&self) -> usize {
        self.kind.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of token `i`; `i == len()` is the `EOF` token.
    pub fn kind(&self, i: usize) -> SyntaxKind {
        assert!(i <= self.len());
        self.kind[i]
    }

    pub fn kinds(&self) -> &[SyntaxKind] {
        &self.kind[..self.len()]
    }

    pub fn text(&self, i: usize) -> &'a str {
        self.range_text(i..i + 1)
    }

    pub fn range_text(&self, r: ops::Range<usize>) -> &'a str {
        assert!(r.start < r.end && r.end <= self.len());
        let lo = self.start[r.start] as usize;
        let hi = self.start[r.end] as usize;
        &self.text[lo..hi]
    }

    pub fn text_range(&self, i: usize) -> ops::Range<usize> {
        assert!(i < self.len());
        let lo = self.start[i] as usize;
        let hi = self.start[i + 1] as usize;
        lo..hi
    }

    pub fn text_start(&self, i: usize) -> usize {
        assert!(i <= self.len());
        self.start[i] as usize
    }

    /// Lexical errors, as token index and message.
    pub fn errors(&self) -> impl Iterator<Item = (usize, ParseError)> + '_ {
        (0..self.len())
            .filter_map(|i| ParseError::from_token(self.kind(i), self.text(i)).map(|e| (i, e)))
    }
}

struct Converter<'a> {
    res: LexedStr<'a>,
    offset: usize,
}

impl<'a> Converter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            res: LexedStr { text, kind: Vec::new(), start: Vec::new() },
            offset: 0,
        }
    }

    fn finalize_with_eof(mut self) -> LexedStr<'a> {
        self.res.kind.push(SyntaxKind::EOF);
        self.res.start.push(self.offset as u32);
        self.res
    }

    fn push(&mut self, kind: SyntaxKind, len: usize) {
        self.res.kind.push(kind);
        self.res.start.push(self.offset as u32);
        self.offset += len;
    }
}

#[cfg(test)]
mod tests {
    use super::LexedStr;
    use crate::row_parser::syntax_kind::SyntaxKind::*;

    #[test]
    fn lexed_str_indexes_tokens() {
        let lexed = LexedStr::new("a{b:c}");
        assert_eq!(lexed.len(), 6);
        assert_eq!(lexed.kind(2), PROPERTY_NAME);
        assert_eq!(lexed.text(4), "c");
        assert_eq!(lexed.text_range(5), 5..6);
        assert_eq!(lexed.kind(6), EOF);
        assert_eq!(lexed.text_start(6), 6);
        assert_eq!(lexed.errors().count(), 0);
    }

    #[test]
    fn lex_errors_are_reported() {
        let lexed = LexedStr::new("a{b:\"x\n}");
        let errors: Vec<_> = lexed.errors().map(|(i, _)| i).collect();
        assert_eq!(errors, vec![4]);
    }
}
