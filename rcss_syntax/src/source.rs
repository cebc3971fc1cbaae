use std::ops::Range;

use crate::config::ParserConfig;
use crate::row_parser::{
    nodes_types::SyntaxNode,
    parse_with,
    reparsing::{reparse, Edit, EditError, ReparseOutcome},
    Tree,
};

/// An editable RCSS document: its text, syntax tree and line index.
pub struct Source {
    text: String,
    tree: Tree,
    config: ParserConfig,
    lines: Vec<Line>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Source {{
            len: {},
            lines: {},
            tree: ...,
        }}",
            self.text.len(),
            self.lines.len()
        )
    }
}

impl Source {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, ParserConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: ParserConfig) -> Self {
        let text = text.into();
        Self { lines: Line::lines(&text), tree: parse_with(&text, &config), text, config }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode {
        self.tree.root()
    }

    /// Slice out the part of the source code enclosed by the range.
    pub fn get(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }

    /// Return the index of the UTF-16 code unit at the byte index.
    pub fn byte_to_utf16(&self, byte_idx: usize) -> Option<usize> {
        let line_idx = self.byte_to_line(byte_idx)?;
        let line = self.lines.get(line_idx)?;
        let head = self.get(line.utf8_offset..byte_idx)?;
        Some(line.utf16_offset + len_utf16(head))
    }

    /// Return the index of the line that contains the given byte index.
    pub fn byte_to_line(&self, byte_idx: usize) -> Option<usize> {
        (byte_idx <= self.text.len()).then(|| {
            match self.lines.binary_search_by_key(&byte_idx, |line| line.utf8_offset) {
                Ok(i) => i,
                Err(i) => i - 1,
            }
        })
    }

    /// Return the index of the column at the byte index.
    ///
    /// The column is defined as the number of characters in the line before the
    /// byte index.
    pub fn byte_to_column(&self, byte_idx: usize) -> Option<usize> {
        let line = self.byte_to_line(byte_idx)?;
        let start = self.line_to_byte(line)?;
        let head = self.get(start..byte_idx)?;
        Some(head.chars().count())
    }

    /// Return the byte index at the UTF-16 code unit.
    pub fn utf16_to_byte(&self, utf16_idx: usize) -> Option<usize> {
        let line = self.lines.get(
            match self.lines.binary_search_by_key(&utf16_idx, |line| line.utf16_offset) {
                Ok(i) => i,
                Err(i) => i - 1,
            },
        )?;

        let mut k = line.utf16_offset;
        for (i, c) in self.text[line.utf8_offset..].char_indices() {
            if k >= utf16_idx {
                return Some(line.utf8_offset + i);
            }
            k += c.len_utf16();
        }

        (k == utf16_idx).then_some(self.text.len())
    }

    /// Return the byte position at which the given line starts.
    pub fn line_to_byte(&self, line_idx: usize) -> Option<usize> {
        self.lines.get(line_idx).map(|line| line.utf8_offset)
    }

    /// Return the range which encloses the given line.
    pub fn line_to_range(&self, line_idx: usize) -> Option<Range<usize>> {
        let start = self.line_to_byte(line_idx)?;
        let end = self.line_to_byte(line_idx + 1).unwrap_or(self.text.len());
        Some(start..end)
    }

    /// Return the byte index of the given (line, column) pair.
    ///
    /// The column defines the number of characters to go beyond the start of
    /// the line.
    pub fn line_column_to_byte(&self, line_idx: usize, column_idx: usize) -> Option<usize> {
        let range = self.line_to_range(line_idx)?;
        let line = self.get(range.clone())?;
        let mut chars = line.chars();
        for _ in 0..column_idx {
            chars.next()?;
        }
        Some(range.start + (line.len() - chars.as_str().len()))
    }

    /// Fully replace the source text.
    ///
    /// This performs a naive (suffix/prefix-based) diff of the old and new text
    /// to produce the smallest single edit that transforms old into new and
    /// then calls [`edit`](Self::edit) with it.
    ///
    /// Returns the range in the new source that was ultimately reparsed.
    pub fn replace(&mut self, new: &str) -> Range<usize> {
        let old = self.text.as_str();

        let mut prefix =
            old.as_bytes().iter().zip(new.as_bytes()).take_while(|(x, y)| x == y).count();

        if prefix == old.len() && prefix == new.len() {
            return 0..0;
        }

        while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
            prefix -= 1;
        }

        let mut suffix = old[prefix..]
            .as_bytes()
            .iter()
            .rev()
            .zip(new[prefix..].as_bytes().iter().rev())
            .take_while(|(x, y)| x == y)
            .count();

        while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix)
        {
            suffix -= 1;
        }

        let replace = prefix..old.len() - suffix;
        let with = new[prefix..new.len() - suffix].to_owned();
        match self.edit(replace, &with) {
            Ok(_) => prefix..prefix + with.len(),
            Err(err) => unreachable!("diff produced an invalid edit: {err}"),
        }
    }

    /// Replaces the bytes in `replace` with `with` and reparses.
    pub fn edit(&mut self, replace: Range<usize>, with: &str) -> Result<ReparseOutcome, EditError> {
        let start_byte = replace.start;
        let edit = Edit::new(start_byte, replace.end, start_byte + with.len());
        if replace.end < replace.start {
            return Err(EditError::Reversed { start: replace.start, end: replace.end });
        }
        if replace.end > self.text.len() {
            return Err(EditError::OutOfBounds { end: replace.end, len: self.text.len() });
        }
        for offset in [replace.start, replace.end] {
            if !self.text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }

        let line = self.byte_to_line(start_byte).unwrap_or_default();

        // Update the text itself.
        self.text.replace_range(replace, with);

        // Remove invalidated line starts.
        self.lines.truncate(line + 1);

        // Handle adjoining of \r and \n.
        if self.text[..start_byte].ends_with('\r') && with.starts_with('\n') {
            self.lines.pop();
        }

        // Recalculate the line starts after the edit.
        let line_start = self.lines.last().copied().unwrap_or(Line::START);
        self.lines.extend(Line::lines_from(
            line_start.utf8_offset,
            line_start.utf16_offset,
            &self.text[line_start.utf8_offset..],
        ));

        let (tree, outcome) = reparse(&self.tree, &edit, &self.text, &self.config);
        self.tree = tree;
        Ok(outcome)
    }
}

/// Metadata about a line.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Line {
    /// The UTF-8 codepoint byte offset where the line starts.
    utf8_offset: usize,
    /// The UTF-16 codepoint byte offset where the line starts.
    utf16_offset: usize,
}

impl Line {
    const START: Line = Line { utf8_offset: 0, utf16_offset: 0 };

    /// Create a line vector.
    fn lines(text: &str) -> Vec<Line> {
        std::iter::once(Line::START).chain(Line::lines_from(0, 0, text)).collect()
    }

    /// Compute a line iterator from an offset.
    fn lines_from(
        byte_offset: usize,
        utf16_offset: usize,
        text: &str,
    ) -> impl Iterator<Item = Line> + '_ {
        let mut s = text.char_indices().peekable();
        let mut utf16_offset = utf16_offset;

        std::iter::from_fn(move || {
            while let Some((i, c)) = s.next() {
                utf16_offset += c.len_utf16();
                if is_newline(c) {
                    if c == '\r' && matches!(s.peek(), Some((_, '\n'))) {
                        s.next();
                        utf16_offset += '\n'.len_utf16();
                        return Some(Line {
                            utf8_offset: byte_offset + i + "\r\n".len(),
                            utf16_offset,
                        });
                    }
                    return Some(Line { utf8_offset: byte_offset + i + c.len_utf8(), utf16_offset });
                }
            }
            None
        })
    }
}

/// The number of code units this string would use if it was encoded in
/// UTF16. This runs in linear time.
fn len_utf16(string: &str) -> usize {
    string.chars().map(char::len_utf16).sum()
}

pub fn is_newline(c: char) -> bool {
    c == '\n'         // line feed
        || c == '\x0B'       // vertical tab
        || c == '\x0C'       // form feed
        || c == '\r'         // carriage return
        || c == '\u{0085}'   // next line
        || c == '\u{2028}'   // line separator
        || c == '\u{2029}' // paragraph separator
}

#[cfg(test)]
mod tests {
    use super::Source;
    use crate::row_parser::{parse, reparsing::{EditError, ReparseOutcome}};

    const TEST: &str = "ä\tcde\nf💛g\r\nhi\rjkl";

    #[test]
    fn test_source_file_new() {
        let source = Source::new(TEST);
        assert_eq!(
            source.lines.iter().map(|l| l.utf8_offset).collect::<Vec<_>>(),
            [0, 7, 15, 18]
        );
        assert_eq!(
            source.lines.iter().map(|l| l.utf16_offset).collect::<Vec<_>>(),
            [0, 6, 12, 15]
        );
    }

    #[test]
    fn test_source_file_pos_to_line() {
        let source = Source::new(TEST);
        assert_eq!(source.byte_to_line(0), Some(0));
        assert_eq!(source.byte_to_line(2), Some(0));
        assert_eq!(source.byte_to_line(6), Some(0));
        assert_eq!(source.byte_to_line(7), Some(1));
        assert_eq!(source.byte_to_line(8), Some(1));
        assert_eq!(source.byte_to_line(12), Some(1));
        assert_eq!(source.byte_to_line(21), Some(3));
        assert_eq!(source.byte_to_line(22), None);
    }

    #[test]
    fn test_source_file_pos_to_column() {
        let source = Source::new(TEST);
        assert_eq!(source.byte_to_column(0), Some(0));
        assert_eq!(source.byte_to_column(2), Some(1));
        assert_eq!(source.byte_to_column(6), Some(5));
        assert_eq!(source.byte_to_column(7), Some(0));
        assert_eq!(source.byte_to_column(8), Some(1));
        assert_eq!(source.byte_to_column(12), Some(2));
    }

    #[test]
    fn test_source_file_utf16() {
        #[track_caller]
        fn roundtrip(source: &Source, byte_idx: usize, utf16_idx: usize) {
            let middle = source.byte_to_utf16(byte_idx).unwrap();
            let result = source.utf16_to_byte(middle).unwrap();
            assert_eq!(middle, utf16_idx);
            assert_eq!(result, byte_idx);
        }

        let source = Source::new(TEST);
        roundtrip(&source, 0, 0);
        roundtrip(&source, 2, 1);
        roundtrip(&source, 3, 2);
        roundtrip(&source, 8, 7);
        roundtrip(&source, 12, 9);
        roundtrip(&source, 21, 18);
        assert_eq!(source.byte_to_utf16(22), None);
        assert_eq!(source.utf16_to_byte(19), None);
    }

    #[test]
    fn test_source_file_line_column() {
        let source = Source::new(TEST);
        assert_eq!(source.line_column_to_byte(0, 0), Some(0));
        assert_eq!(source.line_column_to_byte(0, 2), Some(3));
        assert_eq!(source.line_column_to_byte(1, 2), Some(12));
        assert_eq!(source.line_column_to_byte(3, 3), Some(21));
        assert_eq!(source.line_column_to_byte(3, 4), None);
    }

    #[test]
    fn test_source_file_edit() {
        #[track_caller]
        fn test(prev: &str, range: std::ops::Range<usize>, with: &str, after: &str) {
            let mut source = Source::new(prev);
            let result = Source::new(after);
            source.edit(range, with).unwrap();
            assert_eq!(source.text(), result.text());
            assert_eq!(source.lines, result.lines);
            assert_eq!(*source.tree(), parse(after));
        }

        // Test inserting at the beginning.
        test("abc\n", 0..0, "hi\n", "hi\nabc\n");
        test("\nabc", 0..0, "hi\r", "hi\r\nabc");

        // Test editing in the middle.
        test(TEST, 4..16, "❌", "ä\tc❌i\rjkl");

        // Test appending.
        test("abc\ndef", 7..7, "hi", "abc\ndefhi");
        test("abc\ndef\n", 8..8, "\n", "abc\ndef\n\n");

        // Test appending with adjoining \r and \n.
        test("abc\ndef\r", 8..8, "\nghi", "abc\ndef\r\nghi");

        // Test removing everything.
        test(TEST, 0..21, "", "");

        // Test editing a stylesheet.
        test(".a { color: red; }\n", 12..15, "blue", ".a { color: blue; }\n");
        test("a {\n  b: c;\n}\n", 11..11, "\n  d: e;", "a {\n  b: c;\n  d: e;\n}\n");
    }

    #[test]
    fn edit_reports_the_reparse_strategy() {
        let mut source = Source::new(".a { color: red; }\n.b { margin: 0; }\n");
        assert_eq!(source.edit(12..15, "blue"), Ok(ReparseOutcome::Token));
        assert_eq!(source.edit(18..18, " x: y;"), Ok(ReparseOutcome::Block));
        assert_eq!(source.edit(0..0, "% dark\n"), Ok(ReparseOutcome::Full));
        assert_eq!(*source.tree(), parse(source.text()));

        assert_eq!(source.edit(5..100, ""), Err(EditError::OutOfBounds { end: 100, len: 51 }));
        assert_eq!(source.edit(6..5, ""), Err(EditError::Reversed { start: 6, end: 5 }));
    }

    #[test]
    fn replace_diffs_the_texts() {
        let mut source = Source::new("a { b: c; }");
        assert_eq!(source.replace("a { b: c; }"), 0..0);
        assert_eq!(source.replace("a { b: cd; }"), 8..9);
        assert_eq!(source.text(), "a { b: cd; }");
        assert_eq!(*source.tree(), parse("a { b: cd; }"));
    }
}
