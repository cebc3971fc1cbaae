//! Generated RCSS inputs for the benchmarks.

use std::fmt::Write;

/// A stylesheet of `rules` rule sets mixing plain CSS with RCSS extensions.
pub fn generate_stylesheet(rules: usize) -> String {
    let mut text = String::from("% base-16 dark\n@import \"theme.rcss\";\n$accent: @blue-500;\n\n");
    for i in 0..rules {
        let res = match i % 4 {
            0 => writeln!(
                text,
                ".card-{i}, .panel-{i} > .title {{\n  color: $accent;\n  margin: {}px auto;\n  border {{ width: 1px; color: @gray-300; }}\n}}",
                i % 17
            ),
            1 => writeln!(
                text,
                "$mixin-{i} {{\n  padding: 4px 8px;\n  font: 12px/1.5 \"Helvetica\", sans-serif;\n}}"
            ),
            2 => writeln!(
                text,
                "@media screen and (max-width: {}px) {{\n  .col-{i}:hover {{ width: calc(100% - 2px) !important; }}\n}}",
                320 + i
            ),
            _ => writeln!(
                text,
                "#item-{i} {{\n  apply: $mixin-{};\n  &.active {{ color: red; }}\n  screen(md) {{ width: 50%; }}\n  dark {{ color: white; }}\n}}",
                i.saturating_sub(2)
            ),
        };
        if res.is_err() {
            break;
        }
    }
    text
}

/// Byte offset of the `n`th occurrence of `needle` in `text`.
pub fn nth_offset(text: &str, needle: &str, n: usize) -> Option<usize> {
    text.match_indices(needle).nth(n).map(|(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::{generate_stylesheet, nth_offset};

    #[test]
    fn generated_stylesheet_parses_cleanly() {
        let text = generate_stylesheet(40);
        let tree = rcss_syntax::parse(&text);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        assert_eq!(tree.root().to_string(), text);
        assert!(nth_offset(&text, "color: red", 3).is_some());
    }
}
