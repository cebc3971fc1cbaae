//! Randomized checking that incremental reparsing agrees with parsing.
//!
//! A sample is an old text plus one edit. It is parsed, reparsed through the
//! edit, and the result must equal a fresh parse of the edited text, errors
//! included. Failing samples are kept in the `fuzz_reparse` binary's sample
//! file in the [`CheckReparse::from_data`] format and retested from there.

use std::str;

use ra_ap_text_edit::Indel;
use rowan::{TextRange, TextSize};

use super::{
    parse,
    reparsing::{reparse, Edit, ReparseOutcome},
};
use crate::config::ParserConfig;

/// Pieces RCSS is made of, glued together by the generators below.
const FRAGMENTS: &[&str] = &[
    ".a", "#b", "c", "&", ":hover", "::before", "[x=\"y\"]", ">", " ", "\n", "{", "}", ";",
    ":", ",", "(", ")", "color", "red", "10px", "50%", "$v", "@blue-500", "!important",
    "/* c */", "/*", "\"", "@media", "screen", "% base-16 dark\n", "border", "dark", "url(x)",
    "calc(1px + 2%)", "nth-child(2n+1)", "*", "~", "+", "@import \"x.rcss\";",
];

#[derive(Debug, Clone)]
pub struct CheckReparse {
    text: String,
    edit: Indel,
    edited_text: String,
}

impl CheckReparse {
    /// Reads `offset\ndelete_len\ninsert\ntext`; `insert` uses `\n` escapes.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        let data = str::from_utf8(data).ok()?;
        let mut lines = data.splitn(4, '\n');
        let offset: u32 = lines.next()?.trim().parse().ok()?;
        let delete_len: u32 = lines.next()?.trim().parse().ok()?;
        let insert = lines.next()?.replace("\\n", "\n");
        let text = lines.next()?.to_string();

        let delete = TextRange::at(TextSize::from(offset), TextSize::from(delete_len));
        if delete.end() > TextSize::of(text.as_str())
            || !text.is_char_boundary(offset as usize)
            || !text.is_char_boundary(usize::from(delete.end()))
        {
            return None;
        }
        let edit = Indel { insert, delete };
        let mut edited_text = text.clone();
        edit.apply(&mut edited_text);
        Some(CheckReparse { text, edit, edited_text })
    }

    /// A random edit of a random stylesheet.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let text = random_text(rng, 24);
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let start = boundaries[rng.usize(..boundaries.len())];
        let end = boundaries.iter().copied().filter(|&b| b >= start).nth(rng.usize(..3)).unwrap_or(start);
        let insert = random_text(rng, 3);

        let edit = Indel::replace(
            TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            insert,
        );
        let mut edited_text = text.clone();
        edit.apply(&mut edited_text);
        CheckReparse { text, edit, edited_text }
    }

    /// Renders the sample in the [`CheckReparse::from_data`] format.
    pub fn to_data(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            u32::from(self.edit.delete.start()),
            u32::from(self.edit.delete.len()),
            self.edit.insert.replace('\n', "\\n"),
            self.text
        )
    }

    /// Panics when the reparsed tree differs from a fresh parse.
    pub fn run(&self) -> ReparseOutcome {
        let before = parse(&self.text);
        let (reparsed, outcome) = reparse(
            &before,
            &Edit::from_indel(&self.edit),
            &self.edited_text,
            &ParserConfig::default(),
        );
        let fully = parse(&self.edited_text);
        assert_eq!(reparsed.root().to_string(), self.edited_text);
        assert_eq!(
            fully.debug_dump(),
            reparsed.debug_dump(),
            "{outcome:?} reparse differs for sample\n{}",
            self.to_data()
        );
        assert_eq!(fully.errors(), reparsed.errors());
        outcome
    }
}

fn random_text(rng: &mut fastrand::Rng, max_fragments: usize) -> String {
    (0..rng.usize(..=max_fragments)).map(|_| FRAGMENTS[rng.usize(..FRAGMENTS.len())]).collect()
}

/// Reruns a stored failing sample, logging the trees involved.
pub fn retest_fuzz_error(sample: &str) {
    let Some(check) = CheckReparse::from_data(sample.as_bytes()) else {
        tracing::warn!(sample, "malformed fuzz sample");
        return;
    };
    tracing::info!(before = %parse(&check.text).fancy_string(), "old tree");
    tracing::info!(after = %parse(&check.edited_text).fancy_string(), "new tree");
    let outcome = check.run();
    tracing::info!(?outcome, "sample passes");
}

/// Runs `iterations` random edits from `seed`, returning how many took each path.
pub fn fuzz_reparse(seed: u64, iterations: usize) -> [usize; 3] {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut counts = [0; 3];
    for _ in 0..iterations {
        let outcome = CheckReparse::random(&mut rng).run();
        counts[outcome as usize] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{fuzz_reparse, CheckReparse};
    use crate::row_parser::reparsing::ReparseOutcome;

    #[test]
    fn data_format() {
        let check = CheckReparse::from_data(b"4\n1\nx\\ny\na { b: c; }").unwrap();
        assert_eq!(check.edited_text, "a { x\ny: c; }");
        assert_eq!(CheckReparse::from_data(check.to_data().as_bytes()).unwrap().edited_text, check.edited_text);
        assert_eq!(check.run(), ReparseOutcome::Block);

        assert!(CheckReparse::from_data(b"40\n1\nx\na { b: c; }").is_none());
        assert!(CheckReparse::from_data(b"x\n1\nx\na").is_none());
    }

    #[test]
    fn recovery_samples() {
        for data in ["4\n0\n\"\n&f(x", "9\n0\n&\n,.a /**/ ", "8\n0\n d: e\na { b: c; }"] {
            let check = CheckReparse::from_data(data.as_bytes()).unwrap();
            check.run();
        }
    }

    #[test]
    fn random_edits_reparse_like_fresh_parses() {
        let counts = fuzz_reparse(0x5eed, 500);
        assert_eq!(counts.iter().sum::<usize>(), 500);
    }
}
