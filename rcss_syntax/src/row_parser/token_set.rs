//! A bit-set of `SyntaxKind`s.

use super::syntax_kind::SyntaxKind;

/// A bit-set of token kinds, used for lookahead sets during table construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub(crate) struct TokenSet(u128);

impl TokenSet {
    pub(crate) const EMPTY: TokenSet = TokenSet(0);

    pub(crate) const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut res = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            res |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(res)
    }

    pub(crate) const fn single(kind: SyntaxKind) -> TokenSet {
        TokenSet(mask(kind))
    }

    pub(crate) const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    /// Adds `other` to `self`, returning whether `self` grew.
    pub(crate) fn extend(&mut self, other: TokenSet) -> bool {
        let before = self.0;
        self.0 |= other.0;
        self.0 != before
    }

    pub(crate) const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = SyntaxKind> {
        let bits = self.0;
        (0..128u16)
            .filter(move |i| bits & (1u128 << i) != 0)
            .filter_map(SyntaxKind::from_raw)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

const fn mask(kind: SyntaxKind) -> u128 {
    1u128 << (kind as usize)
}

#[test]
fn token_set_works_for_tokens() {
    use crate::row_parser::syntax_kind::SyntaxKind::*;
    let ts = TokenSet::new(&[EOF, WHITESPACE]);
    assert!(ts.contains(EOF));
    assert!(ts.contains(WHITESPACE));
    assert!(!ts.contains(PLUS));
    assert_eq!(ts.iter().collect::<Vec<_>>(), vec![WHITESPACE, EOF]);

    let mut grown = TokenSet::single(PLUS);
    assert!(grown.extend(ts));
    assert!(!grown.extend(TokenSet::single(EOF)));
}
