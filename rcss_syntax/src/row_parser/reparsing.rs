//! Implementation of incremental re-parsing.
//!
//! We use two simple strategies for this:
//!   - if the edit modifies only a single token (like changing an identifier's
//!     letter) and relexing around it yields the same token kinds, we replace
//!     only this token.
//!   - otherwise, we search for the nearest `{}` block which contains the edit
//!     and try to parse only this block.
//!
//! If neither applies, the whole text is parsed again. In every case, subtrees
//! of the new tree that are identical to old ones outside the edit are
//! replaced by the old green nodes, so unchanged parts keep their identity.
//!
//! Both strategies rely on the parser depending only on token kinds, on braces
//! resetting the lexer, and on error recovery never leaving the innermost block.

use std::collections::HashMap;

use ra_ap_text_edit::Indel;
use rowan::{Children, GreenNode, GreenNodeData, GreenToken, NodeOrToken, TextRange, TextSize, TokenAtOffset};

use super::{
    grammar,
    lex_to_syn::LexedStr,
    nodes_types::{green_kind, GreenElement, GreenElementRef, SyntaxElement, SyntaxNode, SyntaxToken},
    parse_error::ParseError,
    parse_lexed,
    parser::Parser,
    rcss_grammar::EntryPoint,
    syntax_error::{collect_errors, SyntaxError},
    syntax_kind::SyntaxKind::{self, *},
    Tree,
};
use crate::config::{IncrementalMode, ParserConfig};

/// A text change, in byte offsets: `[start_byte, old_end_byte)` of the old
/// text became `[start_byte, new_end_byte)` of the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit ends before it starts ({start}..{end})")]
    Reversed { start: usize, end: usize },
    #[error("edit ends at {end}, past the end of the old text ({len})")]
    OutOfBounds { end: usize, len: usize },
    #[error("new text is {actual} bytes long, the edit implies {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("edit boundary {0} splits a character")]
    NotCharBoundary(usize),
}

impl Edit {
    pub fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Edit {
        Edit { start_byte, old_end_byte, new_end_byte }
    }

    pub fn from_indel(indel: &Indel) -> Edit {
        let start_byte = usize::from(indel.delete.start());
        Edit {
            start_byte,
            old_end_byte: usize::from(indel.delete.end()),
            new_end_byte: start_byte + indel.insert.len(),
        }
    }

    /// Checks that the edit turns a text of `old_len` bytes into `new_text`.
    pub fn validate(&self, old_len: usize, new_text: &str) -> Result<(), EditError> {
        for end in [self.old_end_byte, self.new_end_byte] {
            if end < self.start_byte {
                return Err(EditError::Reversed { start: self.start_byte, end });
            }
        }
        if self.old_end_byte > old_len {
            return Err(EditError::OutOfBounds { end: self.old_end_byte, len: old_len });
        }
        let expected = old_len - self.old_end_byte + self.new_end_byte;
        if expected != new_text.len() {
            return Err(EditError::LengthMismatch { expected, actual: new_text.len() });
        }
        for offset in [self.start_byte, self.new_end_byte] {
            if !new_text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    fn old_range(&self) -> TextRange {
        TextRange::new(size(self.start_byte), size(self.old_end_byte))
    }

    /// Where a new-text position maps into the old text, for an element of
    /// `len` bytes starting at `start` that lies outside the edit.
    fn old_offset(&self, start: TextSize, len: TextSize) -> Option<TextSize> {
        if start + len <= size(self.start_byte) {
            Some(start)
        } else if start >= size(self.new_end_byte) {
            Some(start - size(self.new_end_byte) + size(self.old_end_byte))
        } else {
            None
        }
    }

    /// Moves a range that follows the edit in the old text to the new text.
    fn shift(&self, range: TextRange) -> TextRange {
        let start = range.start() - size(self.old_end_byte) + size(self.new_end_byte);
        TextRange::at(start, range.len())
    }
}

fn size(offset: usize) -> TextSize {
    TextSize::from(offset as u32)
}

/// The strategy that produced a reparsed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseOutcome {
    Token,
    Block,
    Full,
}

pub fn reparse(
    old: &Tree,
    edit: &Edit,
    new_text: &str,
    config: &ParserConfig,
) -> (Tree, ReparseOutcome) {
    let _p = tracing::span!(tracing::Level::DEBUG, "reparse", ?edit).entered();
    if let Err(err) = edit.validate(old.source_len(), new_text) {
        tracing::warn!(%err, "invalid edit, parsing from scratch");
        return (Tree::new(full_parse(new_text, config)), ReparseOutcome::Full);
    }
    if config.incremental == IncrementalMode::Disable {
        return (Tree::new(full_parse(new_text, config)), ReparseOutcome::Full);
    }

    if let Some(tree) = reparse_token(old, edit, new_text) {
        return (tree, ReparseOutcome::Token);
    }
    if let Some(tree) = reparse_block(old, edit, new_text, config) {
        return (tree, ReparseOutcome::Block);
    }

    let fresh = full_parse(new_text, config);
    let index = OldIndex::new(NodeOrToken::Node(&**old.green()), TextSize::from(0));
    let green = index.reuse(&fresh, TextSize::from(0), edit);
    tracing::debug!("reparsed the whole text");
    (Tree::new(green), ReparseOutcome::Full)
}

fn full_parse(text: &str, config: &ParserConfig) -> GreenNode {
    parse_lexed(&LexedStr::new(text), config)
}

fn reparse_token(old: &Tree, edit: &Edit, new_text: &str) -> Option<Tree> {
    let root = old.root();
    let range = edit.old_range();
    let token = edited_token(&root, range)?;
    if token.kind().is_lex_error() || token.text().is_empty() {
        return None;
    }

    let token_range = token.text_range();
    let new_token_end = usize::from(token_range.end()) - edit.old_end_byte + edit.new_end_byte;
    let new_token_text = new_text.get(usize::from(token_range.start())..new_token_end)?;
    if new_token_text.is_empty() {
        return None;
    }

    let scope = enclosing_block(&root, range).unwrap_or_else(|| root.clone());
    let scope_range = scope.text_range();
    let new_scope_end = usize::from(scope_range.end()) - edit.old_end_byte + edit.new_end_byte;
    let lexed = LexedStr::new(new_text.get(usize::from(scope_range.start())..new_scope_end)?);

    let old_tokens: Vec<SyntaxToken> = scope
        .descendants_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .filter(|t| !t.text().is_empty())
        .collect();
    if old_tokens.len() != lexed.len() {
        return None;
    }
    for (i, old_token) in old_tokens.iter().enumerate() {
        let expected = if *old_token == token { new_token_text } else { old_token.text() };
        if lexed.kind(i) != old_token.kind() || lexed.text(i) != expected {
            return None;
        }
    }

    let new_token = GreenToken::new(token.kind().into(), new_token_text);
    let new_element = NodeOrToken::Token(&*new_token);
    let green = token.replace_with(new_token.clone());
    let errors = merge_errors(old.errors(), token_range, edit, new_element, |err| {
        err.range() == token_range && ParseError::from_token(token.kind(), token.text()).is_some()
    });
    tracing::debug!(?token_range, "reparsed a single token");
    Some(tree_from(green, errors))
}

/// The token containing the whole edited range.
fn edited_token(root: &SyntaxNode, range: TextRange) -> Option<SyntaxToken> {
    let token = match root.token_at_offset(range.start()) {
        TokenAtOffset::None => return None,
        TokenAtOffset::Single(token) => token,
        TokenAtOffset::Between(left, right) => {
            if left.text_range().contains_range(range) {
                left
            } else {
                right
            }
        }
    };
    token.text_range().contains_range(range).then_some(token)
}

/// The smallest block delimited by real braces with `range` strictly inside.
fn enclosing_block(root: &SyntaxNode, range: TextRange) -> Option<SyntaxNode> {
    let start = match root.covering_element(range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    start.ancestors().find(|node| {
        let block_range = node.text_range();
        node.kind() == BLOCK
            && block_range.start() < range.start()
            && range.end() < block_range.end()
            && is_delimited(node)
    })
}

fn is_delimited(block: &SyntaxNode) -> bool {
    let real = |element: Option<SyntaxElement>, kind: SyntaxKind| {
        element
            .and_then(SyntaxElement::into_token)
            .map_or(false, |t| t.kind() == kind && !t.text().is_empty())
    };
    real(block.first_child_or_token(), L_CURLY) && real(block.last_child_or_token(), R_CURLY)
}

fn reparse_block(old: &Tree, edit: &Edit, new_text: &str, config: &ParserConfig) -> Option<Tree> {
    let root = old.root();
    let block = enclosing_block(&root, edit.old_range())?;
    let old_range = block.text_range();
    let new_end = usize::from(old_range.end()) - edit.old_end_byte + edit.new_end_byte;
    let text = new_text.get(usize::from(old_range.start())..new_end)?;

    let lexed = LexedStr::new(text);
    let fresh = Parser::new(&lexed, grammar(), EntryPoint::Block, config.recovery_window).parse()?;
    let real = |element: Option<GreenElementRef<'_>>, kind: SyntaxKind| {
        matches!(element, Some(NodeOrToken::Token(t)) if green_kind(t.kind()) == kind && !t.text().is_empty())
    };
    if !real(fresh.children().next(), L_CURLY) || !real(fresh.children().last(), R_CURLY) {
        return None;
    }

    let old_green = block.green();
    let index = OldIndex::new(NodeOrToken::Node(&*old_green), old_range.start());
    let fresh = index.reuse(&fresh, old_range.start(), edit);
    let errors = merge_errors(old.errors(), old_range, edit, NodeOrToken::Node(&*fresh), |err| {
        err.range().start() > old_range.start() && err.range().end() < old_range.end()
    });
    let green = block.replace_with(fresh);
    tracing::debug!(?old_range, "reparsed a block");
    Some(tree_from(green, errors))
}

fn tree_from(green: GreenNode, errors: Option<Vec<SyntaxError>>) -> Tree {
    match errors {
        Some(errors) => Tree::with_errors(green, errors),
        None => Tree::new(green),
    }
}

/// Combines the old errors around `region` with the errors of its
/// replacement `element`. Returns `None` when an old error cannot be placed
/// on either side of the region, and errors must be recomputed.
fn merge_errors(
    old: &[SyntaxError],
    region: TextRange,
    edit: &Edit,
    element: GreenElementRef<'_>,
    inside: impl Fn(&SyntaxError) -> bool,
) -> Option<Vec<SyntaxError>> {
    let mut before = Vec::new();
    let mut after = Vec::new();
    for err in old {
        let range = err.range();
        if range.end() <= region.start() {
            before.push(err.clone());
        } else if range.start() >= region.end() {
            after.push(err.clone().with_range(edit.shift(range)));
        } else if !inside(err) {
            tracing::debug!(?range, "error straddles the reparsed region");
            return None;
        }
    }
    collect_errors(element, region.start(), &mut before);
    before.extend(after);
    Some(before)
}

/// The elements of an old subtree, by old position, kind and length.
struct OldIndex<'a> {
    elements: HashMap<(TextSize, SyntaxKind, TextSize), Vec<GreenElementRef<'a>>>,
}

impl<'a> OldIndex<'a> {
    fn new(root: GreenElementRef<'a>, offset: TextSize) -> OldIndex<'a> {
        let mut index = OldIndex { elements: HashMap::new() };
        index.add(root, offset);
        index
    }

    fn add(&mut self, root: GreenElementRef<'a>, offset: TextSize) {
        let mut work = vec![(root, offset)];
        while let Some((element, offset)) = work.pop() {
            let key = (offset, green_kind(element.kind()), element.text_len());
            self.elements.entry(key).or_default().push(element);
            if let NodeOrToken::Node(node) = element {
                let mut offset = offset;
                for child in node.children() {
                    work.push((child, offset));
                    offset += child.text_len();
                }
            }
        }
    }

    fn candidates(
        &self,
        kind: SyntaxKind,
        start: TextSize,
        len: TextSize,
        edit: &Edit,
    ) -> &[GreenElementRef<'a>] {
        edit.old_offset(start, len)
            .and_then(|old_start| self.elements.get(&(old_start, kind, len)))
            .map_or(&[], Vec::as_slice)
    }

    /// Rebuilds `new` bottom-up, substituting old green elements for
    /// identical ones outside the edit.
    fn reuse(&self, new: &GreenNodeData, start: TextSize, edit: &Edit) -> GreenNode {
        let mut stack = vec![ReuseFrame::new(new, start)];
        while let Some(mut frame) = stack.pop() {
            match frame.children.next() {
                Some(NodeOrToken::Node(node)) => {
                    let child = ReuseFrame::new(node, frame.offset);
                    frame.offset += node.text_len();
                    stack.push(frame);
                    stack.push(child);
                }
                Some(NodeOrToken::Token(token)) => {
                    let len = token.text_len();
                    let old = self
                        .candidates(green_kind(token.kind()), frame.offset, len, edit)
                        .iter()
                        .find_map(|old| old.as_token().copied().filter(|old| old.text() == token.text()));
                    frame.rebuilt.push(NodeOrToken::Token(old.unwrap_or(token).to_owned()));
                    frame.offset += len;
                    stack.push(frame);
                }
                None => {
                    let green = self.rebuild(frame, edit);
                    match stack.last_mut() {
                        Some(parent) => parent.rebuilt.push(NodeOrToken::Node(green)),
                        None => return green,
                    }
                }
            }
        }
        unreachable!("the outermost frame returns")
    }

    fn rebuild(&self, frame: ReuseFrame<'_>, edit: &Edit) -> GreenNode {
        let new = frame.node;
        let kind = green_kind(new.kind());
        let old = self.candidates(kind, frame.start, new.text_len(), edit).iter().find_map(|old| {
            old.as_node().copied().filter(|old| same_children(old, &frame.rebuilt))
        });
        match old {
            Some(old) => old.to_owned(),
            None => GreenNode::new(new.kind(), frame.rebuilt),
        }
    }
}

/// A node of the new tree whose children are being rebuilt.
struct ReuseFrame<'n> {
    node: &'n GreenNodeData,
    start: TextSize,
    offset: TextSize,
    children: Children<'n>,
    rebuilt: Vec<GreenElement>,
}

impl<'n> ReuseFrame<'n> {
    fn new(node: &'n GreenNodeData, start: TextSize) -> ReuseFrame<'n> {
        ReuseFrame {
            node,
            start,
            offset: start,
            children: node.children(),
            rebuilt: Vec::with_capacity(node.children().len()),
        }
    }
}

fn same_children(old: &GreenNodeData, new: &[GreenElement]) -> bool {
    old.children().len() == new.len()
        && old.children().zip(new).all(|(old, new)| match (old, new) {
            (NodeOrToken::Node(old), NodeOrToken::Node(new)) => std::ptr::eq(old, &**new),
            (NodeOrToken::Token(old), NodeOrToken::Token(new)) => std::ptr::eq(old, &**new),
            _ => false,
        })
}

impl From<&Indel> for Edit {
    fn from(indel: &Indel) -> Edit {
        Edit::from_indel(indel)
    }
}

#[cfg(test)]
mod tests {
    use ra_ap_text_edit::Indel;
    use rowan::{TextRange, TextSize};

    use super::{reparse, Edit, EditError, ReparseOutcome};
    use crate::{
        config::{IncrementalMode, ParserConfig},
        row_parser::{
            nodes_types::{NodeExt, SyntaxNode},
            parse,
            syntax_kind::SyntaxKind,
        },
    };

    /// Splits `text` at the `$0` markers: one marks an insertion point, two a range.
    fn extract_range(text: &str) -> (TextRange, String) {
        let first = text.find("$0").expect("no $0 marker");
        let rest = text[first + 2..].to_string();
        let (end, text) = match rest.find("$0") {
            Some(second) => (first + second, format!("{}{}{}", &text[..first], &rest[..second], &rest[second + 2..])),
            None => (first, format!("{}{}", &text[..first], rest)),
        };
        (TextRange::new(TextSize::from(first as u32), TextSize::from(end as u32)), text)
    }

    fn do_check(before: &str, replace_with: &str, outcome: ReparseOutcome) {
        let (range, before) = extract_range(before);
        let indel = Indel::replace(range, replace_with.to_owned());
        let after = {
            let mut after = before.clone();
            indel.apply(&mut after);
            after
        };

        let fully_reparsed = parse(&after);
        let old = parse(&before);
        let (incrementally_reparsed, got) =
            reparse(&old, &Edit::from_indel(&indel), &after, &ParserConfig::default());

        assert_eq!(
            fully_reparsed.debug_dump(),
            incrementally_reparsed.debug_dump(),
            "incremental reparse of {before:?} into {after:?} differs"
        );
        assert_eq!(fully_reparsed.errors(), incrementally_reparsed.errors());
        assert_eq!(got, outcome, "{before:?} into {after:?}");
    }

    #[test]
    fn reparse_token_tests() {
        use ReparseOutcome::Token;
        do_check(".foo { color: r$0e$0d; }", "ebeccapurpl", Token);
        do_check("a { b: 1px$0 }", "0", Token);
        do_check("/* a$0 */ a {}", " longer comment", Token);
        do_check(".a$0 { }", "bc", Token);
        do_check("a { $0 }", "\n\n  ", Token);
        do_check("$x: @blue-50$00;", "5", Token);
        do_check("a { b: \"x$0\" }", "yz", Token);
    }

    #[test]
    fn reparse_block_tests() {
        use ReparseOutcome::Block;
        do_check("a { color: red;$0 }", " background: blue;", Block);
        do_check("a { b { c: d; } e: $0f; }", "g h ", Block);
        do_check("@media screen { .a { x: 1$0; } }", " !important", Block);
        do_check("a { b: c$0; }", " ]", Block);
        do_check("a { b: c; $0}", "]] ", Block);
        do_check("$card { padding: 4px;$0 }", " apply: $base;", Block);
    }

    #[test]
    fn reparse_full_tests() {
        use ReparseOutcome::Full;
        do_check("a { b: c; $0}", "} d {", Full);
        do_check("a { b: c; }$0", " d { }", Full);
        do_check("a$0 { b: c; }", ", d", Full);
        do_check("a { b: c; $0}", "\"", Full);
        do_check("a { b: c; } $0x", "/*", Full);
        do_check("% base-16$0\n.a {}", " dark", Full);
        do_check("$0", ".a { }", Full);
        // `:e` opens a nested rule there, which takes the closing brace.
        do_check("a { b: c$0; }", " d: e", Full);
    }

    #[test]
    fn block_losing_its_brace_is_reparsed_in_full() {
        let after = "a { b: c d: e; }";
        let edit = Edit::new(8, 8, 13);
        let (new, outcome) = reparse(&parse("a { b: c; }"), &edit, after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Full);
        assert_eq!(new.root().to_string(), after);
        let outer = new.root().descendants().find(|n| n.kind() == SyntaxKind::BLOCK).unwrap();
        assert!(outer.last_token().unwrap().is_missing());
        assert_eq!(new, parse(after));
    }

    fn nodes(root: &SyntaxNode) -> Vec<SyntaxNode> {
        root.descendants().collect()
    }

    #[test]
    fn unchanged_subtrees_keep_their_identity() {
        let before = ".a { color: red; }\n.b { margin: 0; }\n";
        let old = parse(before);
        let after = ".a { color: blue; }\n.b { margin: 0; }\n";
        let edit = Edit::new(12, 15, 16);
        let (new, outcome) = reparse(&old, &edit, after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Token);
        assert_eq!(new.root().to_string(), after);

        let old_nodes = nodes(&old.root());
        let new_nodes = nodes(&new.root());
        let old_b = old_nodes.iter().filter(|n| n.kind() == SyntaxKind::RULE_SET).nth(1).unwrap();
        let new_b = new_nodes.iter().filter(|n| n.kind() == SyntaxKind::RULE_SET).nth(1).unwrap();
        assert!(old_b.shares_green(new_b));
        let old_a = old_nodes.iter().find(|n| n.kind() == SyntaxKind::RULE_SET).unwrap();
        let new_a = new_nodes.iter().find(|n| n.kind() == SyntaxKind::RULE_SET).unwrap();
        assert!(!old_a.shares_green(new_a));
    }

    #[test]
    fn full_reparse_reuses_untouched_rule_sets() {
        let before = ".a { x: 1; }\n.b { y: 2; }\n.c { z: 3; }\n";
        let after = ".a { x: 1; }\n.b, .d { y: 2; }\n.c { z: 3; }\n";
        let old = parse(before);
        let (new, outcome) =
            reparse(&old, &Edit::new(15, 15, 19), after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Full);
        assert_eq!(new, parse(after));

        let rule_sets = |root: &SyntaxNode| -> Vec<SyntaxNode> {
            root.descendants().filter(|n| n.kind() == SyntaxKind::RULE_SET).collect()
        };
        let (old_sets, new_sets) = (rule_sets(&old.root()), rule_sets(&new.root()));
        assert!(old_sets[0].shares_green(&new_sets[0]));
        assert!(!old_sets[1].shares_green(&new_sets[1]));
        assert!(old_sets[2].shares_green(&new_sets[2]));
    }

    #[test]
    fn block_reparse_reuses_siblings_inside_the_block() {
        let before = "a {\n  b: 1;\n  c: 2;\n}\n";
        let after = "a {\n  b: 1;\n  c: 2;\n  d: 3;\n}\n";
        let old = parse(before);
        let (new, outcome) =
            reparse(&old, &Edit::new(19, 19, 27), after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Block);
        assert_eq!(new, parse(after));

        let decls = |root: &SyntaxNode| -> Vec<SyntaxNode> {
            root.descendants().filter(|n| n.kind() == SyntaxKind::DECLARATION).collect()
        };
        let (old_decls, new_decls) = (decls(&old.root()), decls(&new.root()));
        assert!(old_decls[0].shares_green(&new_decls[0]));
        assert!(old_decls[1].shares_green(&new_decls[1]));
    }

    #[test]
    fn old_tree_is_untouched() {
        let before = "a { b: c; }";
        let old = parse(before);
        let dump = old.debug_dump();
        let _ = old.reparse(&Edit::new(7, 8, 9), "a { b: de; }");
        assert_eq!(old.debug_dump(), dump);
        assert_eq!(old.root().to_string(), before);
    }

    #[test]
    fn invalid_edits_fall_back_to_full_parse() {
        let old = parse("a { b: c; }");
        let after = "a { b: cd; }";
        let (new, outcome) = reparse(&old, &Edit::new(9, 8, 9), after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Full);
        assert_eq!(new, parse(after));

        let (new, outcome) = reparse(&old, &Edit::new(8, 8, 10), after, &ParserConfig::default());
        assert_eq!(outcome, ReparseOutcome::Full);
        assert_eq!(new, parse(after));
    }

    #[test]
    fn disabled_incremental_mode_parses_everything() {
        let old = parse("a { b: c; }");
        let config = ParserConfig { incremental: IncrementalMode::Disable, ..Default::default() };
        let (_, outcome) = reparse(&old, &Edit::new(8, 8, 9), "a { b: cd; }", &config);
        assert_eq!(outcome, ReparseOutcome::Full);
    }

    #[test]
    fn edit_validation() {
        assert_eq!(Edit::new(1, 2, 3).validate(4, "abcde"), Ok(()));
        assert_eq!(
            Edit::new(2, 1, 3).validate(4, "abcde"),
            Err(EditError::Reversed { start: 2, end: 1 })
        );
        assert_eq!(
            Edit::new(1, 5, 3).validate(4, "abc"),
            Err(EditError::OutOfBounds { end: 5, len: 4 })
        );
        assert_eq!(
            Edit::new(1, 2, 3).validate(4, "abcd"),
            Err(EditError::LengthMismatch { expected: 5, actual: 4 })
        );
        assert_eq!(Edit::new(1, 1, 2).validate(1, "ä"), Err(EditError::NotCharBoundary(1)));
    }
}
