//! The LR driver: shifts and reduces tokens of a [`LexedStr`] into a green
//! tree, recovering from syntax errors.
//!
//! The stack holds one fragment per entry: the run of green elements the
//! entry stands for. Trivia is not seen by the automaton. It is queued as
//! pending and prepended to the next shifted token, then floated out of every
//! node that starts at that token, so it ends up attached to the outermost one.
//!
//! Recovery never reaches below the innermost open `{`. A `}` can always be
//! shifted at that level, so errors stay inside the block they occur in.

use ra_ap_limit::Limit;
use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::{
    lex_to_syn::LexedStr,
    nodes_types::{green_kind, GreenElement, GreenElementRef},
    rcss_grammar::{EntryPoint, CLOSERS, INSERTABLE},
    syntax_kind::SyntaxKind::{self, *},
    table::{Action, ParseTable},
};
use crate::T;

struct StackEntry {
    state: u32,
    fragment: Vec<GreenElement>,
    opens_scope: bool,
}

pub(crate) struct Parser<'t> {
    table: &'t ParseTable,
    lexed: &'t LexedStr<'t>,
    entry: EntryPoint,
    window: Limit,
    pos: usize,
    stack: Vec<StackEntry>,
    pending: Vec<GreenElement>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(
        lexed: &'t LexedStr<'t>,
        table: &'t ParseTable,
        entry: EntryPoint,
        recovery_window: usize,
    ) -> Parser<'t> {
        let start = table
            .start_state(entry.nonterminal())
            .unwrap_or_else(|| panic!("parse table has no entry point for {entry:?}"));
        let mut parser = Parser {
            table,
            lexed,
            entry,
            window: Limit::new(recovery_window),
            pos: 0,
            stack: vec![StackEntry { state: start, fragment: Vec::new(), opens_scope: false }],
            pending: Vec::new(),
        };
        parser.eat_trivia();
        parser
    }

    /// Runs the automaton to completion.
    ///
    /// Returns `None` only for the `Block` entry point, when the input is not
    /// exactly one well-delimited block.
    pub(crate) fn parse(mut self) -> Option<GreenNode> {
        let _p = tracing::span!(
            tracing::Level::DEBUG,
            "Parser::parse",
            entry = ?self.entry,
            tokens = self.lexed.len()
        )
        .entered();
        loop {
            let kind = self.current();
            match self.table.action(self.top_state(), kind) {
                Action::Shift(next) => {
                    let leaf = self.take_token();
                    self.push(next, leaf, kind == T!['{']);
                }
                Action::Reduce(rule) => self.reduce(rule),
                Action::Accept => return self.finish(),
                Action::Error => {
                    if !self.recover(kind) {
                        tracing::debug!(pos = self.pos, ?kind, "giving up");
                        return None;
                    }
                }
            }
        }
    }

    fn current(&self) -> SyntaxKind {
        self.lexed.kind(self.pos)
    }

    fn top_state(&self) -> u32 {
        match self.stack.last() {
            Some(entry) => entry.state,
            None => panic!("parse stack underflow"),
        }
    }

    fn eat_trivia(&mut self) {
        while self.pos < self.lexed.len() && self.current().is_trivia() {
            self.pending.push(token(self.current(), self.lexed.text(self.pos)));
            self.pos += 1;
        }
    }

    /// Consumes the current token together with the pending elements before it.
    fn take_token(&mut self) -> Vec<GreenElement> {
        let mut leaf = std::mem::take(&mut self.pending);
        leaf.push(token(self.current(), self.lexed.text(self.pos)));
        self.pos += 1;
        self.eat_trivia();
        leaf
    }

    fn push(&mut self, state: u32, fragment: Vec<GreenElement>, opens_scope: bool) {
        self.stack.push(StackEntry { state, fragment, opens_scope });
    }

    fn reduce(&mut self, rule: u16) {
        let rule = self.table.rule(rule);
        let at = match self.stack.len().checked_sub(rule.rhs.len()) {
            Some(at) if at >= 1 => at,
            _ => panic!("parse stack underflow reducing {:?}", rule.lhs),
        };
        let mut children = Vec::new();
        for entry in self.stack.drain(at..) {
            children.extend(entry.fragment);
        }
        let fragment = match rule.lhs.kind() {
            None => children,
            Some(kind) => wrap(kind, children),
        };
        let state = self.top_state();
        let Some(next) = self.table.goto(state, rule.lhs) else {
            panic!("no goto from state {state} on {:?}", rule.lhs);
        };
        self.push(next, fragment, false);
    }

    fn finish(mut self) -> Option<GreenNode> {
        let mut fragment = self.stack.pop()?.fragment;
        match self.entry {
            EntryPoint::Stylesheet => {
                let root = match (fragment.pop(), fragment.is_empty()) {
                    (Some(NodeOrToken::Node(root)), true) => root,
                    _ => panic!("stylesheet did not reduce to a single node"),
                };
                if self.pending.is_empty() {
                    return Some(root);
                }
                let children: Vec<GreenElement> =
                    root.children().map(to_owned).chain(self.pending).collect();
                Some(GreenNode::new(root.kind(), children))
            }
            EntryPoint::Block => {
                if !self.pending.is_empty() || fragment.len() != 1 {
                    return None;
                }
                match fragment.pop() {
                    Some(NodeOrToken::Node(block)) => Some(block),
                    _ => None,
                }
            }
        }
    }

    fn scope_floor(&self) -> usize {
        self.stack.iter().rposition(|entry| entry.opens_scope).unwrap_or(0)
    }

    fn overlay(&self, depth: usize) -> Overlay<'_> {
        Overlay {
            table: self.table,
            stack: &self.stack,
            base: self.stack.len() - depth,
            extra: Vec::new(),
        }
    }

    /// Whether `input` would be accepted after popping `depth` entries,
    /// without ever popping the entry at `floor`.
    fn simulate(&self, depth: usize, input: &[SyntaxKind], floor: usize) -> bool {
        self.overlay(depth).accepts(input, floor)
    }

    /// The smallest depth, starting at `min_depth`, at which `kind` can be
    /// shifted again.
    fn resume_depth(&self, kind: SyntaxKind, floor: usize, min_depth: usize) -> Option<usize> {
        let max_depth = self.stack.len() - 1 - floor;
        (min_depth..=max_depth).find(|&depth| self.simulate(depth, &[kind], floor))
    }

    fn recover(&mut self, kind: SyntaxKind) -> bool {
        if kind == EOF {
            return self.recover_at_eof();
        }
        let floor = self.scope_floor();
        if self.entry == EntryPoint::Block && floor == 0 {
            return false;
        }
        tracing::trace!(pos = self.pos, ?kind, floor, "syntax error");

        if let Some(&missing) = INSERTABLE.iter().find(|&&x| self.simulate(0, &[x, kind], floor)) {
            self.insert_missing(missing);
            return true;
        }
        if let Some(depth) = self.resume_depth(kind, floor, 1) {
            self.wrap_error(depth, Vec::new());
            return true;
        }

        let mut skipped = Vec::new();
        let mut count = 0;
        loop {
            skipped.extend(self.take_token());
            count += 1;
            let kind = self.current();
            if kind == EOF {
                self.wrap_error(0, skipped);
                return true;
            }
            if let Some(depth) = self.resume_depth(kind, floor, 0) {
                self.wrap_error(depth, skipped);
                return true;
            }
            if self.window.check(count).is_err() {
                if let Some(&missing) = INSERTABLE.iter().find(|&&x| self.simulate(0, &[x], floor))
                {
                    tracing::debug!(pos = self.pos, skipped = count, "recovery window exceeded");
                    self.wrap_error(0, skipped);
                    self.insert_missing(missing);
                    return true;
                }
            }
        }
    }

    fn recover_at_eof(&mut self) -> bool {
        if self.entry == EntryPoint::Block {
            return false;
        }
        loop {
            if let Some(completion) = self.eof_completion() {
                for kind in completion {
                    self.insert_missing(kind);
                }
                return true;
            }
            if self.stack.len() <= 1 {
                return false;
            }
            self.wrap_error(1, Vec::new());
        }
    }

    /// The Missing tokens that let the input end here: closers while one can
    /// be shifted, then at most one insertable token. Every closer needs an
    /// opener on the stack, which bounds the search.
    fn eof_completion(&self) -> Option<Vec<SyntaxKind>> {
        let mut overlay = self.overlay(0);
        let mut completion = Vec::new();
        loop {
            if overlay.clone().accepts(&[EOF], 0) {
                return Some(completion);
            }
            if let Some(&missing) =
                INSERTABLE.iter().find(|&&x| overlay.clone().accepts(&[x, EOF], 0))
            {
                completion.push(missing);
                return Some(completion);
            }
            if completion.len() >= self.stack.len() {
                return None;
            }
            let &closer = CLOSERS.iter().find(|&&x| overlay.clone().accepts(&[x], 0))?;
            overlay.feed(closer, 0);
            completion.push(closer);
        }
    }

    fn insert_missing(&mut self, kind: SyntaxKind) {
        tracing::trace!(pos = self.pos, ?kind, "inserting missing token");
        loop {
            match self.table.action(self.top_state(), kind) {
                Action::Shift(next) => {
                    self.push(next, vec![token(kind, "")], kind == T!['{']);
                    return;
                }
                Action::Reduce(rule) => self.reduce(rule),
                action => panic!("cannot insert {kind:?}: {action:?}"),
            }
        }
    }

    /// Pops `depth` entries and wraps them, the pending elements and `skipped`
    /// into an `ERROR` node, which becomes pending.
    fn wrap_error(&mut self, depth: usize, skipped: Vec<GreenElement>) {
        let at = self.stack.len() - depth;
        let mut core: Vec<GreenElement> =
            self.stack.drain(at..).flat_map(|entry| entry.fragment).collect();
        core.extend(skipped);
        core.append(&mut self.pending);

        let lead = core.iter().take_while(|e| is_trivia(e)).count();
        let trail = core[lead..].iter().rev().take_while(|e| is_trivia(e)).count();
        let mut trailing = core.split_off(core.len() - trail);
        let mut inner = core.split_off(lead);
        match inner.len() {
            0 => {}
            1 if is_error(&inner[0]) => core.append(&mut inner),
            _ => {
                let flat = inner.into_iter().flat_map(|element| match element {
                    NodeOrToken::Node(error) if green_kind(error.kind()) == ERROR => {
                        error.children().map(to_owned).collect()
                    }
                    element => vec![element],
                });
                core.push(node(ERROR, flat.collect()));
            }
        }
        core.append(&mut trailing);
        self.pending = core;
    }
}

/// A lookahead copy of the automaton: the states of the lowest `base` real
/// stack entries with `extra` pushed above them. Nothing below the pop point
/// is copied.
#[derive(Clone)]
struct Overlay<'p> {
    table: &'p ParseTable,
    stack: &'p [StackEntry],
    base: usize,
    extra: Vec<u32>,
}

impl Overlay<'_> {
    fn len(&self) -> usize {
        self.base + self.extra.len()
    }

    fn top(&self) -> Option<u32> {
        match self.extra.last() {
            Some(&state) => Some(state),
            None => self.base.checked_sub(1).map(|i| self.stack[i].state),
        }
    }

    fn pop(&mut self, n: usize) {
        let from_extra = n.min(self.extra.len());
        self.extra.truncate(self.extra.len() - from_extra);
        self.base -= n - from_extra;
    }

    /// Shifts `kind`, or accepts it if it is `EOF`, reducing on the way
    /// without popping the entry at `floor`.
    fn feed(&mut self, kind: SyntaxKind, floor: usize) -> bool {
        loop {
            let Some(top) = self.top() else {
                return false;
            };
            match self.table.action(top, kind) {
                Action::Shift(next) => {
                    self.extra.push(next);
                    return true;
                }
                Action::Reduce(rule) => {
                    let rule = self.table.rule(rule);
                    let len = rule.rhs.len();
                    if self.len() <= floor + len {
                        return false;
                    }
                    self.pop(len);
                    let Some(next) = self.top().and_then(|s| self.table.goto(s, rule.lhs)) else {
                        return false;
                    };
                    self.extra.push(next);
                }
                Action::Accept => return kind == EOF,
                Action::Error => return false,
            }
        }
    }

    fn accepts(mut self, input: &[SyntaxKind], floor: usize) -> bool {
        input.iter().all(|&kind| self.feed(kind, floor))
    }
}

/// Builds the fragment of a visible nonterminal. Leading extras float out in
/// front of the node unless there is nothing else.
fn wrap(kind: SyntaxKind, mut children: Vec<GreenElement>) -> Vec<GreenElement> {
    if kind == STYLESHEET {
        return vec![node(kind, children)];
    }
    let lead = children.iter().take_while(|e| is_extra(e)).count();
    if lead == children.len() {
        return vec![node(kind, children)];
    }
    let inner = children.split_off(lead);
    children.push(node(kind, inner));
    children
}

fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(kind.into(), text))
}

fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenElement {
    NodeOrToken::Node(GreenNode::new(kind.into(), children))
}

fn is_trivia(element: &GreenElement) -> bool {
    element.as_token().map_or(false, |t| green_kind(t.kind()).is_trivia())
}

fn is_error(element: &GreenElement) -> bool {
    element.as_node().map_or(false, |n| green_kind(n.kind()) == ERROR)
}

fn is_extra(element: &GreenElement) -> bool {
    match element {
        NodeOrToken::Node(node) => green_kind(node.kind()) == ERROR,
        NodeOrToken::Token(token) => green_kind(token.kind()).is_trivia(),
    }
}

pub(crate) fn to_owned(element: GreenElementRef<'_>) -> GreenElement {
    match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::row_parser::{grammar, lex_to_syn::LexedStr, rcss_grammar::EntryPoint};

    fn block(text: &str) -> Option<String> {
        let lexed = LexedStr::new(text);
        let green = Parser::new(&lexed, grammar(), EntryPoint::Block, 64).parse()?;
        Some(green.to_string())
    }

    fn stylesheet(text: &str) -> String {
        let lexed = LexedStr::new(text);
        match Parser::new(&lexed, grammar(), EntryPoint::Stylesheet, 64).parse() {
            Some(green) => green.to_string(),
            None => panic!("stylesheet parse gave up on {text:?}"),
        }
    }

    #[test]
    fn stylesheet_keeps_every_byte() {
        for text in [
            "",
            "  /* only trivia */\n",
            ".a { color: red; }\n",
            "a { b: c(; } } ] ) { \"x",
            "@media screen { .a { x: 1 } ",
            "% dark\n$v: @blue-500;\n$m { apply: $v }",
            "a{b:c d:e;;;@}",
        ] {
            assert_eq!(stylesheet(text), text);
        }
    }

    #[test]
    fn block_entry_accepts_single_blocks() {
        assert_eq!(block("{ a: b; .c { d: e } }").as_deref(), Some("{ a: b; .c { d: e } }"));
        assert_eq!(block("{ a: b c: ; }").as_deref(), Some("{ a: b c: ; }"));
        assert_eq!(block("{}").as_deref(), Some("{}"));
    }

    #[test]
    fn block_entry_rejects_anything_else() {
        assert_eq!(block("{ a: b; } x"), None);
        assert_eq!(block("{ a: b;"), None);
        assert_eq!(block("x { }"), None);
        assert_eq!(block(" { }"), None);
        assert_eq!(block(""), None);
        // The nested `:e` rule takes the last brace.
        assert_eq!(block("{ b: c d: e; }"), None);
    }
}
