//! Canonical LR(1) parse tables.
//!
//! The table is computed once from a list of [`GrammarRule`]s. States are
//! identified by their kernel: the items with the dot past the first symbol,
//! plus the start items, each with its lookahead set.
//!
//! Conflicts are resolved statically:
//!
//! * shift/reduce: the reduce rule's precedence is compared with the highest
//!   precedence of the rules that can shift the lookahead. On a tie a
//!   left-associative rule reduces, a right-associative one shifts, and
//!   otherwise the rule declared first wins.
//! * reduce/reduce: higher precedence wins, then the rule declared first.
//!
//! Every resolved conflict is kept in [`ParseTable::conflicts`].

use std::{
    cmp::{Ordering, Reverse},
    collections::{btree_map, BTreeMap, HashMap},
};

use strum::EnumCount;

use super::{
    rcss_grammar::{Assoc, GrammarRule, NonTerminal, Symbol},
    syntax_kind::SyntaxKind,
    token_set::TokenSet,
};

/// Number of terminals, `EOF` included.
pub(crate) const TERMINAL_COUNT: usize = SyntaxKind::EOF as usize + 1;

const MAX_STATES: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Error,
    Shift(u32),
    Reduce(u16),
    Accept,
}

/// A shift/reduce or reduce/reduce conflict and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: u32,
    pub lookahead: SyntaxKind,
    pub chosen: Action,
    pub rejected: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("nonterminal {0:?} is used but has no rules")]
    UndefinedNonTerminal(NonTerminal),
    #[error("{0:?} is not a terminal the parser can see")]
    TerminalOutOfRange(SyntaxKind),
    #[error("entry point {0:?} must have exactly one rule")]
    BadEntryPoint(NonTerminal),
    #[error("grammar has more than {0} rules")]
    TooManyRules(usize),
    #[error("grammar needs more than {0} states")]
    TooManyStates(usize),
}

type Item = (u16, u16);
type ItemSet = BTreeMap<Item, TokenSet>;

pub struct ParseTable {
    rules: &'static [GrammarRule],
    actions: Vec<[Action; TERMINAL_COUNT]>,
    gotos: Vec<[Option<u32>; NonTerminal::COUNT]>,
    starts: Vec<(NonTerminal, u32)>,
    conflicts: Vec<Conflict>,
}

impl std::fmt::Debug for ParseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseTable")
            .field("rules", &self.rules.len())
            .field("states", &self.actions.len())
            .field("conflicts", &self.conflicts.len())
            .finish()
    }
}

impl ParseTable {
    pub fn build(
        rules: &'static [GrammarRule],
        entries: &[NonTerminal],
    ) -> Result<ParseTable, GrammarError> {
        let _p = tracing::span!(tracing::Level::DEBUG, "build_table", rules = rules.len())
            .entered();
        let builder = Builder::new(rules, entries)?;
        let table = builder.run()?;
        tracing::debug!(
            states = table.actions.len(),
            conflicts = table.conflicts.len(),
            "parse table built"
        );
        Ok(table)
    }

    pub fn start_state(&self, entry: NonTerminal) -> Option<u32> {
        self.starts.iter().find(|(nt, _)| *nt == entry).map(|&(_, state)| state)
    }

    pub fn action(&self, state: u32, lookahead: SyntaxKind) -> Action {
        match self.actions[state as usize].get(lookahead as usize) {
            Some(&action) => action,
            None => Action::Error,
        }
    }

    pub fn goto(&self, state: u32, nt: NonTerminal) -> Option<u32> {
        self.gotos[state as usize][nt as usize]
    }

    pub fn rule(&self, rule: u16) -> &'static GrammarRule {
        &self.rules[rule as usize]
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

struct Builder {
    rules: &'static [GrammarRule],
    entries: Vec<NonTerminal>,
    rules_of: Vec<Vec<u16>>,
    first: Vec<TokenSet>,
    nullable: Vec<bool>,
}

impl Builder {
    fn new(rules: &'static [GrammarRule], entries: &[NonTerminal]) -> Result<Builder, GrammarError> {
        if rules.len() > u16::MAX as usize {
            return Err(GrammarError::TooManyRules(u16::MAX as usize));
        }
        let mut rules_of = vec![Vec::new(); NonTerminal::COUNT];
        for (idx, rule) in rules.iter().enumerate() {
            rules_of[rule.lhs as usize].push(idx as u16);
        }
        for rule in rules {
            for sym in rule.rhs {
                match *sym {
                    Symbol::Term(kind) => {
                        if !kind.is_token() || kind.is_trivia() || kind == SyntaxKind::EOF {
                            return Err(GrammarError::TerminalOutOfRange(kind));
                        }
                    }
                    Symbol::NonTerm(nt) => {
                        if rules_of[nt as usize].is_empty() {
                            return Err(GrammarError::UndefinedNonTerminal(nt));
                        }
                    }
                }
            }
        }
        for &entry in entries {
            if rules_of[entry as usize].len() != 1 {
                return Err(GrammarError::BadEntryPoint(entry));
            }
        }

        let mut builder = Builder {
            rules,
            entries: entries.to_vec(),
            rules_of,
            first: vec![TokenSet::EMPTY; NonTerminal::COUNT],
            nullable: vec![false; NonTerminal::COUNT],
        };
        builder.compute_first();
        Ok(builder)
    }

    fn compute_first(&mut self) {
        loop {
            let mut changed = false;
            for rule in self.rules {
                let lhs = rule.lhs as usize;
                let mut nullable = true;
                for sym in rule.rhs {
                    match *sym {
                        Symbol::Term(kind) => {
                            changed |= self.first[lhs].extend(TokenSet::single(kind));
                            nullable = false;
                        }
                        Symbol::NonTerm(nt) => {
                            let first = self.first[nt as usize];
                            changed |= self.first[lhs].extend(first);
                            nullable = self.nullable[nt as usize];
                        }
                    }
                    if !nullable {
                        break;
                    }
                }
                if nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// FIRST of `symbols` followed by any of `lookahead`.
    fn first_of(&self, symbols: &[Symbol], lookahead: TokenSet) -> TokenSet {
        let mut res = TokenSet::EMPTY;
        for sym in symbols {
            match *sym {
                Symbol::Term(kind) => return res.union(TokenSet::single(kind)),
                Symbol::NonTerm(nt) => {
                    res = res.union(self.first[nt as usize]);
                    if !self.nullable[nt as usize] {
                        return res;
                    }
                }
            }
        }
        res.union(lookahead)
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut items = kernel.clone();
        let mut work: Vec<Item> = items.keys().copied().collect();
        while let Some((rule, dot)) = work.pop() {
            let rhs = self.rules[rule as usize].rhs;
            let Some(&Symbol::NonTerm(nt)) = rhs.get(dot as usize) else {
                continue;
            };
            let follow = self.first_of(&rhs[dot as usize + 1..], items[&(rule, dot)]);
            for &sub in &self.rules_of[nt as usize] {
                let grew = match items.entry((sub, 0)) {
                    btree_map::Entry::Vacant(entry) => {
                        entry.insert(follow);
                        true
                    }
                    btree_map::Entry::Occupied(mut entry) => entry.get_mut().extend(follow),
                };
                if grew {
                    work.push((sub, 0));
                }
            }
        }
        items
    }

    fn run(self) -> Result<ParseTable, GrammarError> {
        let mut kernels: Vec<ItemSet> = Vec::new();
        let mut index: HashMap<ItemSet, u32> = HashMap::new();
        let mut intern = |kernel: ItemSet, kernels: &mut Vec<ItemSet>| {
            if let Some(&state) = index.get(&kernel) {
                return Ok(state);
            }
            if kernels.len() >= MAX_STATES {
                return Err(GrammarError::TooManyStates(MAX_STATES));
            }
            let state = kernels.len() as u32;
            kernels.push(kernel.clone());
            index.insert(kernel, state);
            Ok(state)
        };

        let mut starts = Vec::new();
        for &entry in &self.entries {
            let rule = self.rules_of[entry as usize][0];
            let kernel = ItemSet::from([((rule, 0), TokenSet::single(SyntaxKind::EOF))]);
            starts.push((entry, intern(kernel, &mut kernels)?));
        }

        let mut actions = Vec::new();
        let mut gotos = Vec::new();
        let mut conflicts = Vec::new();
        let mut state = 0;
        while state < kernels.len() {
            let items = self.closure(&kernels[state]);

            let mut successors: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
            for (&(rule, dot), &lookahead) in &items {
                if let Some(&sym) = self.rules[rule as usize].rhs.get(dot as usize) {
                    successors
                        .entry(sym)
                        .or_default()
                        .entry((rule, dot + 1))
                        .or_insert(TokenSet::EMPTY)
                        .extend(lookahead);
                }
            }

            let mut shifts = [None; TERMINAL_COUNT];
            let mut goto_row = [None; NonTerminal::COUNT];
            for (sym, kernel) in successors {
                let target = intern(kernel, &mut kernels)?;
                match sym {
                    Symbol::Term(kind) => shifts[kind as usize] = Some(target),
                    Symbol::NonTerm(nt) => goto_row[nt as usize] = Some(target),
                }
            }

            let mut reduces: Vec<Vec<u16>> = vec![Vec::new(); TERMINAL_COUNT];
            for (&(rule, dot), lookahead) in &items {
                if dot as usize == self.rules[rule as usize].rhs.len() {
                    for kind in lookahead.iter() {
                        reduces[kind as usize].push(rule);
                    }
                }
            }

            let mut row = [Action::Error; TERMINAL_COUNT];
            for (raw, action) in row.iter_mut().enumerate() {
                let Some(kind) = SyntaxKind::from_raw(raw as u16) else {
                    continue;
                };
                *action = self.resolve(
                    state as u32,
                    kind,
                    shifts[raw],
                    &reduces[raw],
                    &items,
                    &mut conflicts,
                );
            }
            apply_default_reduction(&mut row);

            actions.push(row);
            gotos.push(goto_row);
            state += 1;
        }

        Ok(ParseTable { rules: self.rules, actions, gotos, starts, conflicts })
    }

    fn resolve(
        &self,
        state: u32,
        lookahead: SyntaxKind,
        shift: Option<u32>,
        reduces: &[u16],
        items: &ItemSet,
        conflicts: &mut Vec<Conflict>,
    ) -> Action {
        let best = reduces
            .iter()
            .copied()
            .min_by_key(|&rule| (Reverse(self.rules[rule as usize].prec), rule));
        let mut record = |chosen: Action, rejected: Action| {
            tracing::debug!(state, ?lookahead, ?chosen, ?rejected, "resolved grammar conflict");
            conflicts.push(Conflict { state, lookahead, chosen, rejected });
        };
        if let Some(best) = best {
            for &other in reduces.iter().filter(|&&rule| rule != best) {
                record(self.reduce_action(best), self.reduce_action(other));
            }
        }

        match (shift, best) {
            (None, None) => Action::Error,
            (Some(target), None) => Action::Shift(target),
            (None, Some(rule)) => self.reduce_action(rule),
            (Some(target), Some(rule)) => {
                let (shift_prec, shift_rule) = items
                    .keys()
                    .filter(|&&(r, dot)| {
                        self.rules[r as usize].rhs.get(dot as usize)
                            == Some(&Symbol::Term(lookahead))
                    })
                    .fold((i8::MIN, u16::MAX), |(prec, first), &(r, _)| {
                        (prec.max(self.rules[r as usize].prec), first.min(r))
                    });
                let reduce_rule = &self.rules[rule as usize];
                let shift_wins = match reduce_rule.prec.cmp(&shift_prec) {
                    Ordering::Greater => false,
                    Ordering::Less => true,
                    Ordering::Equal => match reduce_rule.assoc {
                        Assoc::Left => false,
                        Assoc::Right => true,
                        Assoc::None => shift_rule < rule,
                    },
                };
                let (shift, reduce) = (Action::Shift(target), self.reduce_action(rule));
                if shift_wins {
                    record(shift, reduce);
                    shift
                } else {
                    record(reduce, shift);
                    reduce
                }
            }
        }
    }

    fn reduce_action(&self, rule: u16) -> Action {
        if self.entries.contains(&self.rules[rule as usize].lhs) {
            Action::Accept
        } else {
            Action::Reduce(rule)
        }
    }
}

/// A state whose only action is a single reduction reduces on any lookahead.
fn apply_default_reduction(row: &mut [Action; TERMINAL_COUNT]) {
    let mut only = None;
    for action in row.iter() {
        match (*action, only) {
            (Action::Error, _) => {}
            (Action::Reduce(rule), None) => only = Some(rule),
            (Action::Reduce(rule), Some(prev)) if rule == prev => {}
            _ => return,
        }
    }
    if let Some(rule) = only {
        row.fill(Action::Reduce(rule));
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, GrammarError, ParseTable};
    use crate::row_parser::{
        rcss_grammar::{
            n, t, Assoc, GrammarRule, NonTerminal::*, RCSS_GRAMMAR,
        },
        syntax_kind::SyntaxKind::{self, *},
    };

    /// Runs the bare LR automaton, rendering each reduction as `(...)`.
    fn run(table: &ParseTable, input: &[(SyntaxKind, &str)]) -> Option<String> {
        let mut states = vec![table.start_state(EntryStylesheet)?];
        let mut values: Vec<String> = Vec::new();
        let mut pos = 0;
        loop {
            let (kind, text) = input.get(pos).copied().unwrap_or((EOF, ""));
            match table.action(*states.last()?, kind) {
                Action::Shift(next) => {
                    states.push(next);
                    values.push(text.to_string());
                    pos += 1;
                }
                Action::Reduce(rule) => {
                    let rule = table.rule(rule);
                    let at = values.len() - rule.rhs.len();
                    let joined = values.split_off(at).concat();
                    states.truncate(states.len() - rule.rhs.len());
                    states.push(table.goto(*states.last()?, rule.lhs)?);
                    values.push(format!("({joined})"));
                }
                Action::Accept => return values.pop(),
                Action::Error => return None,
            }
        }
    }

    // `Value` stands in for an expression nonterminal.
    static ARITH: &[GrammarRule] = &[
        GrammarRule::new(EntryStylesheet, &[n(Value)]),
        GrammarRule::new(Value, &[n(Value), t(PLUS), n(Value)]).prec(1).assoc(Assoc::Left),
        GrammarRule::new(Value, &[n(Value), t(STAR), n(Value)]).prec(2).assoc(Assoc::Left),
        GrammarRule::new(Value, &[n(Value), t(SLASH), n(Value)]).prec(3).assoc(Assoc::Right),
        GrammarRule::new(Value, &[t(NUMBER)]),
    ];

    #[test]
    fn precedence_and_associativity() {
        let table = ParseTable::build(ARITH, &[EntryStylesheet]).unwrap();
        let num = |s| (NUMBER, s);
        let input = [num("1"), (PLUS, "+"), num("2"), (STAR, "*"), num("3"), (PLUS, "+"), num("4")];
        assert_eq!(run(&table, &input).as_deref(), Some("(((1)+((2)*(3)))+(4))"));

        let input = [num("1"), (SLASH, "/"), num("2"), (SLASH, "/"), num("3")];
        assert_eq!(run(&table, &input).as_deref(), Some("((1)/((2)/(3)))"));

        assert!(!table.conflicts().is_empty());
        assert_eq!(run(&table, &[num("1"), (PLUS, "+")]), None);
    }

    // `Value -> ':' Value` and `Value -> ':' Value ';' Value` leave `;` ambiguous.
    static DANGLING_REDUCE_FIRST: &[GrammarRule] = &[
        GrammarRule::new(EntryStylesheet, &[n(Value)]),
        GrammarRule::new(Value, &[t(COLON), n(Value)]),
        GrammarRule::new(Value, &[t(COLON), n(Value), t(SEMICOLON), n(Value)]),
        GrammarRule::new(Value, &[t(IDENT)]),
    ];

    static DANGLING_SHIFT_FIRST: &[GrammarRule] = &[
        GrammarRule::new(EntryStylesheet, &[n(Value)]),
        GrammarRule::new(Value, &[t(COLON), n(Value), t(SEMICOLON), n(Value)]),
        GrammarRule::new(Value, &[t(COLON), n(Value)]),
        GrammarRule::new(Value, &[t(IDENT)]),
    ];

    #[test]
    fn earlier_rule_wins_ties() {
        let input = [(COLON, ":"), (COLON, ":"), (IDENT, "x"), (SEMICOLON, ";"), (IDENT, "y")];

        let table = ParseTable::build(DANGLING_REDUCE_FIRST, &[EntryStylesheet]).unwrap();
        assert_eq!(run(&table, &input).as_deref(), Some("(:(:(x));(y))"));

        let table = ParseTable::build(DANGLING_SHIFT_FIRST, &[EntryStylesheet]).unwrap();
        assert_eq!(run(&table, &input).as_deref(), Some("(:(:(x);(y)))"));
        assert!(table.conflicts().iter().all(|c| c.lookahead == SEMICOLON));
    }

    static REDUCE_REDUCE: &[GrammarRule] = &[
        GrammarRule::new(EntryStylesheet, &[n(Value)]),
        GrammarRule::new(Value, &[n(Selector)]),
        GrammarRule::new(Value, &[n(Block)]),
        GrammarRule::new(Selector, &[t(IDENT)]),
        GrammarRule::new(Block, &[t(IDENT)]),
    ];

    static REDUCE_REDUCE_PREC: &[GrammarRule] = &[
        GrammarRule::new(EntryStylesheet, &[n(Value)]),
        GrammarRule::new(Value, &[n(Selector)]),
        GrammarRule::new(Value, &[n(Block)]),
        GrammarRule::new(Selector, &[t(IDENT)]),
        GrammarRule::new(Block, &[t(IDENT)]).prec(1),
    ];

    #[test]
    fn reduce_reduce_conflicts() {
        for (rules, winner) in [(REDUCE_REDUCE, 3), (REDUCE_REDUCE_PREC, 4)] {
            let table = ParseTable::build(rules, &[EntryStylesheet]).unwrap();
            let start = table.start_state(EntryStylesheet).unwrap();
            let Action::Shift(after_ident) = table.action(start, IDENT) else {
                panic!("expected a shift on IDENT");
            };
            assert_eq!(table.action(after_ident, EOF), Action::Reduce(winner));
            assert_eq!(table.conflicts().len(), 1);
        }
    }

    static UNDEFINED: &[GrammarRule] = &[GrammarRule::new(EntryStylesheet, &[n(Value)])];
    static NODE_AS_TERMINAL: &[GrammarRule] =
        &[GrammarRule::new(EntryStylesheet, &[t(STYLESHEET)])];

    #[test]
    fn malformed_grammars() {
        assert_eq!(
            ParseTable::build(UNDEFINED, &[EntryStylesheet]).unwrap_err(),
            GrammarError::UndefinedNonTerminal(Value)
        );
        assert_eq!(
            ParseTable::build(NODE_AS_TERMINAL, &[EntryStylesheet]).unwrap_err(),
            GrammarError::TerminalOutOfRange(STYLESHEET)
        );
        assert_eq!(
            ParseTable::build(ARITH, &[EntryStylesheet, Value]).unwrap_err(),
            GrammarError::BadEntryPoint(Value)
        );
    }

    #[test]
    fn rcss_grammar_only_conflicts_on_preset_names() {
        let table = ParseTable::build(RCSS_GRAMMAR, &[EntryStylesheet, EntryBlock]).unwrap();
        assert!(table.start_state(EntryBlock).is_some());
        for conflict in table.conflicts() {
            assert_eq!(conflict.lookahead, IDENT, "{conflict:?}");
            let Action::Reduce(rule) = conflict.rejected else {
                panic!("unexpected conflict {conflict:?}");
            };
            assert_eq!(table.rule(rule).lhs, PresetDirective);
            assert!(matches!(conflict.chosen, Action::Shift(_)));
        }
    }
}
