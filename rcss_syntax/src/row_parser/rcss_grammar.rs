//! The RCSS grammar as a static list of production rules.
//!
//! Nonterminals that map to a [`SyntaxKind`] become nodes of the syntax tree.
//! The others (lists, alternatives) are hidden: their children are spliced
//! into the parent node.
//!
//! Rule order matters: when two actions conflict on the same lookahead and
//! precedence does not decide, the rule declared first wins.

use strum_macros::{EnumCount, EnumIter};

use super::syntax_kind::SyntaxKind::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter)]
pub enum NonTerminal {
    EntryStylesheet,
    EntryBlock,

    Stylesheet,
    Items,
    Item,
    PresetDirective,
    PresetNames,
    VariableDecl,
    MixinDef,

    RuleSet,
    SelectorList,
    Selectors,
    Selector,
    Compounds,
    Combinator,
    CompoundSelector,
    SimpleSelectors,
    SimpleSelector,
    TypeSelector,
    UniversalSelector,
    ClassSelector,
    IdSelector,
    NestingSelector,
    KeyframeSelector,
    PseudoClass,
    PseudoElement,
    PseudoArgs,
    NthExpr,
    AttributeSelector,
    AttrMatcher,
    AttrValue,

    Block,
    BlockItems,
    BlockItem,
    Declaration,
    LastDeclaration,
    MediaShorthand,
    ShorthandArgs,
    ShorthandArg,

    Value,
    Components,
    Component,
    FunctionCall,
    ParenGroup,
    LooseItems,
    LooseItem,
    Important,

    AtRule,
    Prelude,
}

impl NonTerminal {
    /// The node kind built when this nonterminal is reduced, `None` for hidden ones.
    pub fn kind(self) -> Option<SyntaxKind> {
        use NonTerminal::*;
        let kind = match self {
            Stylesheet => STYLESHEET,
            PresetDirective => PRESET_DIRECTIVE,
            VariableDecl => VARIABLE_DECL,
            MixinDef => MIXIN_DEF,
            RuleSet => RULE_SET,
            SelectorList => SELECTOR_LIST,
            Selector => SELECTOR,
            Combinator => COMBINATOR,
            CompoundSelector => COMPOUND_SELECTOR,
            TypeSelector => TYPE_SELECTOR,
            UniversalSelector => UNIVERSAL_SELECTOR,
            ClassSelector => CLASS_SELECTOR,
            IdSelector => ID_SELECTOR,
            NestingSelector => NESTING_SELECTOR,
            KeyframeSelector => KEYFRAME_SELECTOR,
            PseudoClass => PSEUDO_CLASS,
            PseudoElement => PSEUDO_ELEMENT,
            NthExpr => NTH_EXPR,
            AttributeSelector => ATTRIBUTE_SELECTOR,
            Block => BLOCK,
            Declaration | LastDeclaration => DECLARATION,
            MediaShorthand => MEDIA_SHORTHAND,
            Value => VALUE,
            FunctionCall => FUNCTION_CALL,
            ParenGroup => PAREN_GROUP,
            Important => IMPORTANT,
            AtRule => AT_RULE,
            Prelude => PRELUDE,
            EntryStylesheet | EntryBlock | Items | Item | PresetNames | Selectors | Compounds
            | SimpleSelectors | SimpleSelector | PseudoArgs | AttrMatcher | AttrValue
            | BlockItems | BlockItem | ShorthandArgs | ShorthandArg | Components | Component
            | LooseItems | LooseItem => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Term(SyntaxKind),
    NonTerm(NonTerminal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct GrammarRule {
    pub lhs: NonTerminal,
    pub rhs: &'static [Symbol],
    pub prec: i8,
    pub assoc: Assoc,
}

impl GrammarRule {
    pub const fn new(lhs: NonTerminal, rhs: &'static [Symbol]) -> GrammarRule {
        GrammarRule { lhs, rhs, prec: 0, assoc: Assoc::None }
    }

    pub const fn prec(self, prec: i8) -> GrammarRule {
        GrammarRule { prec, ..self }
    }

    pub const fn assoc(self, assoc: Assoc) -> GrammarRule {
        GrammarRule { assoc, ..self }
    }
}

pub const fn t(kind: SyntaxKind) -> Symbol {
    Symbol::Term(kind)
}

pub const fn n(nt: NonTerminal) -> Symbol {
    Symbol::NonTerm(nt)
}

/// Where parsing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// A whole document.
    Stylesheet,
    /// A single `{ ... }` block, used to reparse blocks in isolation.
    Block,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 2] = [EntryPoint::Stylesheet, EntryPoint::Block];

    pub fn nonterminal(self) -> NonTerminal {
        match self {
            EntryPoint::Stylesheet => NonTerminal::EntryStylesheet,
            EntryPoint::Block => NonTerminal::EntryBlock,
        }
    }
}

/// Terminals error recovery may insert as Missing tokens, in order of preference.
pub const INSERTABLE: &[SyntaxKind] = &[SEMICOLON, R_CURLY, R_PAREN, R_BRACK, COLON, L_CURLY, IDENT];

/// Terminals inserted at the end of input to close open constructs.
pub const CLOSERS: &[SyntaxKind] = &[R_CURLY, R_PAREN, R_BRACK];

use NonTerminal::*;

const fn rule(lhs: NonTerminal, rhs: &'static [Symbol]) -> GrammarRule {
    GrammarRule::new(lhs, rhs)
}

pub static RCSS_GRAMMAR: &[GrammarRule] = &[
    rule(EntryStylesheet, &[n(Stylesheet)]),
    rule(EntryBlock, &[n(Block)]),

    // stylesheet
    rule(Stylesheet, &[n(Items)]),
    rule(Items, &[]),
    rule(Items, &[n(Items), n(Item)]),
    rule(Item, &[n(RuleSet)]),
    rule(Item, &[n(AtRule)]),
    rule(Item, &[n(VariableDecl)]),
    rule(Item, &[n(MixinDef)]),
    rule(Item, &[n(PresetDirective)]),
    rule(Item, &[t(SEMICOLON)]),

    // `% base-16 dark` runs to the end of the line, or to the next item
    rule(PresetDirective, &[t(PERCENT), n(PresetNames), t(LINE_BREAK)]),
    rule(PresetDirective, &[t(PERCENT), n(PresetNames)]).prec(-1),
    rule(PresetNames, &[]),
    rule(PresetNames, &[n(PresetNames), t(IDENT)]),

    rule(VariableDecl, &[t(VARIABLE), t(COLON), n(Value), t(SEMICOLON)]),
    rule(MixinDef, &[t(VARIABLE), n(Block)]),

    // selectors
    rule(RuleSet, &[n(SelectorList), n(Block)]),
    rule(SelectorList, &[n(Selectors)]),
    rule(Selectors, &[n(Selector)]),
    rule(Selectors, &[n(Selectors), t(COMMA), n(Selector)]),
    rule(Selector, &[n(Compounds)]),
    rule(Selector, &[n(Combinator), n(Compounds)]),
    rule(Compounds, &[n(CompoundSelector)]),
    rule(Compounds, &[n(Compounds), n(Combinator), n(CompoundSelector)]),
    rule(Combinator, &[t(R_ANGLE)]),
    rule(Combinator, &[t(PLUS)]),
    rule(Combinator, &[t(TILDE)]),
    rule(Combinator, &[t(DESCENDANT)]),
    rule(CompoundSelector, &[n(SimpleSelectors)]),
    rule(SimpleSelectors, &[n(SimpleSelector)]),
    rule(SimpleSelectors, &[n(SimpleSelectors), n(SimpleSelector)]),
    rule(SimpleSelector, &[n(TypeSelector)]),
    rule(SimpleSelector, &[n(UniversalSelector)]),
    rule(SimpleSelector, &[n(ClassSelector)]),
    rule(SimpleSelector, &[n(IdSelector)]),
    rule(SimpleSelector, &[n(NestingSelector)]),
    rule(SimpleSelector, &[n(KeyframeSelector)]),
    rule(SimpleSelector, &[n(PseudoClass)]),
    rule(SimpleSelector, &[n(PseudoElement)]),
    rule(SimpleSelector, &[n(AttributeSelector)]),
    rule(TypeSelector, &[t(IDENT)]),
    rule(UniversalSelector, &[t(STAR)]),
    rule(ClassSelector, &[t(DOT), t(IDENT)]),
    rule(IdSelector, &[t(HASH)]),
    rule(NestingSelector, &[t(AMP)]),
    rule(KeyframeSelector, &[t(PERCENTAGE)]),
    rule(PseudoClass, &[t(COLON), t(IDENT)]),
    rule(PseudoClass, &[t(COLON), t(FUNCTION), n(PseudoArgs), t(R_PAREN)]),
    rule(PseudoElement, &[t(COLON), t(COLON), t(IDENT)]),
    rule(PseudoArgs, &[n(SelectorList)]),
    rule(PseudoArgs, &[n(NthExpr)]),
    rule(NthExpr, &[t(NUMBER)]),
    rule(NthExpr, &[t(DIMENSION)]),
    rule(NthExpr, &[t(DIMENSION), t(PLUS), t(NUMBER)]),
    rule(AttributeSelector, &[t(L_BRACK), t(IDENT), t(R_BRACK)]),
    rule(AttributeSelector, &[t(L_BRACK), t(IDENT), n(AttrMatcher), n(AttrValue), t(R_BRACK)]),
    rule(AttrMatcher, &[t(EQ)]),
    rule(AttrMatcher, &[t(INCLUDE_MATCH)]),
    rule(AttrMatcher, &[t(DASH_MATCH)]),
    rule(AttrMatcher, &[t(PREFIX_MATCH)]),
    rule(AttrMatcher, &[t(SUFFIX_MATCH)]),
    rule(AttrMatcher, &[t(SUBSTRING_MATCH)]),
    rule(AttrValue, &[t(IDENT)]),
    rule(AttrValue, &[t(STRING)]),

    // blocks; the last declaration may omit its `;`
    rule(Block, &[t(L_CURLY), n(BlockItems), t(R_CURLY)]),
    rule(Block, &[t(L_CURLY), n(BlockItems), n(LastDeclaration), t(R_CURLY)]),
    rule(BlockItems, &[]),
    rule(BlockItems, &[n(BlockItems), n(BlockItem)]),
    rule(BlockItem, &[n(Declaration)]),
    rule(BlockItem, &[n(RuleSet)]),
    rule(BlockItem, &[n(AtRule)]),
    rule(BlockItem, &[n(VariableDecl)]),
    rule(BlockItem, &[n(MixinDef)]),
    rule(BlockItem, &[n(MediaShorthand)]),
    rule(BlockItem, &[n(PresetDirective)]),
    rule(BlockItem, &[t(SEMICOLON)]),
    rule(Declaration, &[t(PROPERTY_NAME), t(COLON), n(Value), t(SEMICOLON)]),
    rule(LastDeclaration, &[t(PROPERTY_NAME), t(COLON), n(Value)]),
    rule(MediaShorthand, &[t(FUNCTION), t(R_PAREN), n(Block)]),
    rule(MediaShorthand, &[t(FUNCTION), n(ShorthandArgs), t(R_PAREN), n(Block)]),
    rule(ShorthandArgs, &[n(ShorthandArg)]),
    rule(ShorthandArgs, &[n(ShorthandArgs), n(ShorthandArg)]),
    rule(ShorthandArg, &[t(IDENT)]),
    rule(ShorthandArg, &[t(NUMBER)]),
    rule(ShorthandArg, &[t(DIMENSION)]),
    rule(ShorthandArg, &[t(PERCENTAGE)]),
    rule(ShorthandArg, &[t(COMMA)]),
    rule(ShorthandArg, &[t(COLON)]),

    // values
    rule(Value, &[n(Components)]),
    rule(Components, &[n(Component)]),
    rule(Components, &[n(Components), n(Component)]),
    rule(Component, &[t(IDENT)]),
    rule(Component, &[t(NUMBER)]),
    rule(Component, &[t(DIMENSION)]),
    rule(Component, &[t(PERCENTAGE)]),
    rule(Component, &[t(HASH)]),
    rule(Component, &[t(STRING)]),
    rule(Component, &[t(URL)]),
    rule(Component, &[t(THEME_TOKEN)]),
    rule(Component, &[t(VARIABLE)]),
    rule(Component, &[t(COMMA)]),
    rule(Component, &[t(SLASH)]),
    rule(Component, &[t(PLUS)]),
    rule(Component, &[t(MINUS)]),
    rule(Component, &[t(STAR)]),
    rule(Component, &[n(FunctionCall)]),
    rule(Component, &[n(ParenGroup)]),
    rule(Component, &[n(Important)]),
    rule(FunctionCall, &[t(FUNCTION), t(R_PAREN)]),
    rule(FunctionCall, &[t(FUNCTION), n(Components), t(R_PAREN)]),
    rule(ParenGroup, &[t(L_PAREN), t(R_PAREN)]),
    rule(ParenGroup, &[t(L_PAREN), n(LooseItems), t(R_PAREN)]),
    rule(LooseItems, &[n(LooseItem)]),
    rule(LooseItems, &[n(LooseItems), n(LooseItem)]),
    rule(LooseItem, &[n(Component)]),
    rule(LooseItem, &[t(COLON)]),
    rule(LooseItem, &[t(R_ANGLE)]),
    rule(LooseItem, &[t(EQ)]),
    rule(LooseItem, &[t(DOT)]),
    rule(LooseItem, &[t(AMP)]),
    rule(Important, &[t(BANG), t(IDENT)]),

    // at-rules
    rule(AtRule, &[t(AT_KEYWORD), t(SEMICOLON)]),
    rule(AtRule, &[t(AT_KEYWORD), n(Prelude), t(SEMICOLON)]),
    rule(AtRule, &[t(AT_KEYWORD), n(Block)]),
    rule(AtRule, &[t(AT_KEYWORD), n(Prelude), n(Block)]),
    rule(Prelude, &[n(LooseItems)]),
];

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::{NonTerminal, Symbol, RCSS_GRAMMAR};

    #[test]
    fn every_nonterminal_has_rules() {
        for nt in NonTerminal::iter() {
            assert!(
                RCSS_GRAMMAR.iter().any(|r| r.lhs == nt),
                "{nt:?} has no rules"
            );
        }
    }

    #[test]
    fn every_nonterminal_is_used() {
        for nt in NonTerminal::iter() {
            let is_entry = matches!(nt, NonTerminal::EntryStylesheet | NonTerminal::EntryBlock);
            let used = RCSS_GRAMMAR
                .iter()
                .any(|r| r.lhs != nt && r.rhs.contains(&Symbol::NonTerm(nt)));
            assert!(is_entry || used, "{nt:?} is never used");
        }
    }
}
