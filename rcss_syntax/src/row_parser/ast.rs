//! Typed views over the untyped syntax tree.
//!
//! Every wrapper is a `SyntaxNode` of one kind. Accessors never fail on
//! malformed input; they return `None` or skip what is missing.

use smol_str::SmolStr;

use super::nodes_types::{SyntaxNode, SyntaxNodeChildren, SyntaxToken};
use super::syntax_kind::SyntaxKind::{self, *};

/// The main trait to go from untyped `SyntaxNode` to a typed ast.
pub trait AstNode {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

/// An iterator over `SyntaxNode` children of a particular AST type.
#[derive(Debug, Clone)]
pub struct AstChildren<N> {
    inner: SyntaxNodeChildren,
    ph: std::marker::PhantomData<N>,
}

impl<N> AstChildren<N> {
    fn new(parent: &SyntaxNode) -> Self {
        AstChildren { inner: parent.children(), ph: std::marker::PhantomData }
    }
}

impl<N: AstNode> Iterator for AstChildren<N> {
    type Item = N;
    fn next(&mut self) -> Option<N> {
        self.inner.find_map(N::cast)
    }
}

mod support {
    use super::{AstChildren, AstNode, SyntaxKind, SyntaxNode, SyntaxToken};

    pub(super) fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
        parent.children().find_map(N::cast)
    }

    pub(super) fn children<N: AstNode>(parent: &SyntaxNode) -> AstChildren<N> {
        AstChildren::new(parent)
    }

    /// The first real (not Missing) token of `kind`.
    pub(super) fn token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
        parent
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|it| it.kind() == kind && !it.text().is_empty())
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then(|| $name { syntax })
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.syntax, f)
            }
        }
    };
}

ast_node!(
    /// The root of every tree.
    Stylesheet, STYLESHEET
);
ast_node!(RuleSet, RULE_SET);
ast_node!(SelectorList, SELECTOR_LIST);
ast_node!(Selector, SELECTOR);
ast_node!(CompoundSelector, COMPOUND_SELECTOR);
ast_node!(Block, BLOCK);
ast_node!(Declaration, DECLARATION);
ast_node!(Value, VALUE);
ast_node!(FunctionCall, FUNCTION_CALL);
ast_node!(AtRule, AT_RULE);
ast_node!(Prelude, PRELUDE);
ast_node!(
    /// `$name: value;`
    VariableDecl, VARIABLE_DECL
);
ast_node!(
    /// `$name { ... }`, applied elsewhere with `apply: $name;`.
    MixinDef, MIXIN_DEF
);
ast_node!(
    /// `% name name ...` up to the end of the line.
    PresetDirective, PRESET_DIRECTIVE
);
ast_node!(
    /// `screen(md) { ... }`
    MediaShorthand, MEDIA_SHORTHAND
);

/// Anything that can appear at the top level or in a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    RuleSet(RuleSet),
    AtRule(AtRule),
    VariableDecl(VariableDecl),
    MixinDef(MixinDef),
    PresetDirective(PresetDirective),
    Declaration(Declaration),
    MediaShorthand(MediaShorthand),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            RULE_SET
                | AT_RULE
                | VARIABLE_DECL
                | MIXIN_DEF
                | PRESET_DIRECTIVE
                | DECLARATION
                | MEDIA_SHORTHAND
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        let res = match syntax.kind() {
            RULE_SET => Item::RuleSet(RuleSet { syntax }),
            AT_RULE => Item::AtRule(AtRule { syntax }),
            VARIABLE_DECL => Item::VariableDecl(VariableDecl { syntax }),
            MIXIN_DEF => Item::MixinDef(MixinDef { syntax }),
            PRESET_DIRECTIVE => Item::PresetDirective(PresetDirective { syntax }),
            DECLARATION => Item::Declaration(Declaration { syntax }),
            MEDIA_SHORTHAND => Item::MediaShorthand(MediaShorthand { syntax }),
            _ => return None,
        };
        Some(res)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::RuleSet(it) => it.syntax(),
            Item::AtRule(it) => it.syntax(),
            Item::VariableDecl(it) => it.syntax(),
            Item::MixinDef(it) => it.syntax(),
            Item::PresetDirective(it) => it.syntax(),
            Item::Declaration(it) => it.syntax(),
            Item::MediaShorthand(it) => it.syntax(),
        }
    }
}

impl Stylesheet {
    pub fn items(&self) -> AstChildren<Item> {
        support::children(&self.syntax)
    }

    pub fn rule_sets(&self) -> AstChildren<RuleSet> {
        support::children(&self.syntax)
    }

    /// Names enabled by every `%` directive of the document, in order.
    pub fn presets(&self) -> Vec<SmolStr> {
        support::children::<PresetDirective>(&self.syntax).flat_map(|it| it.presets()).collect()
    }
}

/// Nested rules whose selector is one of these bundle sub-properties.
const PROPERTY_BLOCKS: &[&str] = &["border", "flex", "grid", "radius"];
const THEME_VARIANTS: &[&str] = &["dark", "light"];

impl RuleSet {
    pub fn selector_list(&self) -> Option<SelectorList> {
        support::child(&self.syntax)
    }

    pub fn block(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn is_property_block(&self) -> bool {
        self.single_type_selector().map_or(false, |name| PROPERTY_BLOCKS.contains(&name.as_str()))
    }

    /// `dark { ... }` or `light { ... }` nested in a block.
    pub fn is_theme_variant(&self) -> bool {
        self.single_type_selector().map_or(false, |name| THEME_VARIANTS.contains(&name.as_str()))
    }

    /// The selector when it is a lone element name, as in `border { ... }`.
    fn single_type_selector(&self) -> Option<SmolStr> {
        if self.syntax.parent().map_or(true, |parent| parent.kind() != BLOCK) {
            return None;
        }
        let mut selectors = self.selector_list()?.selectors();
        let selector = selectors.next()?;
        if selectors.next().is_some() {
            return None;
        }
        let mut compounds = selector.compounds();
        let compound = compounds.next()?;
        if compounds.next().is_some() {
            return None;
        }
        let mut simple = compound.syntax.children();
        let type_selector = simple.next().filter(|it| it.kind() == TYPE_SELECTOR)?;
        if simple.next().is_some() {
            return None;
        }
        let ident = support::token(&type_selector, IDENT)?;
        Some(SmolStr::new(ident.text()))
    }
}

impl SelectorList {
    pub fn selectors(&self) -> AstChildren<Selector> {
        support::children(&self.syntax)
    }
}

impl Selector {
    pub fn compounds(&self) -> AstChildren<CompoundSelector> {
        support::children(&self.syntax)
    }

    /// The combinator of a relative selector such as `> .child`.
    pub fn leading_combinator(&self) -> Option<SyntaxKind> {
        let first = self.syntax.first_child()?;
        if first.kind() != COMBINATOR {
            return None;
        }
        first.first_token().map(|it| it.kind())
    }
}

impl CompoundSelector {
    pub fn has_nesting_selector(&self) -> bool {
        self.syntax.children().any(|it| it.kind() == NESTING_SELECTOR)
    }
}

impl Block {
    pub fn items(&self) -> AstChildren<Item> {
        support::children(&self.syntax)
    }

    pub fn declarations(&self) -> AstChildren<Declaration> {
        support::children(&self.syntax)
    }

    pub fn rule_sets(&self) -> AstChildren<RuleSet> {
        support::children(&self.syntax)
    }

    pub fn l_curly_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, L_CURLY)
    }

    pub fn r_curly_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, R_CURLY)
    }
}

impl Declaration {
    pub fn property_name(&self) -> Option<SmolStr> {
        support::token(&self.syntax, PROPERTY_NAME).map(|it| SmolStr::new(it.text()))
    }

    pub fn value(&self) -> Option<Value> {
        support::child(&self.syntax)
    }

    pub fn is_important(&self) -> bool {
        self.value().map_or(false, |value| {
            value.syntax.descendants().any(|it| it.kind() == IMPORTANT)
        })
    }

    /// The mixin named by `apply: $name;`.
    pub fn applied_mixin(&self) -> Option<SmolStr> {
        if self.property_name()? != "apply" {
            return None;
        }
        let value = self.value()?;
        support::token(value.syntax(), VARIABLE).map(|it| SmolStr::new(it.text()))
    }
}

impl Value {
    /// Value text without surrounding or embedded comments and with runs of
    /// whitespace collapsed.
    pub fn normalized(&self) -> String {
        let mut res = String::new();
        for token in self.syntax.descendants_with_tokens().filter_map(|it| it.into_token()) {
            match token.kind() {
                WHITESPACE | COMMENT => {
                    if !res.is_empty() && !res.ends_with(' ') {
                        res.push(' ');
                    }
                }
                _ => res.push_str(token.text()),
            }
        }
        res.truncate(res.trim_end().len());
        res
    }

    pub fn function_calls(&self) -> impl Iterator<Item = FunctionCall> {
        self.syntax.descendants().filter_map(FunctionCall::cast)
    }

    pub fn theme_tokens(&self) -> impl Iterator<Item = SyntaxToken> {
        self.syntax
            .descendants_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|it| it.kind() == THEME_TOKEN)
    }
}

impl FunctionCall {
    /// The function name, without the opening parenthesis.
    pub fn name(&self) -> Option<SmolStr> {
        let function = support::token(&self.syntax, FUNCTION)?;
        Some(SmolStr::new(function.text().trim_end_matches('(')))
    }
}

impl AtRule {
    /// The keyword, without the `@`.
    pub fn name(&self) -> Option<SmolStr> {
        let keyword = support::token(&self.syntax, AT_KEYWORD)?;
        Some(SmolStr::new(keyword.text().trim_start_matches('@')))
    }

    pub fn prelude(&self) -> Option<Prelude> {
        support::child(&self.syntax)
    }

    pub fn block(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    /// The unquoted path of `@import "path";`.
    pub fn import_path(&self) -> Option<SmolStr> {
        if self.name()? != "import" {
            return None;
        }
        let prelude = self.prelude()?;
        let path = prelude
            .syntax
            .descendants_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|it| matches!(it.kind(), STRING | URL))?;
        let text = path.text();
        let inner = match path.kind() {
            URL => text.strip_prefix("url(")?.strip_suffix(')')?.trim(),
            _ => text,
        };
        let unquoted = inner
            .strip_prefix('"')
            .and_then(|it| it.strip_suffix('"'))
            .or_else(|| inner.strip_prefix('\'').and_then(|it| it.strip_suffix('\'')))
            .unwrap_or(inner);
        Some(SmolStr::new(unquoted))
    }
}

impl VariableDecl {
    /// The variable name, `$` included.
    pub fn name(&self) -> Option<SmolStr> {
        support::token(&self.syntax, VARIABLE).map(|it| SmolStr::new(it.text()))
    }

    pub fn value(&self) -> Option<Value> {
        support::child(&self.syntax)
    }
}

impl MixinDef {
    /// The mixin name, `$` included.
    pub fn name(&self) -> Option<SmolStr> {
        support::token(&self.syntax, VARIABLE).map(|it| SmolStr::new(it.text()))
    }

    pub fn block(&self) -> Option<Block> {
        support::child(&self.syntax)
    }
}

impl PresetDirective {
    pub fn presets(&self) -> Vec<SmolStr> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|it| it.kind() == IDENT)
            .map(|it| SmolStr::new(it.text()))
            .collect()
    }
}

impl MediaShorthand {
    /// `screen` for `screen(md) { ... }`.
    pub fn name(&self) -> Option<SmolStr> {
        let function = support::token(&self.syntax, FUNCTION)?;
        Some(SmolStr::new(function.text().trim_end_matches('(')))
    }

    /// The argument text, such as `md`.
    pub fn argument(&self) -> String {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .skip_while(|it| it.kind() != FUNCTION)
            .skip(1)
            .take_while(|it| it.kind() != R_PAREN)
            .filter(|it| !it.kind().is_trivia())
            .map(|it| it.text().to_owned())
            .collect()
    }

    pub fn block(&self) -> Option<Block> {
        support::child(&self.syntax)
    }
}

#[cfg(test)]
mod tests {
    use super::{AstNode, Item, RuleSet};
    use crate::row_parser::parse;

    #[test]
    fn declarations_and_values() {
        let tree = parse(".foo { color: red; margin: 1px /* x */  2px !important }");
        let rule_set = tree.stylesheet().rule_sets().next().unwrap();
        assert_eq!(rule_set.selector_list().unwrap().to_string(), ".foo");
        let decls: Vec<_> = rule_set.block().unwrap().declarations().collect();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property_name().as_deref(), Some("color"));
        assert_eq!(decls[0].value().unwrap().normalized(), "red");
        assert!(!decls[0].is_important());
        assert_eq!(decls[1].value().unwrap().normalized(), "1px 2px !important");
        assert!(decls[1].is_important());
    }

    #[test]
    fn rcss_items() {
        let tree = parse(
            "% base-16 dark\n\
             @import \"theme.rcss\";\n\
             $accent: @blue-500;\n\
             $card { padding: 4px; }\n\
             .x { apply: $card; color: $accent; border { width: 1px; } dark { color: white; } \
             screen(md) { width: 50%; } }\n",
        );
        let stylesheet = tree.stylesheet();
        assert_eq!(stylesheet.presets(), ["base-16", "dark"]);

        let items: Vec<_> = stylesheet.items().collect();
        assert_eq!(items.len(), 5, "{}", tree.debug_dump());
        let Item::AtRule(import) = &items[1] else { panic!("{:?}", items[1]) };
        assert_eq!(import.import_path().as_deref(), Some("theme.rcss"));
        let Item::VariableDecl(accent) = &items[2] else { panic!("{:?}", items[2]) };
        assert_eq!(accent.name().as_deref(), Some("$accent"));
        assert_eq!(accent.value().unwrap().theme_tokens().count(), 1);
        let Item::MixinDef(card) = &items[3] else { panic!("{:?}", items[3]) };
        assert_eq!(card.name().as_deref(), Some("$card"));
        assert_eq!(card.block().unwrap().declarations().count(), 1);

        let Item::RuleSet(x) = &items[4] else { panic!("{:?}", items[4]) };
        assert!(!x.is_property_block());
        let block = x.block().unwrap();
        let apply = block.declarations().next().unwrap();
        assert_eq!(apply.applied_mixin().as_deref(), Some("$card"));
        let nested: Vec<RuleSet> = block.rule_sets().collect();
        assert_eq!(nested.len(), 2);
        assert!(nested[0].is_property_block());
        assert!(!nested[0].is_theme_variant());
        assert!(nested[1].is_theme_variant());
        let shorthand = block
            .items()
            .find_map(|it| match it {
                Item::MediaShorthand(it) => Some(it),
                _ => None,
            })
            .unwrap();
        assert_eq!(shorthand.name().as_deref(), Some("screen"));
        assert_eq!(shorthand.argument(), "md");
        assert!(Item::can_cast(shorthand.syntax().kind()));
    }

    #[test]
    fn top_level_border_is_a_plain_rule() {
        let tree = parse("border { width: 1px; }");
        let rule_set = tree.stylesheet().rule_sets().next().unwrap();
        assert!(!rule_set.is_property_block());
    }

    #[test]
    fn accessors_tolerate_broken_input() {
        let tree = parse("@import ; .a { : red; } $x: ;");
        for item in tree.stylesheet().items() {
            if let Item::AtRule(at_rule) = item {
                assert_eq!(at_rule.import_path(), None);
            }
        }
    }
}
