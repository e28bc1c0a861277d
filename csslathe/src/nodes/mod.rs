//! The document tree: lists, rule sets, rules and the statements that
//! sit between them. Every node renders itself through a `Printer`.

mod at_rule;
mod comment;
mod css_list;
mod rule;
mod rule_set;
mod selector;
mod shorthand;

pub use at_rule::{Charset, Import, Namespace};
pub use comment::{Comment, Commentable};
pub use css_list::{AtRuleBlockList, BlockList, CssItem, CssList, Document, KeyFrame, ListContainer};
pub use rule::Rule;
pub use rule_set::{rule_matches, AtRuleSet, DeclarationBlock, RuleContainer, RuleSet};
pub use selector::{Comparison, Selector, SpecificityFilter};

/// Nodes introduced by an `@` keyword
pub trait AtRule {
    /// Name without the `@`, e.g. `media` or `-webkit-keyframes`
    fn at_rule_name(&self) -> &str;
    fn at_rule_args(&self) -> String;
}
