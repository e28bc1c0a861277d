use std::collections::HashMap;

use itertools::Itertools;

use super::comment::{Comment, Commentable};
use super::rule::Rule;
use super::selector::Selector;
use super::AtRule;
use crate::parser::css_error::{MatchType, OutputError, ParseError};
use crate::render::Printer;

/// `pattern` matches `name` exactly, or, when it ends in `-`, matches the
/// bare name and every name it prefixes: `font-` matches `font` and `font-size`.
pub fn rule_matches(name: &str, pattern: &str) -> bool {
    if name == pattern {
        return true;
    }
    return match pattern.strip_suffix('-') {
        Some(bare) => name == bare || name.starts_with(pattern),
        None => false,
    };
}

/// Rule storage shared by declaration blocks and at-rule sets.
/// Rules keep insertion order and duplicate names are kept.
pub trait RuleContainer {
    fn rule_list(&self) -> &Vec<Rule>;
    fn rule_list_mut(&mut self) -> &mut Vec<Rule>;

    /// Inserts before `before` when it is present, else appends.
    fn add_rule(&mut self, rule: Rule, before: Option<&Rule>) {
        let rules = self.rule_list_mut();
        match before.and_then(|sibling| rules.iter().position(|r| r == sibling)) {
            Some(index) => rules.insert(index, rule),
            None => rules.push(rule),
        }
    }

    /// All rules, or those matching `pattern` (see `rule_matches`).
    fn rules(&self, pattern: Option<&str>) -> Vec<&Rule> {
        return self
            .rule_list()
            .iter()
            .filter(|r| pattern.map_or(true, |p| rule_matches(r.name(), p)))
            .collect();
    }

    fn rules_mut(&mut self, pattern: Option<&str>) -> Vec<&mut Rule> {
        return self
            .rule_list_mut()
            .iter_mut()
            .filter(|r| pattern.map_or(true, |p| rule_matches(r.name(), p)))
            .collect();
    }

    /// Matching rules keyed by name; for repeated names the last one wins.
    fn rules_assoc(&self, pattern: Option<&str>) -> HashMap<String, &Rule> {
        let mut result = HashMap::new();
        for rule in self.rules(pattern) {
            result.insert(rule.name().to_owned(), rule);
        }
        return result;
    }

    /// Removes the first rule equal to `rule`.
    fn remove_rule(&mut self, rule: &Rule) -> bool {
        let rules = self.rule_list_mut();
        if let Some(index) = rules.iter().position(|r| r == rule) {
            rules.remove(index);
            return true;
        }
        return false;
    }

    /// Removes every rule matching `pattern`.
    fn remove_rules(&mut self, pattern: &str) {
        self.rule_list_mut().retain(|r| !rule_matches(r.name(), pattern));
    }

    fn remove_all_rules(&mut self) {
        self.rule_list_mut().clear();
    }

    fn set_rules(&mut self, rules: Vec<Rule>) {
        *self.rule_list_mut() = rules;
    }
}

/// Rules one level deeper than `printer`, wrapped in the rule spacing.
fn render_rules(rules: &[Rule], printer: &Printer) -> String {
    let next = printer.next_level();
    let mut result = String::new();
    for (i, rule) in rules.iter().enumerate() {
        if i == 0 {
            result.push_str(&next.space_before_rules());
        } else {
            result.push_str(&next.space_between_rules());
        }
        result.push_str(&rule.render(&next));
    }
    if !rules.is_empty() {
        result.push_str(&printer.space_after_rules());
    }
    return printer.remove_last_semicolon(result);
}

/// Splits a selector list on commas outside brackets, parentheses and strings.
fn split_selectors(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    return parts;
}

/// Selectors with a block of rules, `a, b { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationBlock {
    selectors: Vec<Selector>,
    rules: Vec<Rule>,
    line_no: usize,
    comments: Vec<Comment>,
}

impl DeclarationBlock {
    pub fn new(line_no: usize) -> Self {
        return Self {
            selectors: Vec::new(),
            rules: Vec::new(),
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn selectors(&self) -> &[Selector] {
        return &self.selectors;
    }

    pub fn selectors_mut(&mut self) -> &mut Vec<Selector> {
        return &mut self.selectors;
    }

    /// Replaces the selectors with the comma-separated parts of `text`.
    /// Inside keyframes, percentages are accepted as well.
    pub fn set_selectors(&mut self, text: &str, in_keyframe: bool) -> Result<(), ParseError> {
        let mut selectors = Vec::new();
        for part in split_selectors(text) {
            let part = part.trim();
            let valid = if in_keyframe {
                Selector::is_valid_keyframe(part)
            } else {
                Selector::is_valid(part)
            };
            if !valid {
                return Err(ParseError::unexpected(
                    "Selector did not match the selector pattern.",
                    part,
                    MatchType::Custom,
                    self.line_no,
                ));
            }
            selectors.push(Selector::new(part));
        }
        self.selectors = selectors;
        return Ok(());
    }

    pub fn set_selector_list(&mut self, selectors: Vec<Selector>) {
        self.selectors = selectors;
    }

    /// Removes the selector with this exact text.
    pub fn remove_selector(&mut self, text: &str) -> bool {
        let before = self.selectors.len();
        self.selectors.retain(|s| s.text() != text);
        return self.selectors.len() != before;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        if self.selectors.is_empty() {
            return Err(OutputError::new(
                "Attempt to print declaration block with missing selector",
                self.line_no,
            ));
        }
        let separator = format!(",{}", printer.space_after_selector_separator());
        let mut result = printer.comments(&self.comments);
        result.push_str(&self.selectors.iter().map(Selector::text).join(&separator));
        result.push_str(printer.space_before_opening_brace());
        result.push('{');
        result.push_str(&render_rules(&self.rules, printer));
        result.push('}');
        return Ok(result);
    }
}

impl RuleContainer for DeclarationBlock {
    fn rule_list(&self) -> &Vec<Rule> {
        return &self.rules;
    }

    fn rule_list_mut(&mut self) -> &mut Vec<Rule> {
        return &mut self.rules;
    }
}

impl Commentable for DeclarationBlock {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

/// An at-rule whose block holds declarations, `@font-face`, `@page`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct AtRuleSet {
    name: String,
    args: String,
    rules: Vec<Rule>,
    line_no: usize,
    comments: Vec<Comment>,
}

impl AtRuleSet {
    pub fn new(name: impl Into<String>, args: impl Into<String>, line_no: usize) -> Self {
        return Self {
            name: name.into(),
            args: args.into(),
            rules: Vec::new(),
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        let mut result = printer.comments(&self.comments);
        result.push('@');
        result.push_str(&self.name);
        if !self.args.is_empty() {
            result.push(' ');
            result.push_str(&self.args);
        }
        result.push_str(printer.space_before_opening_brace());
        result.push('{');
        result.push_str(&render_rules(&self.rules, printer));
        result.push('}');
        return Ok(result);
    }
}

impl AtRule for AtRuleSet {
    fn at_rule_name(&self) -> &str {
        return &self.name;
    }

    fn at_rule_args(&self) -> String {
        return self.args.clone();
    }
}

impl RuleContainer for AtRuleSet {
    fn rule_list(&self) -> &Vec<Rule> {
        return &self.rules;
    }

    fn rule_list_mut(&mut self) -> &mut Vec<Rule> {
        return &mut self.rules;
    }
}

impl Commentable for AtRuleSet {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleSet {
    DeclarationBlock(DeclarationBlock),
    AtRuleSet(AtRuleSet),
}

impl RuleSet {
    pub fn line_no(&self) -> usize {
        return match self {
            RuleSet::DeclarationBlock(b) => b.line_no(),
            RuleSet::AtRuleSet(s) => s.line_no(),
        };
    }

    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        return match self {
            RuleSet::DeclarationBlock(b) => b.render(printer),
            RuleSet::AtRuleSet(s) => s.render(printer),
        };
    }

    pub fn as_declaration_block(&self) -> Option<&DeclarationBlock> {
        return match self {
            RuleSet::DeclarationBlock(b) => Some(b),
            RuleSet::AtRuleSet(_) => None,
        };
    }

    pub fn as_declaration_block_mut(&mut self) -> Option<&mut DeclarationBlock> {
        return match self {
            RuleSet::DeclarationBlock(b) => Some(b),
            RuleSet::AtRuleSet(_) => None,
        };
    }
}

impl RuleContainer for RuleSet {
    fn rule_list(&self) -> &Vec<Rule> {
        return match self {
            RuleSet::DeclarationBlock(b) => b.rule_list(),
            RuleSet::AtRuleSet(s) => s.rule_list(),
        };
    }

    fn rule_list_mut(&mut self) -> &mut Vec<Rule> {
        return match self {
            RuleSet::DeclarationBlock(b) => b.rule_list_mut(),
            RuleSet::AtRuleSet(s) => s.rule_list_mut(),
        };
    }
}

impl Commentable for RuleSet {
    fn comments(&self) -> &[Comment] {
        return match self {
            RuleSet::DeclarationBlock(b) => b.comments(),
            RuleSet::AtRuleSet(s) => s.comments(),
        };
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return match self {
            RuleSet::DeclarationBlock(b) => b.comments_mut(),
            RuleSet::AtRuleSet(s) => s.comments_mut(),
        };
    }
}

#[cfg(test)]
mod test_rule_set {
    use super::*;
    use crate::render::OutputFormat;
    use crate::value::Value;

    fn rule(name: &str, value: &str) -> Rule {
        return Rule::new(name, 1).with_value(Value::keyword(value, 1));
    }

    fn block() -> DeclarationBlock {
        let mut block = DeclarationBlock::new(1);
        block.set_selectors("html, body", false).unwrap();
        block.set_rules(vec![
            rule("font-size", "10px"),
            rule("font", "x"),
            rule("background-color", "green"),
            rule("background-color", "red"),
            rule("fontish", "y"),
        ]);
        return block;
    }

    #[test]
    fn patterns() {
        assert!(rule_matches("font", "font-"));
        assert!(rule_matches("font-size", "font-"));
        assert!(!rule_matches("fontish", "font-"));
        assert!(!rule_matches("font-size", "font"));

        let block = block();
        assert_eq!(block.rules(Some("font-")).len(), 2);
        assert_eq!(block.rules(Some("background-")).len(), 2);
        assert_eq!(block.rules(None).len(), 5);
        let assoc = block.rules_assoc(Some("background-"));
        assert_eq!(assoc.len(), 1);
        assert_eq!(assoc["background-color"].value().and_then(Value::as_keyword), Some("red"));
    }

    #[test]
    fn add_and_remove() {
        let mut block = block();
        let sibling = rule("font", "x");
        block.add_rule(rule("color", "blue"), Some(&sibling));
        assert_eq!(block.rules(None)[1].name(), "color");
        block.add_rule(rule("z-index", "1"), Some(&rule("missing", "0")));
        assert_eq!(block.rules(None).last().map(|r| r.name()), Some("z-index"));

        assert!(block.remove_rule(&rule("background-color", "green")));
        assert!(!block.remove_rule(&rule("background-color", "green")));
        block.remove_rules("font-");
        let names: Vec<&str> = block.rules(None).iter().map(|r| r.name()).collect();
        assert_eq!(names, ["color", "background-color", "fontish", "z-index"]);
        block.remove_all_rules();
        assert!(block.rules(None).is_empty());
    }

    #[test]
    fn selectors() {
        let mut block = DeclarationBlock::new(3);
        block.set_selectors(".a:not(.b), [data-x=\"1,2\"] ,  .d", false).unwrap();
        let texts: Vec<&str> = block.selectors().iter().map(Selector::text).collect();
        assert_eq!(texts, [".a:not(.b)", "[data-x=\"1,2\"]", ".d"]);

        let err = block.set_selectors("body;", false).unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(block.set_selectors("50%", false).is_err());
        assert!(block.set_selectors("0%, 50%", true).is_ok());

        assert!(block.remove_selector("0%"));
        assert!(!block.remove_selector("0%"));
        assert!(block.remove_selector("50%"));
        let format = OutputFormat::default();
        assert!(block.render(&format.printer()).is_err());
    }

    #[test]
    fn render_blocks() {
        let format = OutputFormat::default();
        let block = block();
        assert_eq!(
            block.render(&format.printer()).unwrap(),
            "html, body {font-size: 10px;font: x;background-color: green;background-color: red;fontish: y;}"
        );

        let mut page = AtRuleSet::new("page", ":pseudo-class", 1);
        page.add_rule(rule("margin", "2in"), None);
        assert_eq!(page.render(&format.printer()).unwrap(), "@page :pseudo-class {margin: 2in;}");
        assert_eq!(page.at_rule_args(), ":pseudo-class");

        let pretty = OutputFormat::pretty();
        assert_eq!(page.render(&pretty.printer()).unwrap(), "@page :pseudo-class {\n\tmargin: 2in;\n}");

        let mut compact = OutputFormat::compact();
        compact.semicolon_after_last_rule = false;
        assert_eq!(page.render(&compact.printer()).unwrap(), "@page :pseudo-class{margin:2in}");
    }
}
