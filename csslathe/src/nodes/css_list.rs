use super::at_rule::{Charset, Import, Namespace};
use super::comment::{Comment, Commentable};
use super::rule_set::{DeclarationBlock, RuleContainer, RuleSet};
use super::selector::{Selector, SpecificityFilter};
use super::AtRule;
use crate::parser::css_error::{OutputError, ParseError};
use crate::render::{OutputFormat, Printer};
use crate::value::{Size, Value};

/// Anything a list can hold
#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    Charset(Charset),
    Import(Import),
    Namespace(Namespace),
    RuleSet(RuleSet),
    List(CssList),
}

impl CssItem {
    pub fn line_no(&self) -> usize {
        return match self {
            CssItem::Charset(c) => c.line_no(),
            CssItem::Import(i) => i.line_no(),
            CssItem::Namespace(n) => n.line_no(),
            CssItem::RuleSet(r) => r.line_no(),
            CssItem::List(l) => l.line_no(),
        };
    }

    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        return match self {
            CssItem::Charset(c) => Ok(c.render(printer)),
            CssItem::Import(i) => Ok(i.render(printer)),
            CssItem::Namespace(n) => Ok(n.render(printer)),
            CssItem::RuleSet(r) => r.render(printer),
            CssItem::List(l) => l.render(printer),
        };
    }

    /// Every item except a plain declaration block is an at-rule.
    pub fn is_at_rule(&self) -> bool {
        return !matches!(self, CssItem::RuleSet(RuleSet::DeclarationBlock(_)));
    }

    pub fn at_rule_name(&self) -> Option<&str> {
        return match self {
            CssItem::Charset(c) => Some(c.at_rule_name()),
            CssItem::Import(i) => Some(i.at_rule_name()),
            CssItem::Namespace(n) => Some(n.at_rule_name()),
            CssItem::RuleSet(RuleSet::AtRuleSet(s)) => Some(s.at_rule_name()),
            CssItem::RuleSet(RuleSet::DeclarationBlock(_)) => None,
            CssItem::List(CssList::AtRuleBlockList(l)) => Some(l.at_rule_name()),
            CssItem::List(CssList::KeyFrame(k)) => Some(k.at_rule_name()),
        };
    }

    pub fn at_rule_args(&self) -> Option<String> {
        return match self {
            CssItem::Charset(c) => Some(c.at_rule_args()),
            CssItem::Import(i) => Some(i.at_rule_args()),
            CssItem::Namespace(n) => Some(n.at_rule_args()),
            CssItem::RuleSet(RuleSet::AtRuleSet(s)) => Some(s.at_rule_args()),
            CssItem::RuleSet(RuleSet::DeclarationBlock(_)) => None,
            CssItem::List(CssList::AtRuleBlockList(l)) => Some(l.at_rule_args()),
            CssItem::List(CssList::KeyFrame(k)) => Some(k.at_rule_args()),
        };
    }

    pub fn as_rule_set(&self) -> Option<&RuleSet> {
        return match self {
            CssItem::RuleSet(r) => Some(r),
            _ => None,
        };
    }

    pub fn as_declaration_block(&self) -> Option<&DeclarationBlock> {
        return self.as_rule_set().and_then(RuleSet::as_declaration_block);
    }

    pub fn as_list(&self) -> Option<&CssList> {
        return match self {
            CssItem::List(l) => Some(l),
            _ => None,
        };
    }
}

impl From<DeclarationBlock> for CssItem {
    fn from(block: DeclarationBlock) -> Self {
        return CssItem::RuleSet(RuleSet::DeclarationBlock(block));
    }
}

impl Commentable for CssItem {
    fn comments(&self) -> &[Comment] {
        return match self {
            CssItem::Charset(c) => c.comments(),
            CssItem::Import(i) => i.comments(),
            CssItem::Namespace(n) => n.comments(),
            CssItem::RuleSet(r) => r.comments(),
            CssItem::List(l) => l.comments(),
        };
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return match self {
            CssItem::Charset(c) => c.comments_mut(),
            CssItem::Import(i) => i.comments_mut(),
            CssItem::Namespace(n) => n.comments_mut(),
            CssItem::RuleSet(r) => r.comments_mut(),
            CssItem::List(l) => l.comments_mut(),
        };
    }
}

/// Ordered children shared by the document and the block at-rules.
/// Items are located by structural equality; the first equal child is the target.
pub trait ListContainer {
    fn content_list(&self) -> &Vec<CssItem>;
    fn content_list_mut(&mut self) -> &mut Vec<CssItem>;
    fn line_no(&self) -> usize;

    fn contents(&self) -> &[CssItem] {
        return self.content_list();
    }

    fn append(&mut self, item: CssItem) {
        self.content_list_mut().push(item);
    }

    fn prepend(&mut self, item: CssItem) {
        self.content_list_mut().insert(0, item);
    }

    /// Replaces `length` items from `offset` (all remaining when `None`)
    /// with `replacement` and returns the removed ones.
    fn splice(&mut self, offset: usize, length: Option<usize>, replacement: Vec<CssItem>) -> Vec<CssItem> {
        let contents = self.content_list_mut();
        let start = offset.min(contents.len());
        let end = match length {
            Some(length) => (start + length).min(contents.len()),
            None => contents.len(),
        };
        return contents.splice(start..end, replacement).collect();
    }

    /// Index of the first child equal to `item`. Children are compared by
    /// value, so of two identical children only the first is ever found;
    /// use the `_at` methods to address a later one.
    fn position(&self, item: &CssItem) -> Option<usize> {
        return self.content_list().iter().position(|c| c == item);
    }

    /// Inserts right before the first child equal to `sibling` (see
    /// `position`), or appends when there is none.
    fn insert(&mut self, item: CssItem, sibling: &CssItem) {
        let index = self.position(sibling);
        let contents = self.content_list_mut();
        match index {
            Some(index) => contents.insert(index, item),
            None => contents.push(item),
        }
    }

    fn insert_at(&mut self, index: usize, item: CssItem) {
        let contents = self.content_list_mut();
        let index = index.min(contents.len());
        contents.insert(index, item);
    }

    /// Removes the first child equal to `item`.
    fn remove(&mut self, item: &CssItem) -> bool {
        if let Some(index) = self.position(item) {
            self.content_list_mut().remove(index);
            return true;
        }
        return false;
    }

    fn remove_at(&mut self, index: usize) -> Option<CssItem> {
        let contents = self.content_list_mut();
        if index < contents.len() {
            return Some(contents.remove(index));
        }
        return None;
    }

    /// Swaps the first child equal to `old` for `new_items`, in place.
    fn replace(&mut self, old: &CssItem, new_items: Vec<CssItem>) -> bool {
        if let Some(index) = self.position(old) {
            self.content_list_mut().splice(index..index + 1, new_items);
            return true;
        }
        return false;
    }

    fn set_contents(&mut self, contents: Vec<CssItem>) {
        *self.content_list_mut() = contents;
    }

    /// Removes direct child declaration blocks with exactly these selectors,
    /// the first one or all of them.
    fn remove_declaration_block_by_selector(&mut self, selectors: &[Selector], remove_all: bool) {
        let contents = self.content_list_mut();
        let mut index = 0;
        while index < contents.len() {
            let matches = contents[index]
                .as_declaration_block()
                .is_some_and(|block| block.selectors() == selectors);
            if matches {
                contents.remove(index);
                if !remove_all {
                    return;
                }
            } else {
                index += 1;
            }
        }
    }
}

/// Children one level below `printer`, or at its level for the root.
fn render_contents(items: &[CssItem], printer: &Printer, is_root: bool) -> Result<String, OutputError> {
    let next = if is_root { *printer } else { printer.next_level() };
    let mut result = String::new();
    for (i, item) in items.iter().enumerate() {
        if i == 0 {
            result.push_str(&next.space_before_blocks());
        } else {
            result.push_str(&next.space_between_blocks());
        }
        result.push_str(&item.render(&next)?);
    }
    if !items.is_empty() {
        result.push_str(&printer.space_after_blocks());
    }
    return Ok(result);
}

fn collect_rule_sets<'a>(items: &'a [CssItem], out: &mut Vec<&'a RuleSet>) {
    for item in items {
        match item {
            CssItem::RuleSet(rule_set) => out.push(rule_set),
            CssItem::List(CssList::AtRuleBlockList(list)) => collect_rule_sets(&list.contents, out),
            _ => {}
        }
    }
}

fn collect_rule_sets_mut<'a>(items: &'a mut [CssItem], out: &mut Vec<&'a mut RuleSet>) {
    for item in items {
        match item {
            CssItem::RuleSet(rule_set) => out.push(rule_set),
            CssItem::List(CssList::AtRuleBlockList(list)) => collect_rule_sets_mut(&mut list.contents, out),
            _ => {}
        }
    }
}

/// Recursive queries over a list and its nested block lists. Keyframe
/// contents are not descended into.
pub trait BlockList: ListContainer {
    fn all_rule_sets(&self) -> Vec<&RuleSet> {
        let mut out = Vec::new();
        collect_rule_sets(self.content_list(), &mut out);
        return out;
    }

    fn all_rule_sets_mut(&mut self) -> Vec<&mut RuleSet> {
        let mut out = Vec::new();
        collect_rule_sets_mut(self.content_list_mut(), &mut out);
        return out;
    }

    fn all_declaration_blocks(&self) -> Vec<&DeclarationBlock> {
        return self
            .all_rule_sets()
            .into_iter()
            .filter_map(RuleSet::as_declaration_block)
            .collect();
    }

    fn all_declaration_blocks_mut(&mut self) -> Vec<&mut DeclarationBlock> {
        return self
            .all_rule_sets_mut()
            .into_iter()
            .filter_map(RuleSet::as_declaration_block_mut)
            .collect();
    }

    /// Leaf values of every rule matching `property_filter` (all rules
    /// when `None`). Function arguments are searched when asked to.
    fn all_values(&self, property_filter: Option<&str>, search_in_function_arguments: bool) -> Vec<&Value> {
        let mut out = Vec::new();
        for rule_set in self.all_rule_sets() {
            for rule in rule_set.rules(property_filter) {
                if let Some(value) = rule.value() {
                    value.collect_values(search_in_function_arguments, &mut out);
                }
            }
        }
        return out;
    }

    fn all_values_mut(&mut self, property_filter: Option<&str>, search_in_function_arguments: bool) -> Vec<&mut Value> {
        let mut out = Vec::new();
        for rule_set in self.all_rule_sets_mut() {
            for rule in rule_set.rules_mut(property_filter) {
                if let Some(value) = rule.value_mut() {
                    value.collect_values_mut(search_in_function_arguments, &mut out);
                }
            }
        }
        return out;
    }

    fn all_sizes_mut(&mut self, search_in_function_arguments: bool) -> Vec<&mut Size> {
        return self
            .all_values_mut(None, search_in_function_arguments)
            .into_iter()
            .filter_map(Value::as_size_mut)
            .collect();
    }

    fn all_selectors(&self) -> Vec<&Selector> {
        return self
            .all_declaration_blocks()
            .into_iter()
            .flat_map(|block| block.selectors())
            .collect();
    }

    /// Selectors whose specificity satisfies `expression`, e.g. `>= 100`.
    fn selectors_by_specificity(&self, expression: &str) -> Result<Vec<&Selector>, ParseError> {
        let filter: SpecificityFilter = expression.parse()?;
        return Ok(self.selectors_matching(filter));
    }

    fn selectors_matching(&self, filter: SpecificityFilter) -> Vec<&Selector> {
        return self
            .all_selectors()
            .into_iter()
            .filter(|s| filter.matches(s.specificity()))
            .collect();
    }
}

/// The root of a parsed stylesheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    contents: Vec<CssItem>,
    comments: Vec<Comment>,
}

impl Document {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Renders in the default format.
    pub fn render(&self) -> Result<String, OutputError> {
        return self.render_with(&OutputFormat::default());
    }

    pub fn render_with(&self, format: &OutputFormat) -> Result<String, OutputError> {
        return render_contents(&self.contents, &format.printer(), true);
    }

    pub fn expand_shorthands(&mut self) {
        for block in self.all_declaration_blocks_mut() {
            block.expand_shorthands();
        }
    }

    pub fn create_shorthands(&mut self) {
        for block in self.all_declaration_blocks_mut() {
            block.create_shorthands();
        }
    }
}

impl ListContainer for Document {
    fn content_list(&self) -> &Vec<CssItem> {
        return &self.contents;
    }

    fn content_list_mut(&mut self) -> &mut Vec<CssItem> {
        return &mut self.contents;
    }

    fn line_no(&self) -> usize {
        return 1;
    }
}

impl BlockList for Document {}

impl Commentable for Document {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

/// An at-rule whose block holds further statements, `@media`, `@supports`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct AtRuleBlockList {
    name: String,
    args: String,
    contents: Vec<CssItem>,
    line_no: usize,
    comments: Vec<Comment>,
}

impl AtRuleBlockList {
    pub fn new(name: impl Into<String>, args: impl Into<String>, line_no: usize) -> Self {
        return Self {
            name: name.into(),
            args: args.into(),
            contents: Vec::new(),
            line_no,
            comments: Vec::new(),
        };
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
        result.push_str(&render_contents(&self.contents, printer, false)?);
        result.push('}');
        return Ok(result);
    }
}

impl AtRule for AtRuleBlockList {
    fn at_rule_name(&self) -> &str {
        return &self.name;
    }

    fn at_rule_args(&self) -> String {
        return self.args.clone();
    }
}

impl ListContainer for AtRuleBlockList {
    fn content_list(&self) -> &Vec<CssItem> {
        return &self.contents;
    }

    fn content_list_mut(&mut self) -> &mut Vec<CssItem> {
        return &mut self.contents;
    }

    fn line_no(&self) -> usize {
        return self.line_no;
    }
}

impl BlockList for AtRuleBlockList {}

/// `@keyframes name { from {...} 50% {...} }`, vendor prefix kept
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
    vendor_key_frame: String,
    animation_name: String,
    contents: Vec<CssItem>,
    line_no: usize,
    comments: Vec<Comment>,
}

impl KeyFrame {
    pub fn new(vendor_key_frame: impl Into<String>, animation_name: impl Into<String>, line_no: usize) -> Self {
        return Self {
            vendor_key_frame: vendor_key_frame.into(),
            animation_name: animation_name.into(),
            contents: Vec::new(),
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn vendor_key_frame(&self) -> &str {
        return &self.vendor_key_frame;
    }

    pub fn animation_name(&self) -> &str {
        return &self.animation_name;
    }

    pub fn set_animation_name(&mut self, name: impl Into<String>) {
        self.animation_name = name.into();
    }

    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        let mut result = printer.comments(&self.comments);
        result.push_str(&format!(
            "@{} {}{}{{",
            self.vendor_key_frame,
            self.animation_name,
            printer.space_before_opening_brace()
        ));
        result.push_str(&render_contents(&self.contents, printer, false)?);
        result.push('}');
        return Ok(result);
    }
}

impl AtRule for KeyFrame {
    fn at_rule_name(&self) -> &str {
        return &self.vendor_key_frame;
    }

    fn at_rule_args(&self) -> String {
        return self.animation_name.clone();
    }
}

impl ListContainer for KeyFrame {
    fn content_list(&self) -> &Vec<CssItem> {
        return &self.contents;
    }

    fn content_list_mut(&mut self) -> &mut Vec<CssItem> {
        return &mut self.contents;
    }

    fn line_no(&self) -> usize {
        return self.line_no;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssList {
    AtRuleBlockList(AtRuleBlockList),
    KeyFrame(KeyFrame),
}

impl CssList {
    pub fn render(&self, printer: &Printer) -> Result<String, OutputError> {
        return match self {
            CssList::AtRuleBlockList(l) => l.render(printer),
            CssList::KeyFrame(k) => k.render(printer),
        };
    }

    pub fn as_container(&self) -> &dyn ListContainer {
        return match self {
            CssList::AtRuleBlockList(l) => l,
            CssList::KeyFrame(k) => k,
        };
    }

    pub fn as_container_mut(&mut self) -> &mut dyn ListContainer {
        return match self {
            CssList::AtRuleBlockList(l) => l,
            CssList::KeyFrame(k) => k,
        };
    }

    pub fn line_no(&self) -> usize {
        return self.as_container().line_no();
    }
}

impl Commentable for CssList {
    fn comments(&self) -> &[Comment] {
        return match self {
            CssList::AtRuleBlockList(l) => l.comments(),
            CssList::KeyFrame(k) => k.comments(),
        };
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return match self {
            CssList::AtRuleBlockList(l) => l.comments_mut(),
            CssList::KeyFrame(k) => k.comments_mut(),
        };
    }
}

impl Commentable for AtRuleBlockList {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

impl Commentable for KeyFrame {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

#[cfg(test)]
mod test_css_list {
    use super::*;
    use crate::nodes::Rule;

    fn block(selector: &str, name: &str, value: &str) -> CssItem {
        let mut block = DeclarationBlock::new(1);
        block.set_selectors(selector, false).unwrap();
        block.add_rule(Rule::new(name, 1).with_value(Value::keyword(value, 1)), None);
        return block.into();
    }

    fn selector_texts(items: &[CssItem]) -> Vec<String> {
        return items
            .iter()
            .map(|i| i.as_declaration_block().map_or(String::new(), |b| b.selectors()[0].to_string()))
            .collect();
    }

    #[test]
    fn insertion_keeps_order() {
        let mut doc = Document::new();
        let thing = block(".thing", "left", "10px");
        let stuff = block(".stuff", "margin", "1px");
        doc.append(thing.clone());
        doc.append(stuff.clone());

        doc.insert(block(".first", "a", "b"), &thing);
        doc.insert(block(".between", "a", "b"), &stuff);
        doc.insert(block(".forever-alone", "a", "b"), &block(".not-found", "a", "b"));
        assert_eq!(
            selector_texts(doc.contents()),
            [".first", ".thing", ".between", ".stuff", ".forever-alone"]
        );

        assert!(doc.remove(&thing));
        assert!(!doc.remove(&thing));
        assert!(doc.replace(&stuff, vec![block(".x", "a", "b"), block(".y", "a", "b")]));
        assert_eq!(selector_texts(doc.contents()), [".first", ".between", ".x", ".y", ".forever-alone"]);

        let removed = doc.splice(1, Some(2), Vec::new());
        assert_eq!(removed.len(), 2);
        doc.prepend(block(".zero", "a", "b"));
        doc.insert_at(100, block(".end", "a", "b"));
        assert_eq!(selector_texts(doc.contents()), [".zero", ".first", ".y", ".forever-alone", ".end"]);
        assert!(doc.remove_at(4).is_some());
        assert!(doc.remove_at(4).is_none());
    }

    #[test]
    fn nested_render_indents() {
        let mut media = AtRuleBlockList::new("media", "screen", 1);
        media.append(block("html", "some", "val2"));
        media.append(block("body", "other", "yes"));
        let mut doc = Document::new();
        doc.append(block("html", "some", "val1"));
        doc.append(CssItem::List(CssList::AtRuleBlockList(media)));
        assert_eq!(
            doc.render().unwrap(),
            "html {some: val1;}\n@media screen {html {some: val2;}\n\tbody {other: yes;}}"
        );

        let html = vec![Selector::new("html")];
        doc.remove_declaration_block_by_selector(&html, true);
        assert_eq!(doc.contents().len(), 1);
        assert_eq!(doc.all_declaration_blocks().len(), 2);
        assert_eq!(doc.contents()[0].at_rule_name(), Some("media"));
        assert_eq!(doc.contents()[0].at_rule_args().as_deref(), Some("screen"));
    }

    #[test]
    fn keyframes_are_not_descended() {
        let mut frames = KeyFrame::new("keyframes", "mymove", 1);
        let mut from = DeclarationBlock::new(1);
        from.set_selectors("from", true).unwrap();
        frames.append(from.into());
        let mut doc = Document::new();
        doc.append(CssItem::List(CssList::KeyFrame(frames)));
        doc.append(block("#a", "top", "0"));
        assert_eq!(doc.all_declaration_blocks().len(), 1);
        assert_eq!(doc.all_selectors().len(), 1);
        assert_eq!(doc.render().unwrap(), "@keyframes mymove {from {}}\n#a {top: 0;}");
        assert!(doc.contents()[0].is_at_rule());
        assert!(!doc.contents()[1].is_at_rule());
    }

    #[test]
    fn missing_selector_fails_render() {
        let mut doc = Document::new();
        doc.append(DeclarationBlock::new(7).into());
        let err = doc.render().unwrap_err();
        assert_eq!(err.line, 7);
    }
}
