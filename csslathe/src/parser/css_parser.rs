use tracing::{debug, trace};

use crate::config::Settings;
use crate::nodes::{
    AtRuleBlockList, AtRuleSet, Charset, Comment, Commentable, CssItem, CssList, DeclarationBlock,
    Document, Import, KeyFrame, ListContainer, Namespace, Rule, RuleContainer, RuleSet,
};
use crate::parser::css_error::{MatchType, ParseError};
use crate::tokenizer::{Cursor, UntilEnd};
use crate::value::Value;

/// At-rules whose block holds statements rather than declarations.
/// Vendor prefixed spellings are accepted too.
const BLOCK_RULES: &[&str] = &[
    "media",
    "document",
    "supports",
    "region-style",
    "font-feature-values",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Root,
    Block,
    KeyFrame,
}

enum ItemOutcome {
    Item(CssItem),
    /// dropped while recovering, nothing to add
    Skipped,
    /// a `}` closes the enclosing block
    EndOfList,
}

/// Recursive descent parser for whole stylesheets.
///
/// Every statement parser starts at the first character of its construct and
/// leaves the cursor right after it. Whitespace and comments are consumed
/// explicitly so they can be attached to the node that follows them.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, settings: Settings) -> Self {
        return Self {
            cursor: Cursor::new(text, settings),
        };
    }

    pub fn settings(&self) -> &Settings {
        return self.cursor.settings();
    }

    pub(crate) fn lenient(&self) -> bool {
        return self.cursor.settings().lenient_parsing;
    }

    pub fn line(&self) -> usize {
        return self.cursor.current_line();
    }

    pub fn is_eof(&self) -> bool {
        return self.cursor.is_eof();
    }

    /// The unparsed input.
    pub fn rest(&self) -> &'a str {
        return self.cursor.rest();
    }

    #[tracing::instrument(skip_all)]
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut document = Document::new();
        let trailing = self.parse_list(&mut document, ListKind::Root)?;
        document.add_comments(trailing);
        debug!(items = document.contents().len(), "parsed document");
        return Ok(document);
    }

    /// Fills `list` until its closing `}` (left in the input) or the end of
    /// input, returning the comments after the last item.
    fn parse_list<L: ListContainer>(&mut self, list: &mut L, kind: ListKind) -> Result<Vec<Comment>, ParseError> {
        let mut comments = Vec::new();
        loop {
            comments.extend(self.cursor.consume_white_space()?);
            if self.cursor.is_eof() {
                break;
            }
            let start = self.cursor.pos();
            let line = self.line();
            let is_first = list.contents().is_empty();
            match self.parse_list_item(kind, is_first) {
                Ok(ItemOutcome::Item(mut item)) => {
                    let mut item_comments = std::mem::take(&mut comments);
                    item_comments.append(item.comments_mut());
                    item.set_comments(item_comments);
                    list.append(item);
                }
                Ok(ItemOutcome::Skipped) => {}
                Ok(ItemOutcome::EndOfList) => return Ok(comments),
                Err(e) if self.lenient() && e.is_unexpected_token() => {
                    debug!(line, "skipping statement: {e}");
                    self.skip_statement()?;
                    if self.cursor.pos() == start {
                        self.cursor.bump();
                    }
                }
                Err(e) => return Err(e),
            }
        }
        if kind != ListKind::Root {
            if !self.lenient() {
                return Err(ParseError::unexpected("}", "", MatchType::Literal, self.line()));
            }
            debug!(line = list.line_no(), "closing unterminated block at end of input");
        }
        return Ok(comments);
    }

    fn parse_list_item(&mut self, kind: ListKind, is_first: bool) -> Result<ItemOutcome, ParseError> {
        if self.cursor.comes("@") {
            return self.parse_at_rule(kind, is_first);
        }
        if self.cursor.comes("}") {
            if kind != ListKind::Root {
                return Ok(ItemOutcome::EndOfList);
            }
            if !self.lenient() {
                return Err(ParseError::source("Unopened {", self.line()));
            }
        }
        return self.parse_declaration_block(kind);
    }

    fn parse_at_rule(&mut self, kind: ListKind, is_first: bool) -> Result<ItemOutcome, ParseError> {
        self.cursor.consume("@")?;
        let name = self.cursor.parse_identifier(true)?;
        let line = self.line();
        self.cursor.consume_white_space()?;
        trace!(name = name.as_str(), line, "at-rule");

        match name.as_str() {
            "import" => {
                let location = self.parse_url()?;
                self.cursor.consume_white_space()?;
                let media = self.cursor.skip_until(&[';'], true, UntilEnd::Consume)?;
                let import = Import::new(location, media.trim(), line);
                return Ok(ItemOutcome::Item(CssItem::Import(import)));
            }
            "charset" => {
                let charset = self.parse_string()?;
                self.cursor.consume_white_space()?;
                self.cursor.skip_until(&[';'], true, UntilEnd::Consume)?;
                let misplaced = match (kind, is_first) {
                    (ListKind::Root, true) => None,
                    (ListKind::Root, false) => Some("@charset must be the first parseable token in a document"),
                    _ => Some("@charset may only occur in root document"),
                };
                if let Some(message) = misplaced {
                    if !self.lenient() {
                        return Err(ParseError::custom(message, line));
                    }
                    debug!(line, "dropping @charset: {message}");
                    return Ok(ItemOutcome::Skipped);
                }
                return Ok(ItemOutcome::Item(CssItem::Charset(Charset::new(charset, line))));
            }
            "namespace" => return self.parse_namespace(line).map(ItemOutcome::Item),
            _ => {}
        }

        if identifier_is(&name, "keyframes") {
            let animation_name = self.cursor.skip_until(&['{'], false, UntilEnd::Consume)?;
            let mut frames = KeyFrame::new(name, animation_name.trim(), line);
            self.parse_list(&mut frames, ListKind::KeyFrame)?;
            self.close_block();
            return Ok(ItemOutcome::Item(CssItem::List(CssList::KeyFrame(frames))));
        }

        let args = self.cursor.skip_until(&['{', ';'], true, UntilEnd::Leave)?;
        if args.matches('(').count() != args.matches(')').count() {
            if !self.lenient() {
                return Err(ParseError::source("Unmatched brace count in media query", line));
            }
            debug!(line, "skipping @{name} with unbalanced arguments");
            if self.cursor.comes("{") {
                self.skip_block();
            }
            return Ok(ItemOutcome::Skipped);
        }
        if !self.cursor.comes("{") {
            if !self.lenient() {
                return Err(ParseError::unexpected("{", self.cursor.peek_str(5), MatchType::Literal, self.line()));
            }
            debug!(line, "dropping @{name} without a block");
            self.cursor.skip_until(&[';'], true, UntilEnd::Consume)?;
            return Ok(ItemOutcome::Skipped);
        }
        self.cursor.consume("{")?;

        let args = args.trim();
        if BLOCK_RULES.iter().any(|rule| identifier_is(&name, rule)) {
            let mut block = AtRuleBlockList::new(name, args, line);
            self.parse_list(&mut block, ListKind::Block)?;
            self.close_block();
            return Ok(ItemOutcome::Item(CssItem::List(CssList::AtRuleBlockList(block))));
        }
        let mut rule_set = AtRuleSet::new(name, args, line);
        self.parse_rule_set_body(&mut rule_set)?;
        return Ok(ItemOutcome::Item(CssItem::RuleSet(RuleSet::AtRuleSet(rule_set))));
    }

    /// `@namespace [prefix] url;`, after the keyword
    fn parse_namespace(&mut self, line: usize) -> Result<CssItem, ParseError> {
        let first = self.parse_primitive_value()?;
        let second = if self.cursor.comes(";") || self.cursor.is_eof() {
            None
        } else {
            Some(self.parse_primitive_value()?)
        };
        self.cursor.skip_until(&[';'], true, UntilEnd::Consume)?;

        let (prefix, url) = match second {
            Some(url) => (Some(first), url),
            None => (None, first),
        };
        let prefix = match prefix {
            None => None,
            Some(Value::Keyword(keyword)) => Some(keyword.text().to_owned()),
            Some(_) => return Err(ParseError::custom("Wrong namespace prefix", line)),
        };
        if !matches!(url, Value::String(_) | Value::Url(_)) {
            return Err(ParseError::custom("Wrong namespace url of invalid type", line));
        }
        return Ok(CssItem::Namespace(Namespace::new(prefix, url, line)));
    }

    fn parse_declaration_block(&mut self, kind: ListKind) -> Result<ItemOutcome, ParseError> {
        let line = self.line();
        let mut block = DeclarationBlock::new(line);
        let mut comments = Vec::new();
        match self.parse_selectors(&mut block, kind, &mut comments) {
            Ok(()) => {}
            Err(e) if self.lenient() && e.is_unexpected_token() => {
                debug!(line, "skipping declaration block: {e}");
                if !self.cursor.comes("}") {
                    self.cursor.skip_until(&['}'], true, UntilEnd::Consume)?;
                }
                return Ok(ItemOutcome::Skipped);
            }
            Err(e) => return Err(e),
        }
        block.set_comments(comments);
        self.parse_rule_set_body(&mut block)?;
        return Ok(ItemOutcome::Item(block.into()));
    }

    /// Selector text up to the opening brace, which is consumed as well.
    /// Braces inside quoted attribute values do not count.
    fn parse_selectors(
        &mut self,
        block: &mut DeclarationBlock,
        kind: ListKind,
        comments: &mut Vec<Comment>,
    ) -> Result<(), ParseError> {
        let mut text = String::new();
        let mut quote: Option<char> = None;
        loop {
            let c = self.cursor.first();
            let escaped = text.ends_with('\\');
            text.push_str(self.cursor.consume_count(1)?);
            match quote {
                None if c == '"' || c == '\'' => quote = Some(c),
                Some(q) if q == c && !escaped => quote = None,
                _ => {}
            }
            text.push_str(&self.cursor.consume_until(&['{', '}', '\'', '"'], false, UntilEnd::Leave, comments)?);
            if quote.is_none() && (self.cursor.comes("{") || self.cursor.comes("}")) {
                break;
            }
        }
        block.set_selectors(&text, kind == ListKind::KeyFrame)?;
        self.cursor.consume("{")?;
        return Ok(());
    }

    /// Declarations up to and including the closing `}`.
    fn parse_rule_set_body<R: RuleContainer>(&mut self, container: &mut R) -> Result<(), ParseError> {
        let mut comments = Vec::new();
        loop {
            comments.extend(self.cursor.consume_white_space()?);
            while self.cursor.comes(";") {
                self.cursor.bump();
                comments.extend(self.cursor.consume_white_space()?);
            }
            if self.cursor.comes("}") || self.cursor.is_eof() {
                break;
            }
            match self.parse_rule(std::mem::take(&mut comments)) {
                Ok(rule) => container.add_rule(rule, None),
                Err(e) if self.lenient() && e.is_unexpected_token() => {
                    debug!(line = e.line(), "dropping declaration: {e}");
                    self.cursor.skip_until(&['\n', ';', '}'], true, UntilEnd::Leave)?;
                    if !self.cursor.comes("}") {
                        self.cursor.bump();
                    }
                }
                Err(e) => return Err(e),
            }
        }
        if self.cursor.is_eof() && self.lenient() {
            debug!(line = self.line(), "closing unterminated rule set at end of input");
            return Ok(());
        }
        self.cursor.consume("}")?;
        return Ok(());
    }

    /// One declaration, `name: value [!important]`, plus trailing semicolons.
    /// `comments` are the ones collected since the previous declaration.
    pub fn parse_rule(&mut self, mut comments: Vec<Comment>) -> Result<Rule, ParseError> {
        let line = self.line();
        let ignore_case = !self.cursor.comes("--");
        let name = self.cursor.parse_identifier(ignore_case)?;
        comments.extend(self.cursor.consume_white_space()?);
        let mut rule = Rule::new(name, line);
        self.cursor.consume(":")?;
        comments.extend(self.cursor.consume_white_space()?);
        rule.set_comments(comments);

        let value = self.parse_value(list_delimiters_for(rule.name()))?;
        rule.set_value(Some(value));
        if self.lenient() {
            while self.cursor.comes("\\") {
                self.cursor.bump();
                if let Some(hack) = self.cursor.bump() {
                    rule.add_ie_hack(hack);
                }
                self.cursor.consume_white_space()?;
            }
        }
        self.cursor.consume_white_space()?;
        if self.cursor.comes("!") {
            self.cursor.bump();
            self.cursor.consume_white_space()?;
            self.cursor.consume_ignore_case("important")?;
            rule.set_important(true);
        }
        self.cursor.consume_white_space()?;
        while self.cursor.comes(";") {
            self.cursor.bump();
        }
        return Ok(rule);
    }

    fn close_block(&mut self) {
        if self.cursor.comes("}") {
            self.cursor.bump();
        }
    }

    /// Skips a `{...}` block, nested braces included.
    fn skip_block(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.cursor.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    /// Moves past the rest of a broken statement: through its `;`, past its
    /// block, or up to the `}` closing the enclosing list.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_until(&[';', '{', '}'], true, UntilEnd::Leave)?;
        if self.cursor.comes(";") {
            self.cursor.bump();
        } else if self.cursor.comes("{") {
            self.skip_block();
        }
        return Ok(());
    }
}

/// `name`, optionally behind a vendor prefix such as `-webkit-`.
pub(crate) fn identifier_is(identifier: &str, name: &str) -> bool {
    if identifier.eq_ignore_ascii_case(name) {
        return true;
    }
    let Some((vendor, bare)) = identifier.strip_prefix('-').and_then(|rest| rest.split_once('-')) else {
        return false;
    };
    return !vendor.is_empty()
        && vendor.chars().all(|c| c.is_alphanumeric() || c == '_')
        && bare.eq_ignore_ascii_case(name);
}

/// Value list separators for a property, tightest binding first.
fn list_delimiters_for(property: &str) -> &'static [char] {
    if property == "font" || property.starts_with("font-") {
        return &[',', '/', ' '];
    }
    if property == "src" {
        return &[' ', ','];
    }
    return &[',', ' ', '/'];
}

#[cfg(test)]
mod test_css_parser {
    use super::*;
    use crate::nodes::{BlockList, Selector};
    use crate::parser::css_error::ErrorKind;
    use crate::parser::test_helpers::{assert_error, assert_node};
    use crate::render::OutputFormat;
    use csslathe_macro::{assert_parse_error, assert_parse_node};

    fn lenient(text: &str) -> Document {
        let mut parser = Parser::new(text, Settings::create());
        return parser.parse_document().unwrap();
    }

    fn render(text: &str) -> String {
        return lenient(text).render().unwrap();
    }

    #[test]
    fn document() {
        assert_parse_node!("", document);
        assert_parse_node!("@charset \"utf-8\";", document);
        assert_parse_node!("body { margin: 0px; padding: 3em, 6em; }", document);
        assert_parse_node!("@media screen, projection { }", document);
        assert_parse_node!("#boo, far {} \n.far boo {}", document);
        assert_parse_node!(
            "@-moz-keyframes darkWordHighlight { from { background-color: inherit; } to { background-color: rgba(83, 83, 83, 0.7); } }",
            document
        );
        assert_parse_node!("@page { margin: 2.5cm; }", document);
        assert_parse_node!("@font-face { font-family: \"Example Font\"; src: url(a.woff) format(\"woff\"); }", document);
        assert_parse_node!("@namespace pref url(http://test);", document);
        assert_parse_node!("@import url(\"a.css\") screen and (orientation:landscape);", document);
        assert_parse_node!("input[type=\"submit\"] {}", document);
        assert_parse_node!("a[title=\"{}\"] {color: red}", document);
        assert_parse_node!("E.warning E#myid E:not(s) {}", document);
        assert_parse_node!("/* only a comment */", document);
    }

    #[test]
    fn document_errors() {
        assert_parse_error!("a {color: red;}}", document, SourceException);
        assert_parse_error!("@media screen { a {color: red;}", document, UnexpectedToken);
        assert_parse_error!("a {color: red;", document, UnexpectedToken);
        assert_parse_error!("a {color: }", document, UnexpectedToken);
        assert_parse_error!("a {color: red !imp}", document, UnexpectedToken);
        assert_parse_error!("a {} @charset \"utf-8\";", document, UnexpectedToken);
        assert_parse_error!("@media print { @charset \"utf-8\"; }", document, UnexpectedToken);
        assert_parse_error!("@media screen and (max-width: 10px { a {} }", document, SourceException);
        assert_parse_error!("@foo bar;", document, UnexpectedToken);
        assert_parse_error!("@namespace 12 \"x\";", document, UnexpectedToken);
        assert_parse_error!("@namespace 12;", document, UnexpectedToken);
        assert_parse_error!("a}b {}", document, UnexpectedToken);
    }

    #[test]
    fn rule() {
        let rule = assert_parse_node!("color: red", rule(Vec::new()));
        assert_eq!(rule.name(), "color");
        assert!(!rule.is_important());

        let rule = assert_parse_node!("COLOR : red ! Important;;", rule(Vec::new()));
        assert_eq!(rule.name(), "color");
        assert!(rule.is_important());

        let rule = assert_parse_node!("--Main-Color: #06c", rule(Vec::new()));
        assert_eq!(rule.name(), "--Main-Color");

        let rule = assert_parse_node!("b\\;c: d", rule(Vec::new()));
        assert_eq!(rule.name(), "b\\;c");

        assert_parse_error!("color red", rule(Vec::new()), UnexpectedToken);
        assert_parse_error!(": red", rule(Vec::new()), UnexpectedToken);
    }

    #[test]
    fn selectors_keep_their_text() {
        let doc = lenient("html, body , .a > b[c=\"d,e\"] {}");
        let texts: Vec<&str> = doc.all_selectors().iter().map(|s| s.text()).collect();
        assert_eq!(texts, ["html", "body", ".a > b[c=\"d,e\"]"]);
    }

    #[test]
    fn at_rules() {
        let doc = lenient(
            "@charset \"utf-8\";\n@import url(\"foo.css\") screen;\n@namespace svg url(http://www.w3.org/2000/svg);\n\
             @font-face {font-family: \"Font\";}\n@media screen and (min-width: 768px) {a {top: 0;}}\n\
             @-webkit-keyframes spin {from {top: 0;} 50% {top: 10px;}}",
        );
        let names: Vec<Option<&str>> = doc.contents().iter().map(CssItem::at_rule_name).collect();
        assert_eq!(
            names,
            [
                Some("charset"),
                Some("import"),
                Some("namespace"),
                Some("font-face"),
                Some("media"),
                Some("-webkit-keyframes")
            ]
        );
        assert_eq!(doc.contents()[4].at_rule_args().as_deref(), Some("screen and (min-width: 768px)"));
        assert_eq!(doc.contents()[5].at_rule_args().as_deref(), Some("spin"));
        assert_eq!(
            doc.render().unwrap(),
            "@charset \"utf-8\";\n@import url(\"foo.css\") screen;\n@namespace svg url(\"http://www.w3.org/2000/svg\");\n\
             @font-face {font-family: \"Font\";}\n@media screen and (min-width: 768px) {a {top: 0;}}\n\
             @-webkit-keyframes spin {from {top: 0;}\n\t50% {top: 10px;}}"
        );
    }

    #[test]
    fn unknown_at_rules_hold_declarations() {
        let doc = lenient("@page :first {margin: 1in;}\n@-moz-document url-prefix() {.a {b: c;}}");
        assert!(matches!(doc.contents()[0], CssItem::RuleSet(RuleSet::AtRuleSet(_))));
        assert!(matches!(doc.contents()[1], CssItem::List(CssList::AtRuleBlockList(_))));
        assert_eq!(
            doc.render().unwrap(),
            "@page :first {margin: 1in;}\n@-moz-document url-prefix() {.a {b: c;}}"
        );
    }

    #[test]
    fn comments_attach_to_following_node() {
        let doc = lenient("/* head */ div {/*Find Me!*/left:10px; text-align:left;}");
        let block = doc.contents()[0].as_declaration_block().unwrap();
        assert_eq!(block.comments().len(), 1);
        assert_eq!(block.comments()[0].text(), " head ");
        let rules = block.rules(None);
        assert_eq!(rules[0].comments().len(), 1);
        assert_eq!(rules[0].comments()[0].text(), "Find Me!");
        assert!(rules[1].comments().is_empty());

        let mut format = OutputFormat::compact();
        format.render_comments = true;
        assert_eq!(
            doc.render_with(&format).unwrap(),
            "/* head */div{/*Find Me!*/left:10px;text-align:left;}"
        );
    }

    #[test]
    fn lines_are_tracked() {
        let doc = lenient("\n\na {\n  color: red;\n\n  top: 0;\n}\n@media print {\n  b {}\n}");
        let block = doc.contents()[0].as_declaration_block().unwrap();
        assert_eq!(block.line_no(), 3);
        let lines: Vec<usize> = block.rules(None).iter().map(|r| r.line_no()).collect();
        assert_eq!(lines, [4, 6]);
        assert_eq!(doc.contents()[1].line_no(), 8);
        assert_eq!(doc.all_declaration_blocks()[1].line_no(), 9);
    }

    #[test]
    fn lenient_recovery() {
        assert_eq!(render("a {color: red;}}b {top: 0;}"), "a {color: red;}");
        assert_eq!(render("a {color: ; top: 0;}"), "a {top: 0;}");
        assert_eq!(render("a {color: red !imp; top: 0;}"), "a {top: 0;}");
        assert_eq!(render("a {color: red"), "a {color: red;}");
        assert_eq!(render("@media screen { a {color: red;}"), "@media screen {a {color: red;}}");
        assert_eq!(render("a {} @charset \"utf-8\"; b {}"), "a {}\nb {}");
        assert_eq!(render("@media print { @charset \"utf-8\"; a {} }"), "@media print {a {}}");
        assert_eq!(render("@foo bar; a {}"), "a {}");
        assert_eq!(render("@media (max-width: 10px { a {} } b {}"), "b {}");
        assert_eq!(render("a{b:c} {{ d {e:f}"), "a {b: c;}");
        assert_eq!(render(".a {x: y \\9;}"), ".a {x: y \\9;}");
        assert_eq!(render("/* open"), "");
    }

    #[test]
    fn strict_and_lenient_diverge() {
        let text = ".a {grid-template-columns: [] 1fr;}";
        let mut strict = Parser::new(text, Settings::create().be_strict());
        assert_eq!(strict.parse_document().unwrap_err().kind(), ErrorKind::UnexpectedToken);
        assert_eq!(render(text), ".a {grid-template-columns: [] 1fr;}");

        let text = ".a {x: y \\9;}";
        let mut strict = Parser::new(text, Settings::create().be_strict());
        assert!(strict.parse_document().is_err());
    }

    #[test]
    fn vendor_prefixes() {
        assert!(identifier_is("keyframes", "keyframes"));
        assert!(identifier_is("-WEBKIT-Keyframes", "keyframes"));
        assert!(identifier_is("-moz-font-feature-values", "font-feature-values"));
        assert!(!identifier_is("--keyframes", "keyframes"));
        assert!(!identifier_is("keyframes2", "keyframes"));
    }

    #[test]
    fn remove_by_selector_after_parse() {
        let mut doc = lenient(".a {} .b {} .a {}");
        doc.remove_declaration_block_by_selector(&[Selector::new(".a")], false);
        assert_eq!(doc.render().unwrap(), ".b {}\n.a {}");
    }
}
