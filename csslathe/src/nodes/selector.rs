use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::css_error::{MatchType, ParseError};

fn selector_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        Regex::new(
            r#"(?s)^(?:[a-zA-Z0-9\x{00A0}-\x{D7FF}\x{E000}-\x{FFFF}_^$|*="'~\[\]()\-\s.:#+>]|\\.|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')*$"#,
        )
        .expect("selector regex")
    })
}

fn keyframe_selector_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"^\d+%$").expect("keyframe selector regex"))
}

/// One comma-separated part of a declaration block's selector list.
///
/// The text is kept verbatim; specificity is computed on first use and
/// recomputed after `set_text`.
#[derive(Debug, Clone)]
pub struct Selector {
    text: String,
    specificity: OnceLock<u32>,
}

impl Selector {
    pub fn new(text: impl Into<String>) -> Self {
        return Self {
            text: text.into(),
            specificity: OnceLock::new(),
        };
    }

    pub fn is_valid(text: &str) -> bool {
        return selector_rx().is_match(text);
    }

    pub fn is_valid_keyframe(text: &str) -> bool {
        return keyframe_selector_rx().is_match(text) || Self::is_valid(text);
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.specificity = OnceLock::new();
    }

    pub fn specificity(&self) -> u32 {
        return *self.specificity.get_or_init(|| specificity(&self.text));
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        return self.text == other.text;
    }
}

impl Eq for Selector {}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.text);
    }
}

/// Pseudo-elements from CSS2 that are still written with a single colon
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

fn is_name_char(c: char) -> bool {
    return c.is_ascii_alphanumeric() || c == '-' || c == '_' || c >= '\u{a0}';
}

/// Reads a name starting at `i`, escapes included. Returns the name and the index after it.
fn read_name(chars: &[char], mut i: usize) -> (String, usize) {
    let mut name = String::new();
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            name.push(chars[i + 1]);
            i += 2;
        } else if is_name_char(chars[i]) {
            name.push(chars[i]);
            i += 1;
        } else {
            break;
        }
    }
    return (name, i);
}

/// Index after the group closed by `close`, nesting and quotes respected.
fn skip_group(chars: &[char], mut i: usize, open: char, close: char) -> usize {
    let mut depth = 0;
    let mut quote = None;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(_) if c == '\\' => i += 1,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == open => depth += 1,
            None if c == close => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            None => {}
        }
        i += 1;
    }
    return chars.len();
}

/// `100 * ids + 10 * (classes + attributes + pseudo-classes) + elements`
fn specificity(text: &str) -> u32 {
    let chars: Vec<char> = text.chars().collect();
    let (mut ids, mut classes, mut elements) = (0, 0, 0);
    let mut compound_start = true;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                let (name, next) = read_name(&chars, i + 1);
                if !name.is_empty() {
                    ids += 1;
                }
                i = next;
            }
            '.' => {
                let (name, next) = read_name(&chars, i + 1);
                if !name.is_empty() {
                    classes += 1;
                }
                i = next;
            }
            '[' => {
                classes += 1;
                i = skip_group(&chars, i, '[', ']');
            }
            ':' => {
                let double = chars.get(i + 1) == Some(&':');
                let start = if double { i + 2 } else { i + 1 };
                let (name, next) = read_name(&chars, start);
                let lower = name.to_ascii_lowercase();
                if double || LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str()) {
                    elements += 1;
                } else if !name.is_empty() {
                    classes += 1;
                }
                i = next;
                if chars.get(i) == Some(&'(') {
                    i = skip_group(&chars, i, '(', ')');
                }
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',') => {
                compound_start = true;
                i += 1;
                continue;
            }
            c if compound_start && (is_name_char(c) || c == '\\') => {
                let (_, next) = read_name(&chars, i);
                i = next;
                if chars.get(i) == Some(&'|') {
                    // namespace prefix, the element follows
                    i += 1;
                    let (_, after) = read_name(&chars, i);
                    i = after;
                }
                elements += 1;
            }
            '|' => {
                i += 1;
                let (name, after) = read_name(&chars, i);
                if !name.is_empty() {
                    elements += 1;
                }
                i = after;
            }
            _ => i += 1,
        }
        compound_start = false;
    }
    return ids * 100 + classes * 10 + elements;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Equal,
}

/// A specificity comparison such as `> 100`, `<=10` or a bare `11`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecificityFilter {
    pub comparison: Comparison,
    pub target: u32,
}

impl SpecificityFilter {
    pub fn matches(&self, specificity: u32) -> bool {
        return match self.comparison {
            Comparison::Greater => specificity > self.target,
            Comparison::GreaterOrEqual => specificity >= self.target,
            Comparison::Less => specificity < self.target,
            Comparison::LessOrEqual => specificity <= self.target,
            Comparison::Equal => specificity == self.target,
        };
    }
}

impl FromStr for SpecificityFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const OPERATORS: &[(&str, Comparison)] = &[
            (">=", Comparison::GreaterOrEqual),
            ("<=", Comparison::LessOrEqual),
            ("===", Comparison::Equal),
            ("==", Comparison::Equal),
            (">", Comparison::Greater),
            ("<", Comparison::Less),
        ];
        let s = s.trim();
        let (comparison, rest) = OPERATORS
            .iter()
            .find_map(|(op, comparison)| s.strip_prefix(*op).map(|rest| (*comparison, rest)))
            .unwrap_or((Comparison::Equal, s));
        let target = rest.trim().parse::<u32>().map_err(|_| {
            ParseError::unexpected("specificity comparison", s, MatchType::Custom, 0)
        })?;
        return Ok(Self { comparison, target });
    }
}

impl From<u32> for SpecificityFilter {
    fn from(target: u32) -> Self {
        return Self {
            comparison: Comparison::Equal,
            target,
        };
    }
}

#[cfg(test)]
mod test_selector {
    use super::*;

    #[test]
    fn specificities() {
        assert_eq!(Selector::new("#test .help").specificity(), 110);
        assert_eq!(Selector::new("#file").specificity(), 100);
        assert_eq!(Selector::new(".help:hover").specificity(), 20);
        assert_eq!(Selector::new("li.green").specificity(), 11);
        assert_eq!(Selector::new("ol li::before").specificity(), 3);
        assert_eq!(Selector::new("a:before").specificity(), 2);
        assert_eq!(Selector::new("input[type=\"submit\"]").specificity(), 11);
        assert_eq!(Selector::new("ul > li + li ~ p").specificity(), 4);
        assert_eq!(Selector::new("*").specificity(), 0);
        assert_eq!(Selector::new("E:not(.a)").specificity(), 11);
        assert_eq!(Selector::new("foo|test").specificity(), 1);
        assert_eq!(Selector::new("#\\#").specificity(), 100);
    }

    #[test]
    fn specificity_follows_text() {
        let mut selector = Selector::new("body");
        assert_eq!(selector.specificity(), 1);
        selector.set_text("#my_id body");
        assert_eq!(selector.specificity(), 101);
        assert_eq!(selector, Selector::new("#my_id body"));
    }

    #[test]
    fn validation() {
        assert!(Selector::is_valid(".collapser::-moz-before"));
        assert!(Selector::is_valid("html[dir=\"rtl\"] .super-menu > li:first-of-type"));
        assert!(Selector::is_valid(".some[selectors-may='contain-a-{']"));
        assert!(Selector::is_valid(".col-sm-1\\/5"));
        assert!(Selector::is_valid("foo|test"));
        assert!(!Selector::is_valid("body;"));
        assert!(!Selector::is_valid("50%"));
        assert!(!Selector::is_valid("#test}"));
        assert!(Selector::is_valid_keyframe("50%"));
        assert!(Selector::is_valid_keyframe("from"));
    }

    #[test]
    fn filters() {
        let f: SpecificityFilter = "> 100".parse().unwrap();
        assert!(f.matches(110) && !f.matches(100));
        let f: SpecificityFilter = ">=100".parse().unwrap();
        assert!(f.matches(100));
        let f: SpecificityFilter = "=== 100".parse().unwrap();
        assert_eq!(f.comparison, Comparison::Equal);
        let f: SpecificityFilter = "<= 100".parse().unwrap();
        assert!(f.matches(3) && !f.matches(110));
        let f: SpecificityFilter = "11".parse().unwrap();
        assert!(f.matches(11) && !f.matches(12));
        assert_eq!(SpecificityFilter::from(3).target, 3);
        assert!("about 3".parse::<SpecificityFilter>().is_err());
        assert!("!= 3".parse::<SpecificityFilter>().is_err());
    }
}
