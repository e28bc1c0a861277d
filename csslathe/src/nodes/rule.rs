use super::comment::{Comment, Commentable};
use crate::render::Printer;
use crate::value::{RuleValueList, Value};

/// A declaration, `name: value [!important];`
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    value: Option<Value>,
    important: bool,
    /// IE `\9` / `\0` suffixes, only accepted when lenient
    ie_hack: Vec<char>,
    line_no: usize,
    comments: Vec<Comment>,
}

impl Rule {
    pub fn new(name: impl Into<String>, line_no: usize) -> Self {
        return Self {
            name: name.into(),
            value: None,
            important: false,
            ie_hack: Vec::new(),
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        return self;
    }

    pub fn with_important(mut self, important: bool) -> Self {
        self.important = important;
        return self;
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> Option<&Value> {
        return self.value.as_ref();
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        return self.value.as_mut();
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    /// Appends `values` to the value, which becomes a `separator` list
    /// first unless it already is one.
    pub fn add_value(&mut self, values: Vec<Value>, separator: char) {
        let mut list = match self.value.take() {
            Some(Value::List(list)) if list.separator() == separator => list,
            Some(current) => RuleValueList::new(separator, vec![current], self.line_no),
            None => RuleValueList::new(separator, Vec::new(), self.line_no),
        };
        for value in values {
            list.add_component(value);
        }
        self.value = Some(Value::List(list));
    }

    pub fn is_important(&self) -> bool {
        return self.important;
    }

    pub fn set_important(&mut self, important: bool) {
        self.important = important;
    }

    pub fn ie_hack(&self) -> &[char] {
        return &self.ie_hack;
    }

    pub fn add_ie_hack(&mut self, hack: char) {
        self.ie_hack.push(hack);
    }

    pub fn set_ie_hack(&mut self, hacks: Vec<char>) {
        self.ie_hack = hacks;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        let mut result = printer.comments(&self.comments);
        result.push_str(&self.name);
        result.push(':');
        result.push_str(printer.space_after_rule_name());
        if let Some(value) = &self.value {
            result.push_str(&value.render(printer));
        }
        if !self.ie_hack.is_empty() {
            result.push_str(" \\");
            let hacks: Vec<String> = self.ie_hack.iter().map(|c| c.to_string()).collect();
            result.push_str(&hacks.join("\\"));
        }
        if self.important {
            result.push_str(" !important");
        }
        result.push(';');
        return result;
    }
}

impl Commentable for Rule {
    fn comments(&self) -> &[Comment] {
        return &self.comments;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        return &mut self.comments;
    }
}

#[cfg(test)]
mod test_rule {
    use super::*;
    use crate::render::OutputFormat;
    use crate::value::Size;

    #[test]
    fn render_parts() {
        let format = OutputFormat::default();
        let printer = format.printer();
        let mut rule = Rule::new("color", 1).with_value(Value::keyword("red", 1));
        assert_eq!(rule.render(&printer), "color: red;");
        rule.set_important(true);
        assert_eq!(rule.render(&printer), "color: red !important;");
        rule.set_important(false);
        rule.add_ie_hack('9');
        rule.add_ie_hack('0');
        assert_eq!(rule.render(&printer), "color: red \\9\\0;");
        assert_eq!(Rule::new("empty", 1).render(&OutputFormat::compact().printer()), "empty:;");
    }

    #[test]
    fn add_value_builds_lists() {
        let format = OutputFormat::default();
        let mut rule = Rule::new("margin", 1).with_value(Value::Size(Size::from_text("1", Some("px"), false, 1)));
        rule.add_value(vec![Value::Size(Size::from_text("2", Some("px"), false, 1))], ' ');
        assert_eq!(rule.render(&format.printer()), "margin: 1px 2px;");
        rule.add_value(vec![Value::keyword("auto", 1)], ' ');
        assert_eq!(rule.value().and_then(Value::as_list).map(|l| l.components().len()), Some(3));
        rule.add_value(vec![Value::keyword("x", 1)], ',');
        assert_eq!(rule.render(&format.printer()), "margin: 1px 2px auto,x;");
    }
}
