//! The value side of a declaration: everything right of the colon.

mod color;
mod function;
mod size;
mod string;

use std::fmt;

use itertools::Itertools;
use smol_str::SmolStr;

pub use color::Color;
pub use function::{CalcFunction, CalcTerm, CssFunction, LineName};
pub use size::{Size, ABSOLUTE_SIZE_UNITS, NON_SIZE_UNITS, RELATIVE_SIZE_UNITS};
pub use string::{CssString, Url};

use crate::render::{OutputFormat, Printer};

/// A bare identifier or other unquoted token, `bold`, `U+0100-024F`, `*`
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    text: SmolStr,
    line_no: usize,
}

impl Keyword {
    pub fn new(text: &str, line_no: usize) -> Self {
        return Self {
            text: SmolStr::new(text),
            line_no,
        };
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }
}

/// Sibling values sharing one separator: space, `,` or `/`
#[derive(Debug, Clone, PartialEq)]
pub struct RuleValueList {
    separator: char,
    components: Vec<Value>,
    line_no: usize,
}

impl RuleValueList {
    pub fn new(separator: char, components: Vec<Value>, line_no: usize) -> Self {
        return Self {
            separator,
            components,
            line_no,
        };
    }

    pub fn separator(&self) -> char {
        return self.separator;
    }

    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    pub fn components(&self) -> &[Value] {
        return &self.components;
    }

    pub fn components_mut(&mut self) -> &mut Vec<Value> {
        return &mut self.components;
    }

    pub fn into_components(self) -> Vec<Value> {
        return self.components;
    }

    pub fn add_component(&mut self, value: Value) {
        self.components.push(value);
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        let separator = format!(
            "{}{}",
            self.separator,
            printer.space_after_list_argument_separator(self.separator)
        );
        return self.components.iter().map(|c| c.render(printer)).join(&separator);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Keyword(Keyword),
    Size(Size),
    Color(Color),
    String(CssString),
    Url(Url),
    Calc(CalcFunction),
    Function(CssFunction),
    LineName(LineName),
    List(RuleValueList),
}

impl Value {
    pub fn keyword(text: &str, line_no: usize) -> Self {
        return Value::Keyword(Keyword::new(text, line_no));
    }

    pub fn line_no(&self) -> usize {
        return match self {
            Value::Keyword(v) => v.line_no(),
            Value::Size(v) => v.line_no(),
            Value::Color(v) => v.line_no(),
            Value::String(v) => v.line_no(),
            Value::Url(v) => v.line_no(),
            Value::Calc(v) => v.line_no(),
            Value::Function(v) => v.line_no(),
            Value::LineName(v) => v.line_no(),
            Value::List(v) => v.line_no(),
        };
    }

    pub fn render(&self, printer: &Printer) -> String {
        return match self {
            Value::Keyword(v) => v.text().to_owned(),
            Value::Size(v) => v.render(),
            Value::Color(v) => v.render(printer),
            Value::String(v) => v.render(printer),
            Value::Url(v) => v.render(printer),
            Value::Calc(v) => v.render(printer),
            Value::Function(v) => v.render(printer),
            Value::LineName(v) => v.render(printer),
            Value::List(v) => v.render(printer),
        };
    }

    pub fn as_keyword(&self) -> Option<&str> {
        return match self {
            Value::Keyword(k) => Some(k.text()),
            _ => None,
        };
    }

    /// Case-insensitive keyword comparison.
    pub fn is_keyword(&self, text: &str) -> bool {
        return self.as_keyword().is_some_and(|k| k.eq_ignore_ascii_case(text));
    }

    pub fn as_size(&self) -> Option<&Size> {
        return match self {
            Value::Size(s) => Some(s),
            _ => None,
        };
    }

    pub fn as_size_mut(&mut self) -> Option<&mut Size> {
        return match self {
            Value::Size(s) => Some(s),
            _ => None,
        };
    }

    pub fn as_color(&self) -> Option<&Color> {
        return match self {
            Value::Color(c) => Some(c),
            _ => None,
        };
    }

    pub fn as_string(&self) -> Option<&CssString> {
        return match self {
            Value::String(s) => Some(s),
            _ => None,
        };
    }

    pub fn as_url(&self) -> Option<&Url> {
        return match self {
            Value::Url(u) => Some(u),
            _ => None,
        };
    }

    pub fn as_function(&self) -> Option<&CssFunction> {
        return match self {
            Value::Function(f) => Some(f),
            _ => None,
        };
    }

    pub fn as_list(&self) -> Option<&RuleValueList> {
        return match self {
            Value::List(l) => Some(l),
            _ => None,
        };
    }

    pub fn as_list_mut(&mut self) -> Option<&mut RuleValueList> {
        return match self {
            Value::List(l) => Some(l),
            _ => None,
        };
    }

    /// The components of a list, or the value itself.
    pub fn components(&self) -> Vec<&Value> {
        return match self {
            Value::List(l) => l.components().iter().collect(),
            other => vec![other],
        };
    }

    /// Owned counterpart of `components`.
    pub fn into_components(self) -> Vec<Value> {
        return match self {
            Value::List(l) => l.into_components(),
            other => vec![other],
        };
    }

    /// Leaf values below (and including) this one. Lists are always
    /// descended; functions and `calc` only with `in_function_arguments`.
    pub(crate) fn collect_values<'v>(&'v self, in_function_arguments: bool, out: &mut Vec<&'v Value>) {
        match self {
            Value::List(list) => {
                for component in list.components() {
                    component.collect_values(in_function_arguments, out);
                }
            }
            Value::Function(function) if in_function_arguments => {
                for argument in function.arguments() {
                    argument.collect_values(in_function_arguments, out);
                }
            }
            Value::Calc(calc) if in_function_arguments => {
                for operand in calc.operands() {
                    operand.collect_values(in_function_arguments, out);
                }
            }
            other => out.push(other),
        }
    }

    pub(crate) fn collect_values_mut<'v>(
        &'v mut self,
        in_function_arguments: bool,
        out: &mut Vec<&'v mut Value>,
    ) {
        match self {
            Value::List(list) => {
                for component in list.components_mut() {
                    component.collect_values_mut(in_function_arguments, out);
                }
            }
            Value::Function(_) | Value::Calc(_) if in_function_arguments => match self {
                Value::Function(function) => {
                    for argument in function.arguments_mut() {
                        argument.collect_values_mut(in_function_arguments, out);
                    }
                }
                Value::Calc(calc) => {
                    for operand in calc.operands_mut() {
                        operand.collect_values_mut(in_function_arguments, out);
                    }
                }
                _ => {}
            },
            other => out.push(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = OutputFormat::default();
        return f.write_str(&self.render(&format.printer()));
    }
}

#[cfg(test)]
mod test_value {
    use super::*;

    fn px(n: &str) -> Value {
        return Value::Size(Size::from_text(n, Some("px"), false, 1));
    }

    fn slashed_font() -> Value {
        let slash = RuleValueList::new('/', vec![px("12"), Value::Size(Size::from_text("1.5", None, false, 1))], 1);
        let families = RuleValueList::new(
            ',',
            vec![Value::keyword("Verdana", 1), Value::keyword("Arial", 1)],
            1,
        );
        return Value::List(RuleValueList::new(' ', vec![Value::List(slash), Value::List(families)], 1));
    }

    #[test]
    fn list_render() {
        assert_eq!(slashed_font().to_string(), "12px/1.5 Verdana,Arial");
        let format = OutputFormat::pretty();
        assert_eq!(slashed_font().render(&format.printer()), "12px/1.5 Verdana, Arial");
    }

    #[test]
    fn traversal_reaches_leaves() {
        let value = slashed_font();
        let mut out = Vec::new();
        value.collect_values(false, &mut out);
        assert_eq!(out.len(), 4);
        assert!(out[3].is_keyword("arial"));

        let function = Value::Function(CssFunction::new("scale", Some(px("2")), ',', 1));
        let mut out = Vec::new();
        function.collect_values(false, &mut out);
        assert!(matches!(out[0], Value::Function(_)));
        let mut out = Vec::new();
        function.collect_values(true, &mut out);
        assert!(matches!(out[0], Value::Size(_)));
    }

    #[test]
    fn rescale_in_place() {
        let mut value = slashed_font();
        let mut out = Vec::new();
        value.collect_values_mut(false, &mut out);
        for v in out {
            if let Some(size) = v.as_size_mut() {
                if size.is_size() && !size.is_relative() {
                    size.set_size(size.as_f64() * 3.0);
                }
            }
        }
        assert_eq!(value.to_string(), "36px/1.5 Verdana,Arial");
    }

    #[test]
    fn rescale_function_arguments() {
        let mut function = Value::Function(CssFunction::new("translate", Some(px("2")), ',', 1));
        let mut out = Vec::new();
        function.collect_values_mut(false, &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].as_size_mut().is_none());

        let mut out = Vec::new();
        function.collect_values_mut(true, &mut out);
        for v in out {
            if let Some(size) = v.as_size_mut() {
                size.set_size(size.as_f64() * 2.0);
            }
        }
        assert_eq!(function.to_string(), "translate(4px)");
    }
}
