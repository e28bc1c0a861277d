use itertools::Itertools;
use smol_str::SmolStr;

use super::Value;
use crate::render::Printer;

/// `name(arg, arg)` for any function without a dedicated node
#[derive(Debug, Clone, PartialEq)]
pub struct CssFunction {
    name: SmolStr,
    arguments: Vec<Value>,
    separator: char,
    line_no: usize,
}

impl CssFunction {
    /// A list argument is flattened into the arguments and lends its separator.
    pub fn new(name: &str, arguments: Option<Value>, separator: char, line_no: usize) -> Self {
        let (arguments, separator) = match arguments {
            Some(Value::List(list)) => {
                let separator = list.separator();
                (list.into_components(), separator)
            }
            Some(value) => (vec![value], separator),
            None => (Vec::new(), separator),
        };
        return Self {
            name: SmolStr::new(name),
            arguments,
            separator,
            line_no,
        };
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = SmolStr::new(name);
    }

    pub fn arguments(&self) -> &[Value] {
        return &self.arguments;
    }

    pub fn arguments_mut(&mut self) -> &mut Vec<Value> {
        return &mut self.arguments;
    }

    pub fn separator(&self) -> char {
        return self.separator;
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
        let arguments = self.arguments.iter().map(|a| a.render(printer)).join(&separator);
        return format!("{}({})", self.name, arguments);
    }
}

/// A piece of a `calc()` expression
#[derive(Debug, Clone, PartialEq)]
pub enum CalcTerm {
    Operand(Value),
    Operator(char),
    Group(Vec<CalcTerm>),
}

impl CalcTerm {
    fn render(&self, printer: &Printer) -> String {
        return match self {
            CalcTerm::Operand(value) => value.render(printer),
            CalcTerm::Operator(op) => op.to_string(),
            CalcTerm::Group(terms) if terms.is_empty() => "( )".to_owned(),
            CalcTerm::Group(terms) => format!("( {} )", render_terms(terms, printer)),
        };
    }
}

fn render_terms(terms: &[CalcTerm], printer: &Printer) -> String {
    return terms.iter().map(|t| t.render(printer)).join(" ");
}

/// `calc()` or a vendor prefixed variant, parenthesization kept as parsed
#[derive(Debug, Clone, PartialEq)]
pub struct CalcFunction {
    name: SmolStr,
    terms: Vec<CalcTerm>,
    line_no: usize,
}

impl CalcFunction {
    pub fn new(name: &str, terms: Vec<CalcTerm>, line_no: usize) -> Self {
        return Self {
            name: SmolStr::new(name),
            terms,
            line_no,
        };
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }

    pub fn terms(&self) -> &[CalcTerm] {
        return &self.terms;
    }

    pub fn terms_mut(&mut self) -> &mut Vec<CalcTerm> {
        return &mut self.terms;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        return format!("{}({})", self.name, render_terms(&self.terms, printer));
    }

    /// Every operand, groups flattened, in source order.
    pub fn operands(&self) -> Vec<&Value> {
        fn walk<'v>(terms: &'v [CalcTerm], out: &mut Vec<&'v Value>) {
            for term in terms {
                match term {
                    CalcTerm::Operand(v) => out.push(v),
                    CalcTerm::Group(inner) => walk(inner, out),
                    CalcTerm::Operator(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.terms, &mut out);
        return out;
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Value> {
        fn walk<'v>(terms: &'v mut [CalcTerm], out: &mut Vec<&'v mut Value>) {
            for term in terms {
                match term {
                    CalcTerm::Operand(v) => out.push(v),
                    CalcTerm::Group(inner) => walk(inner, out),
                    CalcTerm::Operator(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&mut self.terms, &mut out);
        return out;
    }
}

/// Grid line names, `[first second]`, possibly empty
#[derive(Debug, Clone, PartialEq)]
pub struct LineName {
    names: Vec<String>,
    line_no: usize,
}

impl LineName {
    pub fn new(names: Vec<String>, line_no: usize) -> Self {
        return Self { names, line_no };
    }

    pub fn names(&self) -> &[String] {
        return &self.names;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, _printer: &Printer) -> String {
        return format!("[{}]", self.names.join(" "));
    }
}
