use tracing::trace;

use super::css_error::{MatchType, ParseError};
use super::Parser;
use crate::tokenizer::{is_white_space, UntilEnd};
use crate::value::{
    CalcFunction, CalcTerm, Color, CssFunction, CssString, LineName, RuleValueList, Size, Url, Value,
};

const CALC_FUNCTIONS: &[&str] = &["calc", "-webkit-calc", "-moz-calc"];
const COLOR_FUNCTIONS: &[&str] = &["rgb(", "rgba(", "hsl(", "hsla("];

/// Replaces every run of values joined by `delimiter` with one list value.
/// `separators[i]` sits between `values[i]` and `values[i + 1]`.
fn join_on(values: &mut Vec<Value>, separators: &mut Vec<char>, delimiter: char) {
    while let Some(start) = separators.iter().position(|s| *s == delimiter) {
        let end = separators[start..]
            .iter()
            .position(|s| *s != delimiter)
            .map_or(separators.len(), |n| start + n);
        let components: Vec<Value> = values.drain(start..=end).collect();
        let line = components.first().map_or(0, Value::line_no);
        values.insert(start, Value::List(RuleValueList::new(delimiter, components, line)));
        separators.drain(start..end);
    }
}

impl<'a> Parser<'a> {
    fn at_value_end(&self) -> bool {
        return self.cursor.is_eof() || matches!(self.cursor.first(), '}' | ';' | '!' | ')' | '\\');
    }

    /// A number, a sign or dot followed by a digit, or `-.` and a digit.
    fn comes_number(&self) -> bool {
        return self.cursor.first() != '+' && self.cursor.is_number_seq_start();
    }

    /// Values up to the end of a declaration or function argument list.
    ///
    /// `delimiters` are tried in order between values; whitespace separates
    /// values when none of them follows. Runs are then grouped into lists,
    /// the first delimiter binding tightest.
    pub fn parse_value(&mut self, delimiters: &[char]) -> Result<Value, ParseError> {
        let mut values = Vec::new();
        let mut separators = Vec::new();
        self.cursor.consume_white_space()?;
        while !self.at_value_end() {
            if !values.is_empty() {
                let next = self.cursor.first();
                match delimiters.iter().find(|d| **d == next) {
                    Some(delimiter) => {
                        self.cursor.bump();
                        self.cursor.consume_white_space()?;
                        separators.push(*delimiter);
                    }
                    None => separators.push(' '),
                }
            }
            values.push(self.parse_primitive_value()?);
            self.cursor.consume_white_space()?;
        }

        for delimiter in delimiters {
            if values.len() <= 1 {
                break;
            }
            join_on(&mut values, &mut separators, *delimiter);
        }
        join_on(&mut values, &mut separators, ' ');

        return match values.pop() {
            Some(value) => Ok(value),
            None => Err(ParseError::unexpected(
                format!(" {} ", self.cursor.first()),
                self.cursor.peek_str(5),
                MatchType::Literal,
                self.line(),
            )),
        };
    }

    /// A single value, with the whitespace after it.
    pub fn parse_primitive_value(&mut self) -> Result<Value, ParseError> {
        let line = self.line();
        let value = if self.comes_number() {
            Value::Size(self.parse_size(false)?)
        } else if self.cursor.comes("#") || COLOR_FUNCTIONS.iter().any(|f| self.cursor.comes_ignore_case(f)) {
            self.parse_color()?
        } else if self.cursor.comes("'") || self.cursor.comes("\"") {
            Value::String(self.parse_string()?)
        } else if self.lenient() && self.cursor.comes_ignore_case("progid:") {
            self.parse_microsoft_filter()?
        } else if self.cursor.comes("[") {
            Value::LineName(self.parse_line_name()?)
        } else if self.cursor.comes_ignore_case("U+") {
            self.parse_unicode_range()?
        } else {
            let next = self.cursor.first();
            match self.parse_identifier_or_function() {
                Ok(value) => value,
                Err(_) if matches!(next, '+' | '-' | '*' | '/') => {
                    self.cursor.bump();
                    Value::keyword(&next.to_string(), line)
                }
                Err(e) => return Err(e),
            }
        };
        self.cursor.consume_white_space()?;
        return Ok(value);
    }

    /// A number with an optional adjacent unit.
    pub fn parse_size(&mut self, is_color_component: bool) -> Result<Size, ParseError> {
        let line = self.line();
        let start = self.cursor.anchor();
        if self.cursor.comes("-") {
            self.cursor.bump();
        }
        let mut has_digits = !self.cursor.bump_while_first(|c| c.is_ascii_digit()).is_empty();
        if self.cursor.comes(".") {
            self.cursor.bump();
            has_digits |= !self.cursor.bump_while_first(|c| c.is_ascii_digit()).is_empty();
        }
        if !has_digits {
            self.cursor.backtrack(start);
            return Err(ParseError::unexpected("number", self.cursor.peek_str(5), MatchType::Expression, line));
        }
        let exponent = matches!(self.cursor.first(), 'e' | 'E')
            && (self.cursor.second().is_ascii_digit()
                || (matches!(self.cursor.second(), '+' | '-') && self.cursor.third().is_ascii_digit()));
        if exponent {
            self.cursor.bump_n(2);
            self.cursor.bump_while_first(|c| c.is_ascii_digit());
        }
        let number = self.cursor.since(start);

        let unit = Size::unit_prefix(self.cursor.rest());
        if let Some(unit) = unit {
            self.cursor.bump_n(unit.chars().count());
        }
        return Ok(Size::from_text(number, unit, is_color_component, line));
    }

    /// `#hex` or one of the `rgb`/`hsl` functions. Channels given as `var()`,
    /// or anything other than comma separated numbers, turn the whole call
    /// into a plain function.
    pub fn parse_color(&mut self) -> Result<Value, ParseError> {
        let line = self.line();
        if self.cursor.comes("#") {
            self.cursor.bump();
            let hex = self.cursor.parse_identifier(false)?;
            return match Color::from_hex(&hex, line) {
                Some(color) => Ok(Value::Color(color)),
                None => Err(ParseError::unexpected("Invalid hex color value", hex, MatchType::Custom, line)),
            };
        }

        let anchor = self.cursor.anchor();
        let mode = self.cursor.parse_identifier(true)?;
        self.cursor.consume_white_space()?;
        return match self.parse_color_channels(&mode, line) {
            Ok(value) => Ok(value),
            Err(e) => {
                trace!(name = mode.as_str(), line, "color channels not comma separated numbers: {}", e);
                self.cursor.backtrack(anchor);
                let name = self.cursor.parse_identifier(true)?;
                self.cursor.consume_white_space()?;
                Ok(Value::Function(self.parse_function(&name)?))
            }
        };
    }

    /// `(c1, c2, c3[, a])` after a color function name, one channel per
    /// letter of `mode`.
    fn parse_color_channels(&mut self, mode: &str, line: usize) -> Result<Value, ParseError> {
        self.cursor.consume("(")?;
        let names: Vec<char> = mode.chars().collect();
        let mut contains_var = false;
        let mut channels = Vec::with_capacity(names.len());
        let mut arguments = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            self.cursor.consume_white_space()?;
            if self.cursor.comes_ignore_case("var") {
                arguments.push(self.parse_identifier_or_function()?);
                contains_var = true;
            } else {
                let size = self.parse_size(true)?;
                arguments.push(Value::Size(size.clone()));
                channels.push((*name, size));
            }
            self.cursor.consume_white_space()?;
            // var() may stand for several channels
            if contains_var && self.cursor.comes(")") {
                break;
            }
            if i + 1 < names.len() {
                self.cursor.consume(",")?;
            }
        }
        self.cursor.consume_white_space()?;
        self.cursor.consume(")")?;

        if contains_var {
            let arguments = Value::List(RuleValueList::new(',', arguments, line));
            return Ok(Value::Function(CssFunction::new(mode, Some(arguments), ',', line)));
        }
        return Ok(Value::Color(Color::new(channels, line)));
    }

    /// A quoted string kept with its escapes, or an unquoted run that ends at
    /// whitespace or a bracket.
    pub fn parse_string(&mut self) -> Result<CssString, ParseError> {
        let line = self.line();
        let quote = self.cursor.first();
        if quote != '"' && quote != '\'' {
            let start = self.cursor.anchor();
            while !self.cursor.is_eof() {
                let c = self.cursor.first();
                if is_white_space(c) || "{}()<>[]".contains(c) {
                    break;
                }
                self.cursor.parse_character(false)?;
            }
            return Ok(CssString::from_raw(self.cursor.since(start), line));
        }

        self.cursor.bump();
        let start = self.cursor.anchor();
        while !self.cursor.comes(&quote.to_string()) {
            if self.cursor.is_eof() {
                return Err(ParseError::unexpected(quote.to_string(), "", MatchType::Literal, self.line()));
            }
            self.cursor.parse_character(false)?;
        }
        let raw = self.cursor.since(start);
        self.cursor.bump();
        return Ok(CssString::from_raw(raw, line));
    }

    /// `url(...)` or a bare string, as `@import` allows.
    pub fn parse_url(&mut self) -> Result<Url, ParseError> {
        let line = self.line();
        let wrapped = self.cursor.comes_ignore_case("url");
        if wrapped {
            self.cursor.consume_ignore_case("url")?;
            self.cursor.consume_white_space()?;
            self.cursor.consume("(")?;
            self.cursor.consume_white_space()?;
        }
        let url = self.parse_string()?;
        if wrapped {
            self.cursor.consume_white_space()?;
            self.cursor.consume(")")?;
        }
        return Ok(Url::new(url, line));
    }

    fn parse_identifier_or_function(&mut self) -> Result<Value, ParseError> {
        let line = self.line();
        let anchor = self.cursor.anchor();
        let identifier = self.cursor.parse_identifier(false)?;
        if !self.cursor.comes("(") {
            return Ok(Value::keyword(&identifier, line));
        }
        let lowercase = identifier.to_lowercase();
        if lowercase == "url" {
            self.cursor.backtrack(anchor);
            return Ok(Value::Url(self.parse_url()?));
        }
        if CALC_FUNCTIONS.contains(&lowercase.as_str()) {
            return Ok(Value::Calc(self.parse_calc(&identifier)?));
        }
        return Ok(Value::Function(self.parse_function(&identifier)?));
    }

    /// Arguments of `name(`, which is already consumed up to the parenthesis.
    fn parse_function(&mut self, name: &str) -> Result<CssFunction, ParseError> {
        let line = self.line();
        self.cursor.consume("(")?;
        self.cursor.consume_white_space()?;
        let arguments = if self.cursor.comes(")") {
            None
        } else {
            Some(self.parse_value(&['=', ' ', ','])?)
        };
        self.cursor.consume(")")?;
        return Ok(CssFunction::new(name, arguments, ',', line));
    }

    /// The expression of a `calc()`. Strict parsing wants whitespace around
    /// binary `+` and `-`.
    fn parse_calc(&mut self, name: &str) -> Result<CalcFunction, ParseError> {
        let line = self.line();
        self.cursor.consume("(")?;
        let mut groups: Vec<Vec<CalcTerm>> = vec![Vec::new()];
        let mut expect_operand = true;
        loop {
            self.cursor.consume_white_space()?;
            if self.cursor.is_eof() {
                return Err(ParseError::unexpected(")", "", MatchType::Literal, self.line()));
            }
            let c = self.cursor.first();
            if c == ')' {
                self.cursor.bump();
                let terms = groups.pop().unwrap_or_default();
                match groups.last_mut() {
                    Some(parent) => parent.push(CalcTerm::Group(terms)),
                    None => return Ok(CalcFunction::new(name, terms, line)),
                }
                expect_operand = false;
                continue;
            }
            if expect_operand {
                if c == '(' {
                    self.cursor.bump();
                    groups.push(Vec::new());
                    continue;
                }
                let operand = self.parse_primitive_value()?;
                if let Some(terms) = groups.last_mut() {
                    terms.push(CalcTerm::Operand(operand));
                }
                expect_operand = false;
                continue;
            }
            if !matches!(c, '+' | '-' | '*' | '/') {
                return Err(ParseError::unexpected(
                    "one of + - * /",
                    self.cursor.peek_str(5),
                    MatchType::Literal,
                    self.line(),
                ));
            }
            if matches!(c, '+' | '-')
                && !self.lenient()
                && !(is_white_space(self.cursor.prev()) && is_white_space(self.cursor.second()))
            {
                return Err(ParseError::custom(
                    format!("Next token was expected to be \" {c} \", got \"{}\"", self.cursor.peek_str(3)),
                    self.line(),
                ));
            }
            self.cursor.bump();
            if let Some(terms) = groups.last_mut() {
                terms.push(CalcTerm::Operator(c));
            }
            expect_operand = true;
        }
    }

    /// `[name name]`, empty only when lenient.
    pub fn parse_line_name(&mut self) -> Result<LineName, ParseError> {
        let line = self.line();
        self.cursor.consume("[")?;
        self.cursor.consume_white_space()?;
        let mut names = Vec::new();
        loop {
            if self.cursor.comes("]") && (self.lenient() || !names.is_empty()) {
                self.cursor.bump();
                return Ok(LineName::new(names, line));
            }
            names.push(self.cursor.parse_identifier(false)?);
            self.cursor.consume_white_space()?;
        }
    }

    /// `U+` and up to six hex digits or wildcards, or a `-` separated pair,
    /// kept as written.
    fn parse_unicode_range(&mut self) -> Result<Value, ParseError> {
        let line = self.line();
        let start = self.cursor.anchor();
        self.cursor.consume_count(2)?;
        let mut length = 0;
        let mut max_length = 6;
        loop {
            if self.cursor.comes("-") {
                max_length = 13;
            }
            if self.cursor.bump().is_none() {
                break;
            }
            length += 1;
            let next = self.cursor.first();
            if length >= max_length || !(next.is_ascii_hexdigit() || next == '?' || next == '-') {
                break;
            }
        }
        return Ok(Value::keyword(self.cursor.since(start), line));
    }

    /// IE `progid:Name(key=value, ...)` filters
    fn parse_microsoft_filter(&mut self) -> Result<Value, ParseError> {
        let line = self.line();
        let name = self.cursor.skip_until(&['('], false, UntilEnd::Consume)?;
        trace!(name = name.as_str(), line, "microsoft filter");
        self.cursor.consume_white_space()?;
        let arguments = if self.cursor.comes(")") {
            None
        } else {
            Some(self.parse_value(&[',', '='])?)
        };
        self.cursor.consume(")")?;
        return Ok(Value::Function(CssFunction::new(&name, arguments, ',', line)));
    }
}
