use crate::render::Printer;
use crate::tokenizer::extra::{escape_string, unescape};

/// A quoted string. The escaped source text is stored as written, so
/// escapes like `\"` or `\A` render back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct CssString {
    raw: String,
    line_no: usize,
}

impl CssString {
    /// From decoded content, escaping what needs escaping.
    pub fn new(content: &str, line_no: usize) -> Self {
        return Self {
            raw: escape_string(content),
            line_no,
        };
    }

    /// From already escaped content.
    pub fn from_raw(raw: impl Into<String>, line_no: usize) -> Self {
        return Self {
            raw: raw.into(),
            line_no,
        };
    }

    /// The decoded content.
    pub fn string(&self) -> String {
        return unescape(&self.raw);
    }

    pub fn raw(&self) -> &str {
        return &self.raw;
    }

    pub fn set_string(&mut self, content: &str) {
        self.raw = escape_string(content);
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, _printer: &Printer) -> String {
        let mut result = String::with_capacity(self.raw.len() + 2);
        result.push('"');
        let mut chars = self.raw.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    result.push(c);
                    if let Some(next) = chars.next() {
                        result.push(next);
                    }
                }
                '"' => result.push_str("\\\""),
                '\n' => result.push_str("\\A "),
                _ => result.push(c),
            }
        }
        result.push('"');
        return result;
    }
}

/// `url(...)`, always rendered with a quoted argument
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    url: CssString,
    line_no: usize,
}

impl Url {
    pub fn new(url: CssString, line_no: usize) -> Self {
        return Self { url, line_no };
    }

    pub fn url(&self) -> &CssString {
        return &self.url;
    }

    pub fn set_url(&mut self, url: CssString) {
        self.url = url;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        return format!("url({})", self.url.render(printer));
    }
}
