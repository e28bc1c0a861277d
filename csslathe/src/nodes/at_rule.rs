use super::comment::{Comment, Commentable};
use super::AtRule;
use crate::render::{OutputFormat, Printer};
use crate::value::{CssString, Url, Value};

/// `@charset "utf-8";`
#[derive(Debug, Clone, PartialEq)]
pub struct Charset {
    charset: CssString,
    line_no: usize,
    comments: Vec<Comment>,
}

impl Charset {
    pub fn new(charset: CssString, line_no: usize) -> Self {
        return Self {
            charset,
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn charset(&self) -> &CssString {
        return &self.charset;
    }

    pub fn set_charset(&mut self, charset: CssString) {
        self.charset = charset;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        let mut result = printer.comments(&self.comments);
        result.push_str(&format!("@charset {};", self.charset.render(printer)));
        return result;
    }
}

/// `@import url("x") media;`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    location: Url,
    media_query: String,
    line_no: usize,
    comments: Vec<Comment>,
}

impl Import {
    pub fn new(location: Url, media_query: impl Into<String>, line_no: usize) -> Self {
        return Self {
            location,
            media_query: media_query.into(),
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn location(&self) -> &Url {
        return &self.location;
    }

    pub fn set_location(&mut self, location: Url) {
        self.location = location;
    }

    pub fn media_query(&self) -> &str {
        return &self.media_query;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        let mut result = printer.comments(&self.comments);
        result.push_str("@import ");
        result.push_str(&self.location.render(printer));
        if !self.media_query.is_empty() {
            result.push(' ');
            result.push_str(&self.media_query);
        }
        result.push(';');
        return result;
    }
}

/// `@namespace [prefix] url;` where url is a string or `url()`
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    prefix: Option<String>,
    url: Value,
    line_no: usize,
    comments: Vec<Comment>,
}

impl Namespace {
    pub fn new(prefix: Option<String>, url: Value, line_no: usize) -> Self {
        return Self {
            prefix,
            url,
            line_no,
            comments: Vec::new(),
        };
    }

    pub fn prefix(&self) -> Option<&str> {
        return self.prefix.as_deref();
    }

    pub fn set_prefix(&mut self, prefix: Option<String>) {
        self.prefix = prefix;
    }

    pub fn url(&self) -> &Value {
        return &self.url;
    }

    pub fn set_url(&mut self, url: Value) {
        self.url = url;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self, printer: &Printer) -> String {
        let mut result = printer.comments(&self.comments);
        result.push_str("@namespace ");
        if let Some(prefix) = &self.prefix {
            result.push_str(prefix);
            result.push(' ');
        }
        result.push_str(&self.url.render(printer));
        result.push(';');
        return result;
    }
}

fn default_render(value: &Value) -> String {
    let format = OutputFormat::default();
    return value.render(&format.printer());
}

impl AtRule for Charset {
    fn at_rule_name(&self) -> &str {
        return "charset";
    }

    fn at_rule_args(&self) -> String {
        return default_render(&Value::String(self.charset.clone()));
    }
}

impl AtRule for Import {
    fn at_rule_name(&self) -> &str {
        return "import";
    }

    fn at_rule_args(&self) -> String {
        let location = default_render(&Value::Url(self.location.clone()));
        if self.media_query.is_empty() {
            return location;
        }
        return format!("{location} {}", self.media_query);
    }
}

impl AtRule for Namespace {
    fn at_rule_name(&self) -> &str {
        return "namespace";
    }

    fn at_rule_args(&self) -> String {
        let url = default_render(&self.url);
        return match &self.prefix {
            Some(prefix) => format!("{prefix} {url}"),
            None => url,
        };
    }
}

macro_rules! impl_commentable {
    ($($node:ty),*) => {
        $(
            impl Commentable for $node {
                fn comments(&self) -> &[Comment] {
                    return &self.comments;
                }

                fn comments_mut(&mut self) -> &mut Vec<Comment> {
                    return &mut self.comments;
                }
            }
        )*
    };
}

impl_commentable!(Charset, Import, Namespace);

#[cfg(test)]
mod test_at_rule {
    use super::*;

    #[test]
    fn statements() {
        let format = OutputFormat::default();
        let printer = format.printer();

        let charset = Charset::new(CssString::from_raw("utf-8", 1), 1);
        assert_eq!(charset.render(&printer), "@charset \"utf-8\";");
        assert_eq!(charset.at_rule_args(), "\"utf-8\"");

        let import = Import::new(Url::new(CssString::from_raw("some/url.css", 2), 2), "screen", 2);
        assert_eq!(import.render(&printer), "@import url(\"some/url.css\") screen;");
        assert_eq!(import.at_rule_name(), "import");

        let ns = Namespace::new(
            Some("toto".to_owned()),
            Value::String(CssString::from_raw("http://toto.example.org", 3)),
            3,
        );
        assert_eq!(ns.render(&printer), "@namespace toto \"http://toto.example.org\";");
        let ns = Namespace::new(None, Value::String(CssString::from_raw("http://example.com/foo", 4)), 4);
        assert_eq!(ns.at_rule_args(), "\"http://example.com/foo\"");
    }

    #[test]
    fn comments_render_when_enabled() {
        let mut charset = Charset::new(CssString::from_raw("utf-8", 1), 1);
        charset.add_comments(vec![Comment::new("enc", 1)]);
        let format = OutputFormat::default();
        assert_eq!(charset.render(&format.printer()), "@charset \"utf-8\";");
        let mut format = OutputFormat::compact();
        format.render_comments = true;
        assert_eq!(charset.render(&format.printer()), "/*enc*/@charset \"utf-8\";");
    }
}
