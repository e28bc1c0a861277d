use std::collections::HashMap;

use crate::nodes::Comment;

/// Whitespace and notation choices for rendering.
///
/// `OutputFormat::default()` produces the canonical form: rules packed
/// inside their block, blocks on separate lines, nested blocks indented
/// by one tab per level, no comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    pub space_after_rule_name: String,

    pub space_before_rules: String,
    pub space_between_rules: String,
    pub space_after_rules: String,

    pub space_before_blocks: String,
    pub space_between_blocks: String,
    pub space_after_blocks: String,

    pub space_after_selector_separator: String,
    pub space_before_opening_brace: String,

    /// Spacing after a value list separator, keyed by separator,
    /// falling back to `space_after_list_argument_separator`.
    pub space_after_list_argument_separators: HashMap<char, String>,
    pub space_after_list_argument_separator: String,

    pub indentation: String,
    pub semicolon_after_last_rule: bool,
    /// Print `rgb` colors with integer channels as `#rrggbb`/`#rgb`.
    pub rgb_hash_notation: bool,
    pub render_comments: bool,
}

impl Default for OutputFormat {
    fn default() -> Self {
        return Self {
            space_after_rule_name: " ".to_owned(),
            space_before_rules: String::new(),
            space_between_rules: String::new(),
            space_after_rules: String::new(),
            space_before_blocks: String::new(),
            space_between_blocks: "\n".to_owned(),
            space_after_blocks: String::new(),
            space_after_selector_separator: " ".to_owned(),
            space_before_opening_brace: " ".to_owned(),
            space_after_list_argument_separators: HashMap::new(),
            space_after_list_argument_separator: String::new(),
            indentation: "\t".to_owned(),
            semicolon_after_last_rule: true,
            rgb_hash_notation: true,
            render_comments: false,
        };
    }
}

impl OutputFormat {
    pub fn create() -> Self {
        return Self::default();
    }

    /// No optional whitespace at all.
    pub fn compact() -> Self {
        return Self {
            space_after_rule_name: String::new(),
            space_between_blocks: String::new(),
            space_after_selector_separator: String::new(),
            space_before_opening_brace: String::new(),
            ..Self::default()
        };
    }

    /// One rule or block per line, comments included.
    pub fn pretty() -> Self {
        let mut list_spacing = HashMap::new();
        list_spacing.insert(',', " ".to_owned());
        return Self {
            space_before_rules: "\n".to_owned(),
            space_between_rules: "\n".to_owned(),
            space_after_rules: "\n".to_owned(),
            space_before_blocks: "\n".to_owned(),
            space_between_blocks: "\n\n".to_owned(),
            space_after_blocks: "\n".to_owned(),
            space_after_list_argument_separators: list_spacing,
            render_comments: true,
            ..Self::default()
        };
    }

    pub fn printer(&self) -> Printer<'_> {
        return Printer {
            format: self,
            level: 0,
        };
    }
}

/// An `OutputFormat` at a given nesting level
#[derive(Debug, Clone, Copy)]
pub struct Printer<'f> {
    pub format: &'f OutputFormat,
    level: usize,
}

impl<'f> Printer<'f> {
    pub fn level(&self) -> usize {
        return self.level;
    }

    pub fn next_level(&self) -> Self {
        return Self {
            format: self.format,
            level: self.level + 1,
        };
    }

    fn indent(&self) -> String {
        return self.format.indentation.repeat(self.level);
    }

    /// Every newline of `space` continues at the current indentation.
    fn prepare_space(&self, space: &str) -> String {
        if self.level == 0 || !space.contains('\n') {
            return space.to_owned();
        }
        return space.replace('\n', &format!("\n{}", self.indent()));
    }

    pub fn space_after_rule_name(&self) -> &str {
        return &self.format.space_after_rule_name;
    }

    pub fn space_before_rules(&self) -> String {
        return self.prepare_space(&self.format.space_before_rules);
    }

    pub fn space_between_rules(&self) -> String {
        return self.prepare_space(&self.format.space_between_rules);
    }

    pub fn space_after_rules(&self) -> String {
        return self.prepare_space(&self.format.space_after_rules);
    }

    pub fn space_before_blocks(&self) -> String {
        return self.prepare_space(&self.format.space_before_blocks);
    }

    pub fn space_between_blocks(&self) -> String {
        return self.prepare_space(&self.format.space_between_blocks);
    }

    pub fn space_after_blocks(&self) -> String {
        return self.prepare_space(&self.format.space_after_blocks);
    }

    pub fn space_after_selector_separator(&self) -> &str {
        return &self.format.space_after_selector_separator;
    }

    pub fn space_before_opening_brace(&self) -> &str {
        return &self.format.space_before_opening_brace;
    }

    pub fn space_after_list_argument_separator(&self, separator: char) -> &str {
        return self
            .format
            .space_after_list_argument_separators
            .get(&separator)
            .unwrap_or(&self.format.space_after_list_argument_separator);
    }

    pub fn remove_last_semicolon(&self, rendered: String) -> String {
        if self.format.semicolon_after_last_rule {
            return rendered;
        }
        return match rendered.rfind(';') {
            Some(i) => format!("{}{}", &rendered[..i], &rendered[i + 1..]),
            None => rendered,
        };
    }

    /// Rendered comments, each followed by the block spacing.
    pub fn comments(&self, comments: &[Comment]) -> String {
        if !self.format.render_comments || comments.is_empty() {
            return String::new();
        }
        let mut result = String::new();
        for (i, comment) in comments.iter().enumerate() {
            result.push_str(&comment.render());
            if i + 1 == comments.len() {
                result.push_str(&self.space_after_blocks());
            } else {
                result.push_str(&self.space_between_blocks());
            }
        }
        return result;
    }
}

#[cfg(test)]
mod test_render {
    use super::*;

    #[test]
    fn spacing_follows_level() {
        let format = OutputFormat::default();
        let root = format.printer();
        assert_eq!(root.space_between_blocks(), "\n");
        assert_eq!(root.next_level().space_between_blocks(), "\n\t");
        assert_eq!(root.next_level().next_level().space_between_blocks(), "\n\t\t");
        assert_eq!(root.next_level().space_between_rules(), "");
    }

    #[test]
    fn list_separators() {
        let pretty = OutputFormat::pretty();
        let printer = pretty.printer();
        assert_eq!(printer.space_after_list_argument_separator(','), " ");
        assert_eq!(printer.space_after_list_argument_separator('/'), "");
        assert_eq!(OutputFormat::default().printer().space_after_list_argument_separator(','), "");
    }

    #[test]
    fn last_semicolon() {
        let mut format = OutputFormat::compact();
        assert_eq!(format.printer().remove_last_semicolon("a:b;c:d;".to_owned()), "a:b;c:d;");
        format.semicolon_after_last_rule = false;
        assert_eq!(format.printer().remove_last_semicolon("a:b;c:d;".to_owned()), "a:b;c:d");
        assert_eq!(format.printer().remove_last_semicolon(String::new()), "");
    }

    #[test]
    fn comments_only_when_enabled() {
        let comments = vec![Comment::new(" one ", 1), Comment::new("two", 2)];
        assert_eq!(OutputFormat::default().printer().comments(&comments), "");
        let pretty = OutputFormat::pretty();
        assert_eq!(pretty.printer().comments(&comments), "/* one */\n\n/*two*/\n");
    }
}
