use super::cursor::Cursor;
use crate::config::Settings;

/// Resolves backslash escapes in string content.
/// Escaped line breaks are removed, everything else is kept.
pub fn unescape(content: &str) -> String {
    let mut cur = Cursor::new(content, Settings::default());
    let mut res = String::new();
    while !cur.is_eof() {
        if !escape(&mut cur, &mut res) {
            if let Some(ch) = cur.bump() {
                res.push(ch);
            }
        }
    }
    res
}

/// Escapes `"`, `\` and line breaks so `value` can sit between double quotes.
pub fn escape_string(value: &str) -> String {
    let mut res = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => res.push_str("\\\""),
            '\\' => res.push_str("\\\\"),
            '\n' => res.push_str("\\A "),
            _ => res.push(ch),
        }
    }
    res
}

fn escape(cur: &mut Cursor, result: &mut String) -> bool {
    if cur.first() != '\\' {
        return false;
    }
    cur.bump();
    let mut ch = cur.first();
    let mut hex_str = String::new();
    while hex_str.len() < 6 && ch.is_ascii_hexdigit() {
        hex_str.push(ch);
        cur.bump();
        ch = cur.first();
    }
    if !hex_str.is_empty() {
        let c = u32::from_str_radix(&hex_str, 16)
            .ok()
            .filter(|u| *u != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        result.push(c);

        // optional whitespace or new line, not part of result text
        if ch == ' ' || ch == '\t' {
            cur.bump();
        } else {
            newline(cur);
        }
        return true;
    }
    if newline(cur) {
        return true;
    }
    if let Some(ch) = cur.bump() {
        result.push(ch);
    }
    true
}

fn newline(cur: &mut Cursor) -> bool {
    let ch = cur.first();
    if ch == '\r' || ch == '\x0c' || ch == '\n' {
        cur.bump();
        if ch == '\r' && cur.first() == '\n' {
            cur.bump();
        }
        return true;
    }
    false
}

#[cfg(test)]
mod extra_test {
    use super::{escape_string, unescape};

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"\34"#), "4");
        assert_eq!(unescape(r#"\1f60e"#), "\u{1f60e}");
        assert_eq!(unescape(r#"\1F916 "#), "\u{1f916}");
        assert_eq!(unescape(r#"a \"b\" c"#), "a \"b\" c");
        assert_eq!(unescape("line\\\nbreak"), "linebreak");
        assert_eq!(unescape(r#"red\ABC"#), "red\u{abc}");
        assert_eq!(unescape("plain text"), "plain text");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("say \"hi\""), r#"say \"hi\""#);
        assert_eq!(escape_string("a\\b"), r"a\\b");
        assert_eq!(escape_string("two\nlines"), r"two\A lines");
        assert_eq!(unescape(&escape_string("say \"hi\" \\ ok")), "say \"hi\" \\ ok");
    }
}
