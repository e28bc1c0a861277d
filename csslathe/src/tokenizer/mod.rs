/// Character-level primitives every parse routine is built on:
/// literal and pattern matching, identifier and escape decoding,
/// comment capture and bounded searches.
///
/// Whitespace and comments are never skipped implicitly, callers ask for it
/// with `consume_white_space` and receive the comments that were in the way.

mod cursor;
pub mod extra;

use std::sync::OnceLock;

use regex::Regex;

pub use cursor::{Anchor, Cursor};
pub(crate) use cursor::EOF_CHAR;

use crate::nodes::Comment;
use crate::parser::css_error::{MatchType, ParseError};

/// What `consume_until` does with the end character it stopped at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntilEnd {
    /// leave it in the input
    Leave,
    /// consume it but keep it out of the result
    Consume,
    /// consume it and append it to the result
    Include,
}

/// One source character after escape decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Plain(char),
    Escaped(char),
    /// backslash followed by a line break
    Continuation,
}

fn hex_escape_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new("^[0-9a-fA-F]{1,6}").expect("hex escape regex"))
}

impl<'a> Cursor<'a> {
    pub fn comes(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn comes_ignore_case(&self, s: &str) -> bool {
        self.rest()
            .get(..s.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(s))
    }

    fn unexpected(&self, expected: impl Into<String>, match_type: MatchType) -> ParseError {
        ParseError::unexpected(expected, self.peek_str(5), match_type, self.current_line())
    }

    /// Consumes `expected` or fails without moving.
    pub fn consume(&mut self, expected: &str) -> Result<&'a str, ParseError> {
        if !self.comes(expected) {
            return Err(self.unexpected(expected, MatchType::Literal));
        }
        Ok(self.bump_n(expected.chars().count()))
    }

    pub fn consume_ignore_case(&mut self, expected: &str) -> Result<&'a str, ParseError> {
        if !self.comes_ignore_case(expected) {
            return Err(self.unexpected(expected, MatchType::Literal));
        }
        Ok(self.bump_n(expected.chars().count()))
    }

    /// Consumes exactly `count` characters.
    pub fn consume_count(&mut self, count: usize) -> Result<&'a str, ParseError> {
        if self.peek_str(count).chars().count() < count {
            return Err(self.unexpected(count.to_string(), MatchType::Count));
        }
        Ok(self.bump_n(count))
    }

    /// Consumes the match of an `^`-anchored pattern.
    pub fn consume_expression(&mut self, rx: &Regex) -> Result<&'a str, ParseError> {
        let matched = match rx.find(self.rest()) {
            Some(m) if m.start() == 0 && !m.is_empty() => m.as_str(),
            _ => return Err(self.unexpected(rx.as_str(), MatchType::Expression)),
        };
        Ok(self.bump_n(matched.chars().count()))
    }

    /// Skips whitespace and comments, handing back the comments.
    /// An unterminated comment runs to the end of input when lenient.
    pub fn consume_white_space(&mut self) -> Result<Vec<Comment>, ParseError> {
        let mut comments = Vec::new();
        loop {
            self.bump_while_first(is_white_space);
            match self.consume_comment() {
                Ok(Some(comment)) => comments.push(comment),
                Ok(None) => break,
                Err(_) if self.settings.lenient_parsing => {
                    self.bump_while_first(|_| true);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(comments)
    }

    pub fn consume_comment(&mut self) -> Result<Option<Comment>, ParseError> {
        if !self.comes("/*") {
            return Ok(None);
        }
        let line = self.current_line();
        let body = &self.rest()[2..];
        let Some(end) = body.find("*/") else {
            return Err(self.unexpected("*/", MatchType::Search));
        };
        let text = &body[..end];
        self.bump_n(text.chars().count() + 4);
        Ok(Some(Comment::new(text, line)))
    }

    /// Consumes up to the first of `ends`, stripping comments on the way.
    /// Reaching the end of input is an error unless `allow_eof`, and then
    /// nothing is consumed.
    pub fn consume_until(
        &mut self,
        ends: &[char],
        allow_eof: bool,
        mode: UntilEnd,
        comments: &mut Vec<Comment>,
    ) -> Result<String, ParseError> {
        let start = self.anchor();
        let mut out = String::new();
        loop {
            let before = self.anchor();
            let Some(c) = self.bump() else {
                break;
            };
            if ends.contains(&c) {
                match mode {
                    UntilEnd::Leave => self.backtrack(before),
                    UntilEnd::Consume => {}
                    UntilEnd::Include => out.push(c),
                }
                return Ok(out);
            }
            out.push(c);
            if let Some(comment) = self.consume_comment()? {
                comments.push(comment);
            }
        }
        if allow_eof {
            return Ok(out);
        }
        self.backtrack(start);
        let expected: String = ends.iter().collect();
        Err(self.unexpected(format!("one of \"{expected}\""), MatchType::Search))
    }

    /// `consume_until` for callers that drop the comments.
    pub fn skip_until(&mut self, ends: &[char], allow_eof: bool, mode: UntilEnd) -> Result<String, ParseError> {
        let mut comments = Vec::new();
        self.consume_until(ends, allow_eof, mode, &mut comments)
    }

    /// Decodes the next character. Escapes are resolved; for identifiers only
    /// identifier characters are accepted and `None` marks the end.
    pub fn parse_character(&mut self, for_identifier: bool) -> Result<Option<Piece>, ParseError> {
        if self.first() == '\\' {
            if for_identifier
                && self.settings.lenient_parsing
                && (self.comes("\\0") || self.comes("\\9"))
            {
                // IE hacks are not part of the identifier
                return Ok(None);
            }
            self.bump();
            if self.is_eof() {
                return Err(self.unexpected("escaped character", MatchType::Count));
            }
            if matches!(self.first(), '\n' | '\r') {
                return Ok(Some(Piece::Continuation));
            }
            if !self.first().is_ascii_hexdigit() {
                return Ok(self.bump().map(Piece::Escaped));
            }
            let hex = self.consume_expression(hex_escape_rx())?;
            if hex.len() < 6 {
                if self.comes("\r\n") {
                    self.bump_n(2);
                } else if is_white_space(self.first()) {
                    self.bump();
                }
            }
            let decoded = u32::from_str_radix(hex, 16)
                .ok()
                .filter(|u| *u != 0)
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Ok(Some(Piece::Escaped(decoded)));
        }
        if self.is_eof() {
            return Ok(None);
        }
        let c = self.first();
        if for_identifier && !self.is_identifier_char(c) {
            return Ok(None);
        }
        Ok(self.bump().map(Piece::Plain))
    }

    fn is_identifier_char(&self, c: char) -> bool {
        if c.is_ascii() {
            return c.is_ascii_alphanumeric() || c == '-' || c == '_';
        }
        if self.settings.multibyte_support {
            c >= '\u{a0}'
        } else {
            c > '\u{a1}'
        }
    }

    /// Reads an identifier. Escaped characters that could not appear
    /// unescaped stay escaped, so the text renders back as it was written.
    pub fn parse_identifier(&mut self, ignore_case: bool) -> Result<String, ParseError> {
        if self.is_eof() {
            return Err(ParseError::unexpected("", "", MatchType::Identifier, self.current_line()));
        }
        let Some(first) = self.parse_character(true)? else {
            return Err(self.unexpected("", MatchType::Identifier));
        };
        let mut result = String::new();
        push_identifier_piece(&mut result, first);
        while !self.is_eof() {
            match self.parse_character(true)? {
                Some(piece) => push_identifier_piece(&mut result, piece),
                None => break,
            }
        }
        if ignore_case {
            result = result.to_lowercase();
        }
        Ok(result)
    }

    /// https://drafts.csswg.org/css-syntax/#starts-with-a-number
    pub fn is_number_seq_start(&self) -> bool {
        match self.first() {
            '+' | '-' => match self.second() {
                c if c.is_ascii_digit() => true,
                '.' => self.third().is_ascii_digit(),
                _ => false,
            },
            '.' => self.second().is_ascii_digit(),
            c => c.is_ascii_digit(),
        }
    }
}

fn push_identifier_piece(result: &mut String, piece: Piece) {
    match piece {
        Piece::Plain(c) => result.push(c),
        Piece::Escaped(c) if is_unescaped_identifier_char(c) => result.push(c),
        Piece::Escaped(c) => {
            result.push('\\');
            result.push(c);
        }
        Piece::Continuation => {}
    }
}

/// Characters an identifier may carry without a backslash
pub fn is_unescaped_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c >= '\u{a0}'
}

pub fn is_white_space(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\n' || ch == '\x0c' || ch == '\r' || ch == '\x0b'
}

#[cfg(test)]
mod test_tokenizer {
    use super::*;
    use crate::config::Settings;

    fn lenient(text: &str) -> Cursor<'_> {
        Cursor::new(text, Settings::default())
    }

    fn strict(text: &str) -> Cursor<'_> {
        Cursor::new(text, Settings::default().be_strict())
    }

    #[test]
    fn literals() {
        let mut cur = lenient("url(x)");
        assert!(cur.comes("url"));
        assert!(cur.comes_ignore_case("URL("));
        assert!(cur.consume("uri").is_err());
        assert_eq!(cur.consume_ignore_case("URL").unwrap(), "url");
        assert_eq!(cur.consume_count(2).unwrap(), "(x");
        assert!(cur.consume_count(2).is_err());
        assert_eq!(cur.consume(")").unwrap(), ")");
        assert!(cur.is_eof());
    }

    #[test]
    fn identifiers() {
        assert_eq!(lenient("Color:").parse_identifier(true).unwrap(), "color");
        assert_eq!(lenient("Verdana,").parse_identifier(false).unwrap(), "Verdana");
        assert_eq!(lenient("--Custom-Prop").parse_identifier(false).unwrap(), "--Custom-Prop");
        assert_eq!(lenient(r"f\;ont:").parse_identifier(true).unwrap(), r"f\;ont");
        assert_eq!(lenient(r"Awesome\ 5 Pro").parse_identifier(false).unwrap(), r"Awesome\ 5");
        assert_eq!(lenient(r"Awesome\} 5").parse_identifier(false).unwrap(), r"Awesome\}");
        assert_eq!(lenient(r"\31 23").parse_identifier(false).unwrap(), "123");
        assert_eq!(lenient(r"\E9 t\E9").parse_identifier(false).unwrap(), "été");
        assert!(lenient(":").parse_identifier(false).is_err());
        assert!(lenient("").parse_identifier(false).is_err());
    }

    #[test]
    fn ie_hacks_end_identifiers_when_lenient() {
        let mut cur = lenient(r"red\9");
        assert_eq!(cur.parse_identifier(false).unwrap(), "red");
        assert_eq!(cur.rest(), r"\9");

        let mut cur = strict(r"red\9 ");
        assert_eq!(cur.parse_identifier(false).unwrap(), "red\\\t");
    }

    #[test]
    fn multibyte_threshold() {
        let text = "a\u{a1}b";
        assert_eq!(lenient(text).parse_identifier(false).unwrap(), text);
        let mut cur = Cursor::new(text, Settings::default().with_multibyte_support(false));
        assert_eq!(cur.parse_identifier(false).unwrap(), "a");
    }

    #[test]
    fn white_space_and_comments() {
        let mut cur = lenient("  /* one */\n /** two **/ x");
        let comments = cur.consume_white_space().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text(), " one ");
        assert_eq!(comments[1].text(), "* two *");
        assert_eq!(comments[1].line_no(), 2);
        assert_eq!(cur.first(), 'x');

        let mut cur = lenient(" /* never closed");
        assert!(cur.consume_white_space().unwrap().is_empty());
        assert!(cur.is_eof());

        let mut cur = strict(" /* never closed");
        assert!(cur.consume_white_space().is_err());
    }

    #[test]
    fn consume_until_modes() {
        let mut comments = Vec::new();
        let mut cur = lenient(".a /* c */ .b {x}");
        let text = cur.consume_until(&['{'], false, UntilEnd::Leave, &mut comments).unwrap();
        assert_eq!(text, ".a  .b ");
        assert_eq!(comments.len(), 1);
        assert_eq!(cur.first(), '{');

        let mut cur = lenient("x;y");
        assert_eq!(cur.skip_until(&[';'], false, UntilEnd::Include).unwrap(), "x;");
        assert_eq!(cur.rest(), "y");

        let mut cur = lenient("x;y");
        assert_eq!(cur.skip_until(&[';'], false, UntilEnd::Consume).unwrap(), "x");
        assert_eq!(cur.rest(), "y");

        let mut cur = lenient("abc\nd");
        assert!(cur.skip_until(&['{'], false, UntilEnd::Leave).is_err());
        assert_eq!(cur.rest(), "abc\nd");
        assert_eq!(cur.current_line(), 1);
        assert_eq!(cur.skip_until(&['{'], true, UntilEnd::Leave).unwrap(), "abc\nd");
        assert_eq!(cur.current_line(), 2);
    }

    #[test]
    fn number_starts() {
        assert!(lenient("10px").is_number_seq_start());
        assert!(lenient("-.6em").is_number_seq_start());
        assert!(lenient("+5").is_number_seq_start());
        assert!(lenient(".5").is_number_seq_start());
        assert!(!lenient("-moz").is_number_seq_start());
        assert!(!lenient(".a").is_number_seq_start());
    }
}
