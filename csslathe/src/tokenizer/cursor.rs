/// Shaped after the rustc lexer cursor
/// rust-lang/rust/compiler/rustc-lexer/src/cursor.rs
/// with line bookkeeping and backtracking added.
use std::str::Chars;

use crate::config::Settings;

pub(crate) const EOF_CHAR: char = '\0';

/// Saved cursor state, restored with `Cursor::backtrack`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pos: usize,
    line: usize,
}

/// Peekable iterator over a char sequence.
///
/// Next characters can be peeked via `first` method,
/// and position can be shifted forward via `bump` method.
/// Every consumed `'\n'` advances the line counter, whichever
/// parse routine consumed it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    /// Iterator over chars. Slightly faster than a &str.
    chars: Chars<'a>,
    line: usize,
    pub(crate) settings: Settings,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str, settings: Settings) -> Cursor<'a> {
        Cursor {
            input,
            chars: input.chars(),
            line: 1,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Line of the next character, starting at 1.
    pub fn current_line(&self) -> usize {
        self.line
    }

    /// Byte offset of the next character.
    pub fn pos(&self) -> usize {
        self.input.len() - self.chars.as_str().len()
    }

    /// Everything not yet consumed.
    pub fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    /// Peeks the next symbol from the input stream without consuming it.
    /// If requested position doesn't exist, `EOF_CHAR` is returned.
    /// However, getting `EOF_CHAR` doesn't always mean actual end of file,
    /// it should be checked with `is_eof` method.
    pub(crate) fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn third(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    /// Peeks `offset` characters ahead, `peek(0)` being `first`.
    pub fn peek(&self, offset: usize) -> char {
        self.chars.clone().nth(offset).unwrap_or(EOF_CHAR)
    }

    /// Up to `len` upcoming characters as a slice.
    pub fn peek_str(&self, len: usize) -> &'a str {
        let rest = self.chars.as_str();
        let end = rest
            .char_indices()
            .nth(len)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// The last consumed character, `EOF_CHAR` at the start of input.
    pub(crate) fn prev(&self) -> char {
        self.input[..self.pos()].chars().next_back().unwrap_or(EOF_CHAR)
    }

    /// Checks if there is nothing more to consume.
    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub fn anchor(&self) -> Anchor {
        Anchor {
            pos: self.pos(),
            line: self.line,
        }
    }

    pub fn backtrack(&mut self, anchor: Anchor) {
        self.chars = self.input[anchor.pos..].chars();
        self.line = anchor.line;
    }

    /// Text consumed since `anchor`.
    pub fn since(&self, anchor: Anchor) -> &'a str {
        &self.input[anchor.pos..self.pos()]
    }

    /// Moves to the next character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Moves `n` characters ahead and returns the consumed slice,
    /// which is shorter than `n` characters at the end of input.
    pub(crate) fn bump_n(&mut self, n: usize) -> &'a str {
        let start = self.pos();
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
        &self.input[start..self.pos()]
    }

    /// Eats symbols while predicate returns true or until the end of file is reached.
    pub(crate) fn bump_while_first(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos();
        while predicate(self.first()) && !self.is_eof() {
            self.bump();
        }
        &self.input[start..self.pos()]
    }
}
