//! String-aware character walking
//!
//! [`CodeChars`] iterates over the characters of a piece of (scrubbed or generated)
//! code and tells, for each one, whether it sits inside a quoted literal. Callers build
//! their own bracket tracking on top of it.
//!
//! Quotes recognized: `"`, `'` and the backtick. A backslash inside a literal escapes
//! the next character. Quote characters themselves are reported as [`Region::Code`].
//!
//! A `/` also opens a literal (a regular expression) when it cannot be a division: at
//! the start of the text or after an operator or opening bracket. `//` and `/*` never
//! open one. Inside a character class `[...]` a `/` does not close the literal.

use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Code,
    Quoted,
}

pub struct CodeChars<'a> {
    chars: CharIndices<'a>,
    quote: Option<char>,
    escaped: bool,
    in_class: bool,
    last_code: Option<char>,
}

impl<'a> CodeChars<'a> {
    pub fn new(text: &'a str) -> Self {
        CodeChars {
            chars: text.char_indices(),
            quote: None,
            escaped: false,
            in_class: false,
            last_code: None,
        }
    }

    /// Quote character of the literal the walker is currently inside, if any.
    pub fn open_quote(&self) -> Option<char> {
        self.quote
    }

    fn regex_allowed(&self) -> bool {
        let after_operator = match self.last_code {
            None => true,
            Some(c) => "(,=:[!&|?{};+-*%<>~^".contains(c),
        };
        let opens_comment = matches!(self.chars.clone().next(), Some((_, '/' | '*')));
        after_operator && !opens_comment
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char, Region);

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, c) = self.chars.next()?;

        let region = match self.quote {
            Some(_) if self.escaped => {
                self.escaped = false;
                Region::Quoted
            }
            Some(_) if c == '\\' => {
                self.escaped = true;
                Region::Quoted
            }
            Some(q) if c == q && !self.in_class => {
                self.quote = None;
                Region::Code
            }
            Some('/') if c == '[' => {
                self.in_class = true;
                Region::Quoted
            }
            Some('/') if c == ']' => {
                self.in_class = false;
                Region::Quoted
            }
            Some(_) => Region::Quoted,
            None => {
                if matches!(c, '"' | '\'' | '`') || (c == '/' && self.regex_allowed()) {
                    self.quote = Some(c);
                }
                Region::Code
            }
        };

        if region == Region::Code && !c.is_whitespace() {
            self.last_code = Some(c);
        }
        Some((offset, c, region))
    }
}

/// Closing partner of an opening bracket.
pub fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

pub fn is_closing(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}
