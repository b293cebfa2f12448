//! Base tokenization for unv source
//!
//! This is the entry point where source strings become token streams. The token set is
//! deliberately coarse: the transpiler is line-oriented and only needs to know where
//! string literals and comments start and end.
//!
//!     "..." / '...'     string literal, any backslash escape allowed, may span lines
//!     ### ... ###       block comment, shortest match, may span lines
//!     # ...             line comment, up to (not including) the newline
//!
//! An opening quote without a closing partner is not a string: it is reported as a
//! one-character [`Token::Text`] and lexing resumes right after it. An opening `###`
//! without a closing partner degrades to a line comment.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    #[token("\"", |lex| quoted(lex, '"'))]
    DoubleQuoted,

    #[token("'", |lex| quoted(lex, '\''))]
    SingleQuoted,

    #[token("#", comment)]
    Comment,

    #[regex(r#"[^"'#]+"#)]
    Text,
}

impl Token {
    pub fn is_string(&self) -> bool {
        matches!(self, Token::DoubleQuoted | Token::SingleQuoted)
    }
}

/// Consume a string body up to and including the closing `quote`.
///
/// Returns false (leaving the lexer where it was) if the input ends first.
fn quoted(lex: &mut Lexer<Token>, quote: char) -> bool {
    let mut chars = lex.remainder().char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            if chars.next().is_none() {
                return false;
            }
        } else if c == quote {
            lex.bump(i + c.len_utf8());
            return true;
        }
    }
    false
}

/// Consume a block comment if `###` is closed somewhere, a line comment otherwise.
fn comment(lex: &mut Lexer<Token>) -> bool {
    let rest = lex.remainder();
    if let Some(body) = rest.strip_prefix("##") {
        if let Some(close) = body.find("###") {
            lex.bump(2 + close + 3);
            return true;
        }
    }
    let eol = rest.find('\n').unwrap_or(rest.len());
    lex.bump(eol);
    true
}

/// Tokenize source code with location information.
///
/// Unmatched quotes come back as [`Token::Text`] covering the quote character alone, so
/// the spans always tile the whole input.
pub fn tokenize(source: &str) -> Vec<(Token, logos::Span)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => tokens.push((Token::Text, lexer.span())),
        }
    }

    tokens
}
