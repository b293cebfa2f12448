//! Line Classification
//!
//! Decides, for one scrubbed line, whether it opens a block, is blank, or is an ordinary
//! statement. Classification only looks at the start of the line, which is why the
//! scrubber has to run first: after scrubbing no line can start inside a string literal.
//!
//! Block openers are a fixed keyword vocabulary followed by the header args:
//!
//!     if <cond>                  ->  if (<cond>) {
//!     else                       ->  else {
//!     else if <cond>             ->  else if (<cond>) {
//!     async function* name(a)    ->  async function* name(a) {
//!     class Name extends Base    ->  class Name extends Base {

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:async\s+)?function\*?|if|else|switch|try|catch|finally|class|do|while|for)(?:\s+(.*?))?\s*:?\s*$",
    )
    .expect("block opener pattern is valid")
});

static ELSE_IF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^if\s+(.+)$").expect("else-if pattern is valid"));

/// One line of scrubbed source split into indentation and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub raw: &'a str,
    /// Number of leading whitespace characters.
    pub indent: usize,
    pub content: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(raw: &'a str) -> Self {
        let content = raw.trim_start();
        let whitespace = &raw[..raw.len() - content.len()];
        Line {
            raw,
            indent: whitespace.chars().count(),
            content,
        }
    }

    /// The leading whitespace, exactly as written.
    pub fn indentation(&self) -> &'a str {
        &self.raw[..self.raw.len() - self.content.len()]
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim_end().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKeyword {
    If,
    Else,
    Switch,
    Try,
    Catch,
    Finally,
    Class,
    Do,
    While,
    For,
    Function,
}

/// How header args are rendered between the keyword and the opening brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Args are a condition and get parenthesized.
    Condition,
    /// Args already form valid target syntax and are copied as-is.
    Definition,
}

impl BlockKeyword {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "if" => BlockKeyword::If,
            "else" => BlockKeyword::Else,
            "switch" => BlockKeyword::Switch,
            "try" => BlockKeyword::Try,
            "catch" => BlockKeyword::Catch,
            "finally" => BlockKeyword::Finally,
            "class" => BlockKeyword::Class,
            "do" => BlockKeyword::Do,
            "while" => BlockKeyword::While,
            "for" => BlockKeyword::For,
            _ => BlockKeyword::Function,
        }
    }

    pub fn style(&self) -> HeaderStyle {
        match self {
            BlockKeyword::Function | BlockKeyword::Class | BlockKeyword::Try => {
                HeaderStyle::Definition
            }
            _ => HeaderStyle::Condition,
        }
    }

    /// Continuation keywords may stand alone (`else`, `try`, ...).
    pub fn allows_bare(&self) -> bool {
        matches!(
            self,
            BlockKeyword::Else
                | BlockKeyword::Try
                | BlockKeyword::Catch
                | BlockKeyword::Finally
                | BlockKeyword::Do
        )
    }
}

/// A recognized block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader<'a> {
    pub keyword: BlockKeyword,
    /// The keyword as written, e.g. `async function*`.
    pub keyword_text: &'a str,
    pub args: Option<&'a str>,
}

impl BlockHeader<'_> {
    /// Render the header in target syntax, without the opening brace.
    pub fn render(&self) -> String {
        let keyword = self.keyword_text;
        match (self.keyword, self.args) {
            (_, None) => keyword.to_string(),
            (BlockKeyword::Else, Some(args)) => match ELSE_IF.captures(args) {
                Some(caps) => format!("{} if ({})", keyword, &caps[1]),
                None => format!("{} {}", keyword, args),
            },
            (kw, Some(args)) => match kw.style() {
                HeaderStyle::Condition => format!("{} ({})", keyword, args),
                HeaderStyle::Definition => format!("{} {}", keyword, args),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType<'a> {
    Blank,
    BlockOpener(BlockHeader<'a>),
    Statement,
}

/// Determine the type of a scrubbed line.
///
/// Classification order:
/// 1. Blank lines (whitespace only)
/// 2. Block openers: known keyword at the start of the content, followed by args or,
///    for continuation keywords, by nothing. A Python-style trailing colon is dropped.
/// 3. Everything else is a statement
pub fn classify_line<'a>(line: &Line<'a>) -> LineType<'a> {
    if line.is_blank() {
        return LineType::Blank;
    }

    let Some(caps) = BLOCK_OPENER.captures(line.content) else {
        return LineType::Statement;
    };

    let keyword_text = caps.get(1).map_or("", |m| m.as_str());
    let keyword = BlockKeyword::from_keyword(keyword_text);
    let args = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|args| !args.is_empty());

    if args.is_none() && !keyword.allows_bare() {
        return LineType::Statement;
    }

    LineType::BlockOpener(BlockHeader {
        keyword,
        keyword_text,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(source: &str) -> Option<String> {
        match classify_line(&Line::new(source)) {
            LineType::BlockOpener(header) => Some(header.render()),
            _ => None,
        }
    }

    #[test]
    fn test_line_split() {
        let line = Line::new("  \tprint(x)");
        assert_eq!(line.indent, 3);
        assert_eq!(line.indentation(), "  \t");
        assert_eq!(line.content, "print(x)");
    }

    #[test]
    fn test_classify_blank_line() {
        assert_eq!(classify_line(&Line::new("    ")), LineType::Blank);
        assert_eq!(classify_line(&Line::new("")), LineType::Blank);
    }

    #[test]
    fn test_condition_keywords_parenthesize() {
        assert_eq!(header("if x > 1"), Some("if (x > 1)".into()));
        assert_eq!(header("while running"), Some("while (running)".into()));
        assert_eq!(header("for item of items"), Some("for (item of items)".into()));
        assert_eq!(header("switch kind"), Some("switch (kind)".into()));
        assert_eq!(header("catch error"), Some("catch (error)".into()));
    }

    #[test]
    fn test_definition_keywords_keep_args() {
        assert_eq!(header("function add(a, b)"), Some("function add(a, b)".into()));
        assert_eq!(
            header("async function* walk(tree)"),
            Some("async function* walk(tree)".into())
        );
        assert_eq!(
            header("class Point extends Base"),
            Some("class Point extends Base".into())
        );
    }

    #[test]
    fn test_continuation_keywords_alone() {
        assert_eq!(header("else"), Some("else".into()));
        assert_eq!(header("try"), Some("try".into()));
        assert_eq!(header("finally"), Some("finally".into()));
    }

    #[test]
    fn test_else_if() {
        assert_eq!(header("else if x == 2"), Some("else if (x == 2)".into()));
    }

    #[test]
    fn test_trailing_colon_dropped() {
        assert_eq!(header("if ready:"), Some("if (ready)".into()));
        assert_eq!(header("else:"), Some("else".into()));
    }

    #[test]
    fn test_bare_condition_keyword_is_statement() {
        assert_eq!(classify_line(&Line::new("if")), LineType::Statement);
        assert_eq!(classify_line(&Line::new("while   ")), LineType::Statement);
    }

    #[test]
    fn test_keyword_prefix_is_not_opener() {
        assert_eq!(classify_line(&Line::new("iffy = 1")), LineType::Statement);
        assert_eq!(classify_line(&Line::new("format(x)")), LineType::Statement);
        assert_eq!(classify_line(&Line::new("double = 2")), LineType::Statement);
    }

    #[test]
    fn test_string_contents_never_open_blocks() {
        assert_eq!(
            classify_line(&Line::new("x = \"if something\"")),
            LineType::Statement
        );
    }
}
