//! Compile stage
//!
//! Turns generated code into something the executor can load. Two syntax extensions
//! can be enabled, applied line by line in this order:
//!
//!     typescript   function f(a: number, b?: T = 1): R {   ->  function f(a, b = 1) {
//!                  const total: number = 0                  ->  const total = 0
//!     imports      import {print, int as i} from 'standard'
//!                      ->  const { print, int: i } = require('standard');
//!                  import * as std from 'standard'          ->  const std = require('standard');
//!                  import 'standard'                        ->  require('standard');
//!
//! Afterwards brackets must balance outside string and regular expression literals. The
//! stage never reorders or merges lines, so every error names the line it was found on in
//! the generated code.

use crate::unv::lexing::delimiters::{closing_for, is_closing, CodeChars, Region};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static FUNCTION_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\b[^(]*\(").expect("function pattern is valid"));

static TYPED_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*(?:export\s+)?(?:let|var|const)\s+[A-Za-z_$][A-Za-z0-9_$]*)\s*\??\s*:")
        .expect("declaration pattern is valid")
});

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*)import\s*\{([^}]*)\}\s*from\s*("[^"]*"|'[^']*')\s*;?\s*$"#)
        .expect("named import pattern is valid")
});

static NAMESPACE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\s*)import\s*\*\s*as\s+([A-Za-z_$][A-Za-z0-9_$]*)\s+from\s*("[^"]*"|'[^']*')\s*;?\s*$"#,
    )
    .expect("namespace import pattern is valid")
});

static BARE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*)import\s*("[^"]*"|'[^']*')\s*;?\s*$"#)
        .expect("bare import pattern is valid")
});

/// Source-level extensions the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxExtension {
    Typescript,
    Imports,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub extensions: Vec<SyntaxExtension>,
}

impl CompileOptions {
    /// Validation only.
    pub fn none() -> Self {
        CompileOptions {
            extensions: Vec::new(),
        }
    }

    pub fn enabled(&self, extension: SyntaxExtension) -> bool {
        self.extensions.contains(&extension)
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            extensions: vec![SyntaxExtension::Typescript, SyntaxExtension::Imports],
        }
    }
}

/// Output of the compile stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub code: String,
    /// Extensions that were applied to produce `code`.
    pub extensions: Vec<SyntaxExtension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: unexpected `{found}`")]
    UnexpectedDelimiter { line: usize, found: char },
    #[error("line {line}: expected `{expected}` but found `{found}`")]
    MismatchedDelimiter {
        line: usize,
        expected: char,
        found: char,
    },
    #[error("line {line}: `{open}` is never closed")]
    Unclosed { line: usize, open: char },
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
}

impl CompileError {
    /// 1-based line of the generated code the error points at.
    pub fn line(&self) -> usize {
        match self {
            CompileError::UnexpectedDelimiter { line, .. }
            | CompileError::MismatchedDelimiter { line, .. }
            | CompileError::Unclosed { line, .. }
            | CompileError::UnterminatedString { line } => *line,
        }
    }
}

pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str, options: &CompileOptions)
        -> Result<CompiledUnit, CompileError>;
}

/// The built-in compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceCompiler;

impl SourceCompiler {
    pub fn new() -> Self {
        SourceCompiler
    }
}

impl Compiler for SourceCompiler {
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompiledUnit, CompileError> {
        let mut code = source.to_string();
        if options.enabled(SyntaxExtension::Typescript) {
            code = map_lines(&code, strip_types);
        }
        if options.enabled(SyntaxExtension::Imports) {
            code = map_lines(&code, lower_import);
        }

        validate_delimiters(&code)?;
        tracing::debug!(
            extensions = ?options.extensions,
            lines = code.lines().count(),
            "compiled unit"
        );

        Ok(CompiledUnit {
            code,
            extensions: options.extensions.clone(),
        })
    }
}

fn map_lines(code: &str, transform: impl Fn(&str) -> String) -> String {
    code.split('\n').map(transform).collect::<Vec<_>>().join("\n")
}

/// Check that `()[]{}` balance outside string and regular expression literals, and that
/// no single-quoted, double-quoted or regular expression literal runs past the end of
/// its line.
pub fn validate_delimiters(code: &str) -> Result<(), CompileError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = CodeChars::new(code);

    while let Some((_, c, region)) = chars.next() {
        if c == '\n' {
            if matches!(chars.open_quote(), Some('"' | '\'' | '/')) {
                return Err(CompileError::UnterminatedString { line: quote_line });
            }
            line += 1;
            continue;
        }
        if region == Region::Quoted {
            continue;
        }
        if matches!(c, '"' | '\'' | '`' | '/') {
            if chars.open_quote().is_some() {
                quote_line = line;
            }
            continue;
        }

        if closing_for(c).is_some() {
            open.push((c, line));
        } else if is_closing(c) {
            match open.pop() {
                None => return Err(CompileError::UnexpectedDelimiter { line, found: c }),
                Some((opener, _)) => {
                    let expected = closing_for(opener).unwrap_or(c);
                    if expected != c {
                        return Err(CompileError::MismatchedDelimiter {
                            line,
                            expected,
                            found: c,
                        });
                    }
                }
            }
        }
    }

    if chars.open_quote().is_some() {
        return Err(CompileError::UnterminatedString { line: quote_line });
    }
    match open.pop() {
        Some((opener, line)) => Err(CompileError::Unclosed { line, open: opener }),
        None => Ok(()),
    }
}

fn strip_types(line: &str) -> String {
    let line = strip_function_types(line);
    strip_declaration_type(&line)
}

fn strip_function_types(line: &str) -> String {
    let Some(head) = FUNCTION_HEAD.find(line) else {
        return line.to_string();
    };
    if !is_code_at(line, head.start()) {
        return line.to_string();
    }

    let open = head.end() - 1;
    let Some(close) = scan_top_level(&line[open + 1..], false, |_, c| c == ')') else {
        return line.to_string();
    };
    let close = open + 1 + close;

    let params: Vec<String> = split_top_level(&line[open + 1..close], ',')
        .into_iter()
        .map(strip_param)
        .collect();

    format!(
        "{}{}){}",
        &line[..=open],
        params.join(","),
        strip_return_type(&line[close + 1..])
    )
}

fn strip_param(param: &str) -> String {
    let Some(at) = scan_top_level(param, false, |_, c| c == ':' || c == '=') else {
        return param.to_string();
    };
    if param[at..].starts_with('=') {
        return param.to_string();
    }

    let name = param[..at].trim_end();
    let name = name.strip_suffix('?').unwrap_or(name);
    let annotation = &param[at + 1..];
    match scan_top_level(annotation, true, |o, c| is_assignment(annotation, o, c)) {
        Some(eq) => format!("{} {}", name, annotation[eq..].trim_start()),
        None => name.to_string(),
    }
}

fn strip_return_type(rest: &str) -> String {
    let Some(annotation) = rest.trim_start().strip_prefix(':') else {
        return rest.to_string();
    };
    // an object type's own `{` comes before any type text
    match scan_top_level(annotation, true, |o, c| {
        c == '{' && !annotation[..o].trim().is_empty()
    }) {
        Some(body) => format!(" {}", &annotation[body..]),
        None => rest.to_string(),
    }
}

fn strip_declaration_type(line: &str) -> String {
    let Some(caps) = TYPED_DECLARATION.captures(line) else {
        return line.to_string();
    };
    let (Some(all), Some(head)) = (caps.get(0), caps.get(1)) else {
        return line.to_string();
    };
    if !is_code_at(line, head.start()) {
        return line.to_string();
    }

    let annotation = &line[all.end()..];
    match scan_top_level(annotation, true, |o, c| {
        c == ';' || is_assignment(annotation, o, c)
    }) {
        Some(at) if annotation[at..].starts_with(';') => {
            format!("{}{}", head.as_str(), &annotation[at..])
        }
        Some(at) => format!("{} {}", head.as_str(), &annotation[at..]),
        None => head.as_str().to_string(),
    }
}

fn lower_import(line: &str) -> String {
    if let Some(caps) = NAMED_IMPORT.captures(line) {
        let names: Vec<String> = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| match name.split_once(" as ") {
                Some((export, local)) => format!("{}: {}", export.trim(), local.trim()),
                None => name.to_string(),
            })
            .collect();
        let pattern = if names.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", names.join(", "))
        };
        return format!("{}const {} = require({});", &caps[1], pattern, &caps[3]);
    }
    if let Some(caps) = NAMESPACE_IMPORT.captures(line) {
        return format!("{}const {} = require({});", &caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = BARE_IMPORT.captures(line) {
        return format!("{}require({});", &caps[1], &caps[2]);
    }
    line.to_string()
}

fn is_assignment(text: &str, offset: usize, c: char) -> bool {
    c == '=' && !text[offset + 1..].starts_with(['>', '='])
}

fn is_code_at(text: &str, offset: usize) -> bool {
    CodeChars::new(text)
        .find(|(at, _, _)| *at == offset)
        .is_some_and(|(_, _, region)| region == Region::Code)
}

/// Offset of the first character outside literals and at bracket depth zero that
/// satisfies `stop`.
///
/// `<` opens an angle bracket only in type position: from the start of the text when
/// `in_type` is set, otherwise after a top-level `:` until the next top-level `,`, `;`
/// or assignment. The `>` of `=>` never closes one.
fn scan_top_level(
    text: &str,
    mut in_type: bool,
    mut stop: impl FnMut(usize, char) -> bool,
) -> Option<usize> {
    let mut depth = 0usize;
    let mut angles = 0usize;
    let mut previous = None;

    for (offset, c, region) in CodeChars::new(text) {
        if region == Region::Quoted || matches!(c, '"' | '\'' | '`') {
            previous = Some(c);
            continue;
        }
        let top_level = depth == 0 && angles == 0;
        if top_level && stop(offset, c) {
            return Some(offset);
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '<' if in_type => angles += 1,
            '>' if angles > 0 && previous != Some('=') => angles -= 1,
            ':' if top_level => in_type = true,
            ',' | ';' if top_level => in_type = false,
            '=' if top_level && is_assignment(text, offset, c) => in_type = false,
            _ => {}
        }
        previous = Some(c);
    }

    None
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = scan_top_level(rest, false, |_, c| c == separator) {
        parts.push(&rest[..at]);
        rest = &rest[at + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn compile(source: &str) -> Result<CompiledUnit, CompileError> {
        SourceCompiler::new().compile(source, &CompileOptions::default())
    }

    #[rstest]
    #[case("function add(a: number, b: number): number {", "function add(a, b) {")]
    #[case("function greet(name?: string = 'you') {", "function greet(name = 'you') {")]
    #[case(
        "async function load(map: Map<string, number>): Promise<void> {",
        "async function load(map) {"
    )]
    #[case("function f({a, b}: Props, cb: (x: T) => void) {", "function f({a, b}, cb) {")]
    #[case("function plain(a, b) {", "function plain(a, b) {")]
    #[case("const total: number = 0", "const total = 0")]
    #[case("  let items: Array<string>;", "  let items;")]
    #[case("var handler: (e: Event) => void = noop", "var handler = noop")]
    #[case("let pending: boolean", "let pending")]
    #[case("print('function f(a: T) {}')", "print('function f(a: T) {}')")]
    #[case("x = a ? b : c", "x = a ? b : c")]
    #[case("function f(a = x < y, b: number) {", "function f(a = x < y, b) {")]
    #[case("function g(a: number, b = c > d) {", "function g(a, b = c > d) {")]
    fn test_strip_types(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(strip_types(source), expected);
    }

    #[rstest]
    #[case("import {print} from 'standard'", "const { print } = require('standard');")]
    #[case(
        "  import {int, string as str} from \"standard\";",
        "  const { int, string: str } = require(\"standard\");"
    )]
    #[case("import * as std from 'standard'", "const std = require('standard');")]
    #[case("import 'standard'", "require('standard');")]
    #[case("import {} from 'standard'", "const {} = require('standard');")]
    #[case("important = 1", "important = 1")]
    fn test_lower_imports(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(lower_import(source), expected);
    }

    #[rstest]
    #[case("f(", CompileError::Unclosed { line: 1, open: '(' })]
    #[case("if (a) {\n  b()\n", CompileError::Unclosed { line: 1, open: '{' })]
    #[case("a\n)", CompileError::UnexpectedDelimiter { line: 2, found: ')' })]
    #[case("f([)]", CompileError::MismatchedDelimiter { line: 1, expected: ']', found: ')' })]
    #[case("x = 'open\ny()", CompileError::UnterminatedString { line: 1 })]
    #[case("ok()\nx = \"open", CompileError::UnterminatedString { line: 2 })]
    #[case("a\nx = s.match(/(\n", CompileError::UnterminatedString { line: 2 })]
    fn test_validation_errors(#[case] source: &str, #[case] expected: CompileError) {
        assert_eq!(validate_delimiters(source), Err(expected));
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        assert_eq!(validate_delimiters("print(')', \"{\", `[`)"), Ok(()));
    }

    #[test]
    fn test_brackets_inside_regex_literals_are_ignored() {
        assert_eq!(validate_delimiters(r"var s = $assign(t.replace(/\(/g, ''))"), Ok(()));
        assert_eq!(validate_delimiters("ok = /[)}]/.test(s) && (a / b) > 1"), Ok(()));
    }

    #[test]
    fn test_template_literal_may_span_lines() {
        assert_eq!(validate_delimiters("x = `a\nb`"), Ok(()));
    }

    #[test]
    fn test_compile_applies_extensions_in_order() {
        let source = "import {print} from 'standard'\nfunction f(a: number) {\n  print(a)\n}\n";
        let unit = compile(source).expect("compiles");
        assert_eq!(
            unit.code,
            "const { print } = require('standard');\nfunction f(a) {\n  print(a)\n}\n"
        );
        assert_eq!(unit.extensions, CompileOptions::default().extensions);
    }

    #[test]
    fn test_compile_without_extensions_only_validates() {
        let source = "import {print} from 'standard'\n";
        let unit = SourceCompiler::new()
            .compile(source, &CompileOptions::none())
            .expect("compiles");
        assert_eq!(unit.code, source);
        assert!(unit.extensions.is_empty());
    }

    #[test]
    fn test_error_names_line() {
        let error = compile("a()\nb(\n").expect_err("unbalanced");
        assert_eq!(error.line(), 2);
        assert_eq!(error.to_string(), "line 2: `(` is never closed");
    }
}
