//! Statement rewriting
//!
//! Two pattern rewrites for statement lines, tried in order, first match wins:
//!
//! 1. Imports: the name list becomes a named-import list.
//!
//!        import print, int from 'standard'   ->  import {print, int} from 'standard'
//!
//! 2. Assignments: the line becomes a declaration whose value goes through the
//!    multi-value helper, so `a, b = f()` can destructure whatever `f` returns.
//!
//!        local a, b = f()    ->  let [a, b] = $assign(f())
//!        x = y = 0           ->  var x = y = $assign(0)
//!
//! Anything else is returned unchanged.

use crate::unv::lexing::delimiters::{CodeChars, Region};
use crate::unv::lexing::Line;
use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+(.+?)\s+from\b(.*)$").expect("import pattern is valid"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Characters that turn a following `=` into part of a compound operator.
const OPERATOR_PREFIXES: &str = "=!<>+-*/%&|^~?";

/// Declaration scope of a rewritten assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `local` in source, `let` in output.
    Block,
    /// `global` or no keyword in source, `var` in output.
    Wide,
}

impl Scope {
    pub fn declaration(&self) -> &'static str {
        match self {
            Scope::Block => "let",
            Scope::Wide => "var",
        }
    }
}

/// A statement recognized as an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub scope: Scope,
    /// Chained targets, left to right. Each is a comma-separated identifier list.
    pub targets: Vec<&'a str>,
    pub expression: &'a str,
}

impl Assignment<'_> {
    pub fn render(&self, indentation: &str, helper: &str) -> String {
        let targets = self
            .targets
            .iter()
            .map(|target| render_target(target))
            .collect::<Vec<_>>()
            .join(" = ");
        format!(
            "{}{} {} = {}({})",
            indentation,
            self.scope.declaration(),
            targets,
            helper,
            self.expression
        )
    }
}

fn render_target(target: &str) -> String {
    if target.contains(',') {
        let names: Vec<&str> = target.split(',').map(str::trim).collect();
        format!("[{}]", names.join(", "))
    } else {
        target.to_string()
    }
}

/// Rewrite one statement line, or return it unchanged.
pub fn rewrite_statement(line: &Line, assign_helper: &str) -> String {
    rewrite_import(line)
        .or_else(|| rewrite_assignment(line, assign_helper))
        .unwrap_or_else(|| line.raw.to_string())
}

pub fn rewrite_import(line: &Line) -> Option<String> {
    let caps = IMPORT.captures(line.content)?;
    let names = caps.get(1)?.as_str();
    if names.starts_with('{') || names.starts_with('*') {
        return None;
    }
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some(format!("{}import {{{}}} from{}", line.indentation(), names, rest))
}

pub fn rewrite_assignment(line: &Line, assign_helper: &str) -> Option<String> {
    let assignment = parse_assignment(line.content)?;
    Some(assignment.render(line.indentation(), assign_helper))
}

/// Recognize `[local |global ]<targets> = <expression>`.
pub fn parse_assignment(content: &str) -> Option<Assignment<'_>> {
    let (scope, rest) = split_scope(content);
    parse_targets(scope, rest).or_else(|| {
        // `local = 1` assigns a variable called local
        if rest.len() != content.len() {
            parse_targets(Scope::Wide, content)
        } else {
            None
        }
    })
}

fn split_scope(content: &str) -> (Scope, &str) {
    for (keyword, scope) in [("local", Scope::Block), ("global", Scope::Wide)] {
        if let Some(rest) = content.strip_prefix(keyword) {
            if rest.starts_with(char::is_whitespace) {
                return (scope, rest);
            }
        }
    }
    (Scope::Wide, content)
}

fn parse_targets(scope: Scope, content: &str) -> Option<Assignment<'_>> {
    let mut targets = Vec::new();
    let mut start = 0;

    for operator in assignment_operators(content) {
        let segment = &content[start..operator];
        if !is_target_list(segment) {
            break;
        }
        targets.push(segment.trim());
        start = operator + 1;
    }

    if targets.is_empty() {
        return None;
    }

    let expression = content[start..].trim();
    let expression = expression.strip_suffix(';').unwrap_or(expression).trim_end();
    if expression.is_empty() {
        return None;
    }

    Some(Assignment {
        scope,
        targets,
        expression,
    })
}

fn is_target_list(segment: &str) -> bool {
    segment
        .split(',')
        .all(|name| IDENTIFIER.is_match(name.trim()))
}

/// Byte offsets of the assignment operators in `content` that sit outside string
/// literals and brackets. Comparison, arrow and compound operators are skipped.
pub fn assignment_operators(content: &str) -> Vec<usize> {
    let mut depth = 0usize;
    let mut operators = Vec::new();

    for (offset, c, region) in CodeChars::new(content) {
        if region == Region::Quoted {
            continue;
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                let previous = content[..offset].chars().next_back();
                let following = content[offset + 1..].chars().next();
                let compound = previous.is_some_and(|p| OPERATOR_PREFIXES.contains(p));
                let longer = matches!(following, Some('=') | Some('>'));
                if !compound && !longer {
                    operators.push(offset);
                }
            }
            _ => {}
        }
    }

    operators
}
