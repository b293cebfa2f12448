//! Testing utilities
//!
//! Sample Programs
//!
//!     Tests that need a whole program should load one of the curated files under
//!     `samples/` through [`UnvSamples`] instead of writing ad-hoc sources inline. The
//!     samples are embedded at compile time and each one exercises a known set of
//!     features:
//!
//!         - `hello`: the starter document (import, string condition, comment)
//!         - `nested`: block comment, function, multi-target `local`, for/if/else
//!         - `try`: bare `try` and `finally`, `catch` with a binding
//!         - `errors`: prints, then throws a `ReferenceError`
//!
//! Generated Code Assertions
//!
//!     [`assert_generated`] wraps transpiler output in a fluent assertion:
//!
//!     ```rust,ignore
//!     use unv::unv::testing::{assert_generated, UnvSamples};
//!     use unv::unv::transpile;
//!
//!     assert_generated(&transpile(UnvSamples::source("nested")))
//!         .contains_line("function divmod(a, b) {")
//!         .braces_balanced()
//!         .compiles();
//!     ```

use crate::unv::pipeline::{CompileOptions, Compiler, SourceCompiler};

const SAMPLES: &[(&str, &str)] = &[
    ("hello", include_str!("../../samples/hello.unv")),
    ("nested", include_str!("../../samples/nested.unv")),
    ("try", include_str!("../../samples/try.unv")),
    ("errors", include_str!("../../samples/errors.unv")),
];

pub struct UnvSamples;

impl UnvSamples {
    pub fn names() -> impl Iterator<Item = &'static str> {
        SAMPLES.iter().map(|(name, _)| *name)
    }

    pub fn get(name: &str) -> Option<&'static str> {
        SAMPLES
            .iter()
            .find(|(sample, _)| *sample == name)
            .map(|(_, source)| *source)
    }

    /// Like [`UnvSamples::get`], panicking on unknown names.
    pub fn source(name: &str) -> &'static str {
        Self::get(name).unwrap_or_else(|| panic!("no sample named '{}'", name))
    }
}

/// Net `{` minus `}` outside string literals, or `None` if a `}` ever closes more than
/// was opened.
pub fn brace_depth(code: &str) -> Option<usize> {
    use crate::unv::lexing::delimiters::{CodeChars, Region};

    let mut depth = 0usize;
    for (_, c, region) in CodeChars::new(code) {
        if region == Region::Quoted {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    Some(depth)
}

pub fn assert_generated(code: &str) -> GeneratedAssertion<'_> {
    GeneratedAssertion { code }
}

pub struct GeneratedAssertion<'a> {
    code: &'a str,
}

impl GeneratedAssertion<'_> {
    /// Line `index` (0-based) equals `expected`.
    pub fn line(self, index: usize, expected: &str) -> Self {
        let actual = self.code.split('\n').nth(index);
        assert_eq!(
            actual,
            Some(expected),
            "line {} differs in generated code:\n{}",
            index,
            self.code
        );
        self
    }

    pub fn contains_line(self, expected: &str) -> Self {
        assert!(
            self.code.split('\n').any(|line| line == expected),
            "no line {:?} in generated code:\n{}",
            expected,
            self.code
        );
        self
    }

    pub fn line_count(self, expected: usize) -> Self {
        assert_eq!(self.code.lines().count(), expected, "generated code:\n{}", self.code);
        self
    }

    pub fn braces_balanced(self) -> Self {
        assert_eq!(
            brace_depth(self.code),
            Some(0),
            "unbalanced braces in generated code:\n{}",
            self.code
        );
        self
    }

    /// Passes the default compiler.
    pub fn compiles(self) -> Self {
        if let Err(error) = SourceCompiler::new().compile(self.code, &CompileOptions::default()) {
            panic!("generated code does not compile ({}):\n{}", error, self.code);
        }
        self
    }
}
