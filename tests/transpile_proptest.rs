//! Property-based tests for scrubbing and block emission

use proptest::prelude::*;
use unv::unv::lexing::{classify_line, scrub, Line, LineType};
use unv::unv::testing::brace_depth;
use unv::unv::transpile;

/// Source text over an alphabet that is dense in quotes, comment markers and newlines.
fn noisy_source_strategy() -> impl Strategy<Value = String> {
    "[a-z '\"#\n]{0,60}"
}

/// A single line with no quotes, comments or `=`.
fn plain_line_strategy() -> impl Strategy<Value = String> {
    "[a-z(][a-z0-9(). ,]{0,24}"
}

/// One line of a program: an `if` header or a call, at 0 to 3 levels of indentation.
fn program_line_strategy() -> impl Strategy<Value = String> {
    (0usize..4, prop::bool::ANY).prop_map(|(level, header)| {
        let indentation = "    ".repeat(level);
        if header {
            format!("{}if x{}", indentation, level)
        } else {
            format!("{}f({})", indentation, level)
        }
    })
}

fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(program_line_strategy(), 0..20).prop_map(|lines| lines.join("\n"))
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_scrub_is_idempotent(source in noisy_source_strategy()) {
            let once = scrub(&source);
            prop_assert_eq!(scrub(&once), once.clone(), "source: {:?}", source);
        }

        #[test]
        fn test_scrub_leaves_no_comment_markers_in_code(source in "[a-z #\n]{0,60}") {
            prop_assert!(!scrub(&source).contains('#'));
        }

        #[test]
        fn test_plain_lines_pass_through(line in plain_line_strategy()) {
            prop_assume!(classify_line(&Line::new(&line)) == LineType::Statement);
            prop_assume!(!line.starts_with("import "));
            prop_assert_eq!(transpile(&line), format!("{}\n", line));
        }

        #[test]
        fn test_programs_are_brace_balanced(program in program_strategy()) {
            let generated = transpile(&program);
            prop_assert_eq!(brace_depth(&generated), Some(0), "generated:\n{}", generated);
        }

        #[test]
        fn test_one_open_brace_per_header(program in program_strategy()) {
            let headers = program.lines().filter(|l| l.trim_start().starts_with("if ")).count();
            let opened = transpile(&program).lines().filter(|l| l.ends_with(" {")).count();
            prop_assert_eq!(opened, headers);
        }
    }
}
