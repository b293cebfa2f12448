//! Transpiling
//!
//! The line-oriented transform from unv to JavaScript.
//!
//! Algorithm
//!
//!     1. Scrub the source (comments out, string newlines escaped)
//!     2. For each line:
//!        - blank lines are copied and leave the indent stack alone
//!        - any other line first closes the open blocks at its indentation or deeper
//!          (one `}` line per block, see ./transpiling/indentation.rs)
//!        - a block opener then emits `<header> {` and pushes its indentation
//!        - a statement is passed through the rewriter (./transpiling/rewriting.rs)
//!     3. At end of input, close whatever is still open (unless disabled)
//!
//! The transform never fails. Whatever it cannot make sense of is copied through and
//! left for the compile stage to reject.

pub mod emitter;
pub mod indentation;
pub mod rewriting;

use crate::unv::lexing::{classify_line, scrub, Line, LineType};
use emitter::BlockEmitter;
use indentation::IndentStack;
use serde::Deserialize;

pub use rewriting::{rewrite_statement, Assignment, Scope};

/// Default name of the multi-value runtime helper.
pub const ASSIGN_HELPER: &str = "$assign";

/// Knobs for [`transpile_with`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Close blocks still open at end of input.
    pub flush_open_blocks: bool,
    /// Function wrapped around every rewritten assignment's value.
    pub assign_helper: String,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        TranspileOptions {
            flush_open_blocks: true,
            assign_helper: ASSIGN_HELPER.to_string(),
        }
    }
}

/// Transpile with default options.
pub fn transpile(source: &str) -> String {
    transpile_with(source, &TranspileOptions::default())
}

pub fn transpile_with(source: &str, options: &TranspileOptions) -> String {
    let scrubbed = scrub(source);
    let mut stack = IndentStack::new();
    let mut emitter = BlockEmitter::new();

    for raw in scrubbed.split('\n') {
        let line = Line::new(raw);
        let line_type = classify_line(&line);

        if line_type == LineType::Blank {
            emitter.emit_line(raw);
            continue;
        }

        emitter.close_blocks(&stack.close_to(line.indent));

        match line_type {
            LineType::BlockOpener(header) => {
                stack.push(line.indentation());
                emitter.open_block(line.indentation(), &header);
            }
            _ => emitter.emit_line(rewrite_statement(&line, &options.assign_helper)),
        }
    }

    if options.flush_open_blocks {
        emitter.close_blocks(&stack.drain());
    } else if !stack.is_empty() {
        tracing::debug!(open = stack.depth(), "leaving blocks open at end of input");
    }

    emitter.finish()
}
