//! Block emitter
//!
//! Append-only output buffer. Lines come out in input order; every emitted line,
//! including closing brace lines, is terminated by a newline in the final text.

use super::indentation::OpenBlock;
use crate::unv::lexing::BlockHeader;

#[derive(Debug, Default)]
pub struct BlockEmitter {
    lines: Vec<String>,
}

impl BlockEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// `<indentation><header> {`
    pub fn open_block(&mut self, indentation: &str, header: &BlockHeader) {
        self.lines.push(format!("{}{} {{", indentation, header.render()));
    }

    /// One closing brace line per closed block, indented like its header.
    pub fn close_blocks(&mut self, blocks: &[OpenBlock]) {
        for block in blocks {
            self.lines.push(format!("{}}}", block.indentation));
        }
    }

    pub fn finish(self) -> String {
        let mut output = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in self.lines {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }
}
