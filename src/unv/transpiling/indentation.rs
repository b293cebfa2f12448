//! Indent stack
//!
//!     Tracks the indentation of every block header that has been emitted with an
//!     opening brace and not closed yet. The top of the stack is the innermost block.
//!     Levels are counted in whitespace characters; the header's own indentation text
//!     is kept so its closing brace lines up with it, tabs included.
//!
//!     Closing rule: a non-blank line at indentation `n` closes every open block whose
//!     header sits at `n` or deeper. Using "or deeper" (`>=`) rather than strictly deeper
//!     means a line at the same indentation as a header closes that header's block, even
//!     when nothing was written in between:
//!
//!         if x          if (x) {
//!         y             }
//!                       y

/// A block whose closing brace has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    pub level: usize,
    pub indentation: String,
}

/// Stack of open block headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndentStack {
    blocks: Vec<OpenBlock>,
}

impl IndentStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a block opened by a header indented with `indentation`.
    pub fn push(&mut self, indentation: &str) {
        self.blocks.push(OpenBlock {
            level: indentation.chars().count(),
            indentation: indentation.to_string(),
        });
    }

    /// Pop every block a line at `level` closes, innermost first.
    pub fn close_to(&mut self, level: usize) -> Vec<OpenBlock> {
        let mut closed = Vec::new();
        while self.blocks.last().is_some_and(|top| top.level >= level) {
            closed.extend(self.blocks.pop());
        }
        closed
    }

    /// Pop everything, innermost first.
    pub fn drain(&mut self) -> Vec<OpenBlock> {
        let mut closed = std::mem::take(&mut self.blocks);
        closed.reverse();
        closed
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(blocks: &[OpenBlock]) -> Vec<usize> {
        blocks.iter().map(|block| block.level).collect()
    }

    #[test]
    fn test_deeper_line_closes_nothing() {
        let mut stack = IndentStack::new();
        stack.push("");
        assert!(stack.close_to(4).is_empty());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_same_level_closes_block() {
        let mut stack = IndentStack::new();
        stack.push("");
        assert_eq!(levels(&stack.close_to(0)), vec![0]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_dedent_closes_innermost_first() {
        let mut stack = IndentStack::new();
        stack.push("");
        stack.push("    ");
        stack.push("        ");
        assert_eq!(levels(&stack.close_to(4)), vec![8, 4]);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_drain_innermost_first() {
        let mut stack = IndentStack::new();
        stack.push("");
        stack.push("  ");
        assert_eq!(levels(&stack.drain()), vec![2, 0]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_keeps_header_indentation_text() {
        let mut stack = IndentStack::new();
        stack.push("\t");
        let closed = stack.close_to(0);
        assert_eq!(closed[0].level, 1);
        assert_eq!(closed[0].indentation, "\t");
    }
}
