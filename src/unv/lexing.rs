//! Lexing
//!
//! Everything the transpiler needs to look at source text without being fooled by
//! string literals or comments.
//!
//! Structure:
//!     The raw tokenization is done through the logos lexer library. It only knows three
//!     things: quoted strings, comments and everything else. That is enough to scrub the
//!     source (drop comments, keep strings on one line) so that the line-based passes
//!     downstream can use plain pattern matching.
//!
//! The passes are:
//! 1. Base tokenization using logos ./tokens.rs
//! 2. Scrubbing: comments out, newlines inside strings escaped ./scrubber.rs
//! 3. Line classification: block opener, statement or blank ./line_classification.rs
//!
//! ./delimiters.rs is a small string-aware character walker shared by the assignment
//! rewriter and the compiler's delimiter validation.

pub mod delimiters;
pub mod line_classification;
pub mod scrubber;
pub mod tokens;

pub use line_classification::{classify_line, BlockHeader, BlockKeyword, Line, LineType};
pub use scrubber::scrub;
pub use tokens::{tokenize, Token};
