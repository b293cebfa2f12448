//! Scrubbing
//!
//! Removes comments and keeps every string literal on a single line, so that the
//! line-based passes never see a keyword that lives inside quotes or a line break that
//! lives inside a literal.
//!
//! String delimiters and contents are copied byte for byte, with one exception: a raw
//! newline inside a literal becomes the two characters `\n`. Everything that is not a
//! string or a comment is copied unchanged.

use super::tokens::{tokenize, Token};

/// Scrub `source`: comments out, embedded string newlines escaped.
pub fn scrub(source: &str) -> String {
    let mut scrubbed = String::with_capacity(source.len());

    for (token, span) in tokenize(source) {
        let slice = &source[span];
        match token {
            Token::Comment => {}
            token if token.is_string() => scrubbed.push_str(&slice.replace('\n', "\\n")),
            _ => scrubbed.push_str(slice),
        }
    }

    scrubbed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_removed() {
        assert_eq!(scrub("x = 1 # one\ny = 2"), "x = 1 \ny = 2");
    }

    #[test]
    fn test_block_comment_removed_with_its_lines() {
        assert_eq!(scrub("a\n###\nnotes\n###\nb"), "a\n\nb");
    }

    #[test]
    fn test_string_newline_escaped() {
        assert_eq!(scrub("s = 'one\ntwo'\n"), "s = 'one\\ntwo'\n");
    }

    #[test]
    fn test_string_contents_kept_verbatim() {
        let source = r##"print("# not a comment", 'it\'s', "\\")"##;
        assert_eq!(scrub(source), source);
    }

    #[test]
    fn test_scrub_is_idempotent_on_sample() {
        let source = "if 'a\nb' # c\n    ### d ###print(\"#\")\n";
        let once = scrub(source);
        assert_eq!(once, "if 'a\\nb' \n    print(\"#\")\n");
        assert_eq!(scrub(&once), once);
    }

    #[test]
    fn test_unterminated_string_left_alone() {
        assert_eq!(scrub("x = \"open # c\n"), "x = \"open \n");
    }
}
