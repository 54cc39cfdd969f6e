//! Tokenizer for IPPcode19 source lines.

/// One source line split into whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub tokens: Vec<&'a str>,
    /// The line carried a `#` comment.
    pub has_comment: bool,
}

/// Tokenize a single line of source text.
///
/// Comments start with `#` and extend to end of line. String literals
/// cannot contain a raw `#`, so the first one always starts a comment.
pub(crate) fn tokenize_line(line: &str) -> Line<'_> {
    let (code, has_comment) = match line.find('#') {
        Some(pos) => (&line[..pos], true),
        None => (line, false),
    };

    Line {
        tokens: code.split_whitespace().collect(),
        has_comment,
    }
}

/// True if the tokens are exactly the `.IPPcode19` header.
pub(crate) fn is_header(tokens: &[&str]) -> bool {
    matches!(tokens, [only] if only.eq_ignore_ascii_case(".IPPcode19"))
}
