//! Comment normalization
//!
//!     Source comments are wrapped at 80 columns, so their line breaks mean nothing except at the
//!     end of a sentence. Reference tables need each comment on a single line: wrapped lines are
//!     joined with a space, and a line that ends a sentence (or a blank separator line) becomes an
//!     explicit `<br>`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator kept where the source had a sentence or paragraph break.
pub const LINE_BREAK: &str = "<br>";

static NEXT_ID_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^\s*next id.*$\n?").unwrap());

/// Collapse a multi-line comment into a single line.
pub fn single_line(comment: &str) -> String {
    let mut out = String::new();
    let mut separator: Option<&str> = None;

    for line in comment.trim().lines().map(str::trim) {
        if line.is_empty() {
            if !out.is_empty() {
                separator = Some(LINE_BREAK);
            }
            continue;
        }
        if let Some(sep) = separator.take() {
            out.push_str(sep);
        }
        out.push_str(line);
        separator = Some(if line.ends_with('.') { LINE_BREAK } else { " " });
    }

    out
}

/// Drop the `Next id: N` bookkeeping lines protobuf authors leave in message comments.
pub fn strip_next_id(comment: &str) -> String {
    NEXT_ID_LINE.replace_all(comment, "").into_owned()
}
