//! Line classification for table macro bodies
//!
//! Each body line maps to exactly one [LineKind]. Productions are tried in a fixed order, so a
//! `#define` line mentioning `PARENT` is still a define, and a comment mentioning `C(` is still a
//! comment. Anything left over is [LineKind::Unrecognized], which the body parser turns into a
//! fatal error.

use once_cell::sync::Lazy;
use regex::Regex;

static DEFINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#define\b").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//\s*(.*)$").unwrap());
static PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@param\s+(\S+)(?:\s+(.*))?$").unwrap());
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*NAME\((\w+)\s*,").unwrap());
static PARENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\w*ROOT_TABLE|PARENT)\b").unwrap());
static COLUMN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*C\(([^,]+?)\s*,\s*(\w+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The `#define` line that opens the body.
    Define,
    Blank,
    Comment(&'a str),
    /// `// @param <name> <text>`
    ParamComment { name: &'a str, text: &'a str },
    /// `NAME(<table>, "<sql name>")`
    Name(&'a str),
    /// Root-table or parent declaration. Parent relationships are not documented.
    Parent,
    /// `C(<type>, <name>, ...)`
    Column { column_type: &'a str, name: &'a str },
    Unrecognized,
}

/// Strip the trailing line-continuation backslash and whitespace.
pub fn strip_continuation(line: &str) -> &str {
    let trimmed = line.trim_end();
    trimmed.strip_suffix('\\').unwrap_or(trimmed).trim_end()
}

/// Classify a body line. The line should already have its continuation stripped.
pub fn classify(line: &str) -> LineKind<'_> {
    if DEFINE.is_match(line) {
        return LineKind::Define;
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = COMMENT.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str());
        if let Some(param) = PARAM.captures(text) {
            return LineKind::ParamComment {
                name: param.get(1).map_or("", |m| m.as_str()),
                text: param.get(2).map_or("", |m| m.as_str()),
            };
        }
        return LineKind::Comment(text);
    }
    if let Some(caps) = NAME.captures(line) {
        return LineKind::Name(caps.get(1).map_or("", |m| m.as_str()));
    }
    if PARENT.is_match(line) {
        return LineKind::Parent;
    }
    if let Some(caps) = COLUMN.captures(line) {
        return LineKind::Column {
            column_type: caps.get(1).map_or("", |m| m.as_str().trim()),
            name: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    LineKind::Unrecognized
}
