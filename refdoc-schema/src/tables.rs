//! Table macro extraction
//!
//!     Trace-processor headers declare each table twice: an invocation naming a definition macro,
//!     and the definition macro itself, which lists the columns:
//!
//!         // Some
//!         // Multiline
//!         // Comment
//!         // @param rel_pc the relative program counter
//!         #define PERFETTO_TP_STACK_PROFILE_FRAME_DEF(NAME, PARENT, C) \
//!           NAME(StackProfileFrameTable, "stack_profile_frame")        \
//!           PERFETTO_TP_ROOT_TABLE(PARENT, C)                          \
//!           C(StringPool::Id, name)                                    \
//!           C(int64_t, rel_pc)                                         \
//!           C(base::Optional<uint32_t>, symbol_set_id)
//!
//!         PERFETTO_TP_TABLE(PERFETTO_TP_STACK_PROFILE_FRAME_DEF);
//!
//!     Discovery scans for invocations, then locates the `#define` for each one: the comment run
//!     right above it, the define line, every backslash-continued line and the final line. The
//!     located lines are classified (see [classify]) and folded into a [Table] by the state machine
//!     in [body].

mod body;
pub mod classify;

use crate::error::{MissingMacroBody, SchemaError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Macro that introduces a table in the headers we document.
pub const DEFAULT_INVOCATION_MACRO: &str = "PERFETTO_TP_TABLE";

/// Internal handle types that read better as plain strings in the reference.
pub const DEFAULT_HANDLE_TYPES: &[&str] = &["StringPool::Id"];

static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*//").unwrap());

/// A documented table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    /// Raw comment text, one source line per `\n`. Normalized at render time.
    pub comment: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: String,
    pub optional: bool,
    pub comment: String,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            optional,
            comment: String::new(),
        }
    }
}

/// The knobs of the macro dialect being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSyntax {
    pub invocation_macro: String,
    pub handle_types: Vec<String>,
}

impl Default for TableSyntax {
    fn default() -> Self {
        Self {
            invocation_macro: DEFAULT_INVOCATION_MACRO.to_string(),
            handle_types: DEFAULT_HANDLE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TableSyntax {
    fn invocation_regex(&self) -> Regex {
        let pattern = format!(r"(?m)^\s*{}\((\w+)\)", regex::escape(&self.invocation_macro));
        Regex::new(&pattern).expect("escaped invocation pattern is valid")
    }

    fn is_handle_type(&self, column_type: &str) -> bool {
        self.handle_types.iter().any(|t| t == column_type)
    }
}

/// Everything extracted from one or more headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTables {
    /// Tables in invocation order.
    pub tables: Vec<Table>,
    /// Invocations that were skipped because their definition was not found.
    pub missing: Vec<MissingMacroBody>,
}

impl HeaderTables {
    fn extend(&mut self, other: HeaderTables) {
        self.tables.extend(other.tables);
        self.missing.extend(other.missing);
    }
}

/// A located `#define` body: 1-based line numbers paired with the raw line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBody<'s> {
    pub lines: Vec<(usize, &'s str)>,
}

/// Parse every table invocation in a header's source text.
///
/// `path` is only used for diagnostics.
pub fn parse_header(
    source: &str,
    path: &Path,
    syntax: &TableSyntax,
) -> Result<HeaderTables, SchemaError> {
    let mut result = HeaderTables::default();

    for capture in syntax.invocation_regex().captures_iter(source) {
        let definition = &capture[1];
        let Some(body) = locate_body(source, definition) else {
            let missing = MissingMacroBody {
                invocation: definition.to_string(),
                path: path.to_path_buf(),
            };
            tracing::warn!("{}", missing);
            result.missing.push(missing);
            continue;
        };
        let table = body::parse_body(&body, path, syntax)?;
        tracing::debug!(table = %table.name, columns = table.columns.len(), "parsed table");
        result.tables.push(table);
    }

    Ok(result)
}

/// Read and parse a list of headers, in order.
pub fn parse_headers<P: AsRef<Path>>(
    paths: &[P],
    syntax: &TableSyntax,
) -> Result<HeaderTables, SchemaError> {
    let mut result = HeaderTables::default();
    for path in paths {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        result.extend(parse_header(&source, path, syntax)?);
    }
    Ok(result)
}

/// Locate the `#define <definition>(` body together with the comment run above it.
///
/// Returns `None` when there is no such define or when it is not followed by at least one
/// continued line.
pub fn locate_body<'s>(source: &'s str, definition: &str) -> Option<MacroBody<'s>> {
    let define = Regex::new(&format!(r"^\s*#define\s+{}\s*\(", regex::escape(definition)))
        .expect("escaped define pattern is valid");
    let lines: Vec<&str> = source.lines().collect();

    let define_idx = lines.iter().position(|line| define.is_match(line))?;
    if !is_continued(lines[define_idx]) {
        return None;
    }

    let mut start = define_idx;
    while start > 0 && COMMENT_LINE.is_match(lines[start - 1]) {
        start -= 1;
    }

    let mut end = define_idx;
    while end + 1 < lines.len() && is_continued(lines[end]) {
        end += 1;
    }

    Some(MacroBody {
        lines: (start..=end).map(|idx| (idx + 1, lines[idx])).collect(),
    })
}

fn is_continued(line: &str) -> bool {
    line.trim_end().ends_with('\\')
}
