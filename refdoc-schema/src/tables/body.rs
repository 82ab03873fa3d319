//! Folding classified body lines into a [Table]
//!
//! The parser is a small state machine:
//!
//!     TableComment      comments extend the table description
//!     ParamComment(n)   comments extend the running `@param n` buffer
//!     Columns           plain comments are dropped
//!
//! `@param` moves to ParamComment, NAME and parent declarations move back to TableComment, and a
//! column declaration moves to Columns. A column takes whatever buffer its name accumulated
//! before it was declared.

use super::classify::{classify, strip_continuation, LineKind};
use super::{Column, MacroBody, Table, TableSyntax};
use crate::error::SchemaError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

static OPTIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"Optional<(.*)>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    TableComment,
    ParamComment(String),
    Columns,
}

struct TableBuilder {
    table: Table,
    param_comments: HashMap<String, String>,
    state: ParserState,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            table: Table::default(),
            param_comments: HashMap::new(),
            state: ParserState::TableComment,
        }
    }

    fn push_comment(&mut self, text: &str) {
        let buffer = match &self.state {
            ParserState::TableComment => &mut self.table.comment,
            ParserState::ParamComment(name) => {
                self.param_comments.entry(name.clone()).or_default()
            }
            ParserState::Columns => {
                tracing::debug!(comment = text, "dropping comment between column declarations");
                return;
            }
        };
        buffer.push_str(text);
        buffer.push('\n');
    }

    fn push_column(&mut self, column_type: &str, name: &str, syntax: &TableSyntax) {
        let mut column = column_from_declaration(column_type, name, syntax);
        column.comment = self.param_comments.get(name).cloned().unwrap_or_default();
        self.table.columns.push(column);
        self.state = ParserState::Columns;
    }
}

/// Build the column for a `C(<type>, <name>)` declaration, without its comment.
pub(super) fn column_from_declaration(column_type: &str, name: &str, syntax: &TableSyntax) -> Column {
    let (column_type, optional) = match OPTIONAL.captures(column_type) {
        Some(caps) => (caps[1].trim().to_string(), true),
        None => (column_type.trim().to_string(), false),
    };
    let column_type = if syntax.is_handle_type(&column_type) {
        "string".to_string()
    } else {
        column_type
    };
    Column::new(name, column_type, optional)
}

pub(super) fn parse_body(
    body: &MacroBody<'_>,
    path: &Path,
    syntax: &TableSyntax,
) -> Result<Table, SchemaError> {
    let mut builder = TableBuilder::new();

    for &(line_number, raw) in &body.lines {
        let line = strip_continuation(raw);
        match classify(line) {
            LineKind::Define | LineKind::Blank => {}
            LineKind::Comment(text) => builder.push_comment(text),
            LineKind::ParamComment { name, text } => {
                builder.state = ParserState::ParamComment(name.to_string());
                builder.push_comment(text);
            }
            LineKind::Name(name) => {
                if !builder.table.name.is_empty() {
                    tracing::debug!(previous = %builder.table.name, name, "table renamed");
                }
                builder.table.name = name.to_string();
                builder.state = ParserState::TableComment;
            }
            LineKind::Parent => builder.state = ParserState::TableComment,
            LineKind::Column { column_type, name } => builder.push_column(column_type, name, syntax),
            LineKind::Unrecognized => {
                return Err(SchemaError::Parse {
                    path: path.to_path_buf(),
                    line_number,
                    line: line.to_string(),
                })
            }
        }
    }

    Ok(builder.table)
}
