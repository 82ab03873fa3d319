//! Reference table rendering
//!
//! Entities to markdown. Column headers are fixed:
//!
//! | Source | Header |
//! |--------|--------|
//! | Table  | `Column \| Type \| Optional \| Description` |
//! | Message | `Field \| Type \| Description` |
//! | Enum   | `Name \| Value \| Description` |
//!
//! Comments are normalized here with [single_line], so each row stays on one line. Nothing is
//! validated; the extractors hand over well-formed entities.

use crate::comment::{single_line, strip_next_id};
use crate::proto::{TypeEntity, TypeKind};
use crate::tables::Table;
use std::fmt::Write;
use std::path::Path;

/// Nesting deeper than this renders at the same heading level.
pub const MAX_HEADING_DEPTH: usize = 2;

/// Render tables as `## <name>` sections.
pub fn tables_to_markdown(tables: &[Table]) -> String {
    let mut output = String::new();
    for table in tables {
        write_table(&mut output, table);
    }
    output
}

fn write_table(output: &mut String, table: &Table) {
    writeln!(output, "## {}", table.name).unwrap();
    writeln!(output).unwrap();

    let comment = table.comment.trim();
    if !comment.is_empty() {
        writeln!(output, "{}", comment).unwrap();
        writeln!(output).unwrap();
    }

    writeln!(output, "Column | Type | Optional | Description").unwrap();
    writeln!(output, "------ | ---- | -------- | -----------").unwrap();
    for column in &table.columns {
        writeln!(
            output,
            "{} | {} | {} | {}",
            column.name,
            column.column_type,
            column.optional,
            cell(&column.comment)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
}

/// Render walked proto types, one section per entity.
pub fn types_to_markdown(entities: &[TypeEntity<'_>]) -> String {
    let mut output = String::new();
    for entity in entities {
        write_type(&mut output, entity);
    }
    output
}

fn write_type(output: &mut String, entity: &TypeEntity<'_>) {
    let def = entity.def;
    let hashes = "#".repeat(entity.depth.min(MAX_HEADING_DEPTH) + 1);

    writeln!(output, "{} {{#{}}} {}", hashes, def.full_name, def.full_name).unwrap();
    writeln!(output).unwrap();

    let comment = single_line(&strip_next_id(&def.comment));
    if !comment.is_empty() {
        writeln!(output, "{}", comment).unwrap();
        writeln!(output).unwrap();
    }

    let file_name = Path::new(&def.file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| def.file.clone());
    writeln!(
        output,
        "Defined in [{}](/{})",
        file_name,
        def.file.trim_start_matches('/')
    )
    .unwrap();
    writeln!(output).unwrap();

    match &def.kind {
        TypeKind::Enum(values) => {
            writeln!(output, "#### Enum values:").unwrap();
            writeln!(output, "Name | Value | Description").unwrap();
            writeln!(output, "---- | ----- | -----------").unwrap();
            for value in values {
                writeln!(
                    output,
                    "`{}` | `{}` | {}",
                    value.name,
                    value.number,
                    cell(&value.comment)
                )
                .unwrap();
            }
        }
        TypeKind::Message(fields) => {
            writeln!(output, "#### Fields:").unwrap();
            writeln!(output, "Field | Type | Description").unwrap();
            writeln!(output, "----- | ---- | -----------").unwrap();
            for field in fields {
                let field_type = match &field.resolved {
                    Some(target) => format!("[`{}`](#{})", field.declared_type, target.full_name),
                    None => format!("`{}`", field.declared_type),
                };
                writeln!(
                    output,
                    "`{}` | {} | {}",
                    field.name,
                    field_type,
                    cell(&field.comment)
                )
                .unwrap();
            }
        }
    }
    writeln!(output).unwrap();
}

/// A comment as a single-line table cell.
fn cell(comment: &str) -> String {
    single_line(comment).replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{EnumValueDef, FieldDef, TypeDef};
    use crate::tables::Column;

    #[test]
    fn renders_table_rows() {
        let table = Table {
            name: "FooTable".to_string(),
            comment: String::new(),
            columns: vec![
                Column::new("ts", "int64_t", false),
                Column::new("dur", "uint32_t", true),
            ],
        };
        let md = tables_to_markdown(&[table]);
        assert_eq!(
            md,
            "## FooTable\n\n\
             Column | Type | Optional | Description\n\
             ------ | ---- | -------- | -----------\n\
             ts | int64_t | false | \n\
             dur | uint32_t | true | \n\n"
        );
    }

    #[test]
    fn normalizes_table_and_column_comments() {
        let mut column = Column::new("ts", "int64_t", false);
        column.comment = "timestamp of the\nslice.\nUses a | pipe\n".to_string();
        let table = Table {
            name: "SliceTable".to_string(),
            comment: "Slices on a track.\n".to_string(),
            columns: vec![column],
        };
        let md = tables_to_markdown(&[table]);
        assert!(md.contains("Slices on a track.\n\n"));
        assert!(md.contains("ts | int64_t | false | timestamp of the slice.<br>Uses a \\| pipe\n"));
    }

    #[test]
    fn renders_message_with_linked_field() {
        let buffer = TypeDef::new(
            "perfetto.protos.TraceConfig.BufferConfig",
            "perfetto.protos",
            "protos/perfetto/config/trace_config.proto",
            TypeKind::Message(vec![]),
        );
        let root = TypeDef::new(
            "perfetto.protos.TraceConfig",
            "perfetto.protos",
            "protos/perfetto/config/trace_config.proto",
            TypeKind::Message(vec![
                FieldDef::of_type("buffers", &buffer).with_comment(" The buffers.\n"),
                FieldDef::scalar("duration_ms", "uint32"),
            ]),
        )
        .with_comment(" The overall config.\n Next id: 30.\n");

        let md = types_to_markdown(&[TypeEntity { def: &root, depth: 0 }]);
        assert_eq!(
            md,
            "# {#TraceConfig} TraceConfig\n\n\
             The overall config.\n\n\
             Defined in [trace_config.proto](/protos/perfetto/config/trace_config.proto)\n\n\
             #### Fields:\n\
             Field | Type | Description\n\
             ----- | ---- | -----------\n\
             `buffers` | [`TraceConfig.BufferConfig`](#TraceConfig.BufferConfig) | The buffers.\n\
             `duration_ms` | `uint32` | \n\n"
        );
    }

    #[test]
    fn renders_enum_values() {
        let def = TypeDef::new(
            "perfetto.protos.BufferConfig.FillPolicy",
            "perfetto.protos",
            "protos/config.proto",
            TypeKind::Enum(vec![
                EnumValueDef {
                    name: "UNSPECIFIED".to_string(),
                    number: 0,
                    comment: String::new(),
                },
                EnumValueDef {
                    name: "RING_BUFFER".to_string(),
                    number: 1,
                    comment: " Overwrite the oldest\n data.".to_string(),
                },
            ]),
        );
        let md = types_to_markdown(&[TypeEntity { def: &def, depth: 5 }]);
        assert!(md.starts_with("### {#BufferConfig.FillPolicy} BufferConfig.FillPolicy\n"));
        assert!(md.contains("#### Enum values:\nName | Value | Description\n"));
        assert!(md.contains("`RING_BUFFER` | `1` | Overwrite the oldest data.\n"));
    }

    #[test]
    fn heading_level_grows_with_depth() {
        let def = TypeDef::new("p.T", "p", "t.proto", TypeKind::Message(vec![]));
        let heading = |depth| {
            types_to_markdown(&[TypeEntity { def: &def, depth }])
                .lines()
                .next()
                .unwrap()
                .to_string()
        };
        assert_eq!(heading(0), "# {#T} T");
        assert_eq!(heading(1), "## {#T} T");
        assert_eq!(heading(2), "### {#T} T");
        assert_eq!(heading(3), "### {#T} T");
    }

    #[test]
    fn nothing_to_render() {
        assert_eq!(types_to_markdown(&[]), "");
        assert_eq!(tables_to_markdown(&[]), "");
    }
}
