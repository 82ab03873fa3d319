//! Loading a [ProtoSchema] from `.proto` sources
//!
//!     The file is compiled in-process with protox, using the project root as the only include
//!     path, so imports resolve the same way they do in the build (`import
//!     "protos/perfetto/common/foo.proto"`). The resulting descriptor pool is reflected into owned
//!     [TypeDef] values.
//!
//!     Comments come from the source info of each file: every location carries the descriptor path
//!     of the element it documents (`[4, 0, 2, 1]` is field 1 of message 0). The index below maps
//!     `(file, path)` to the leading comment, falling back to the trailing one.

use super::{EnumValueDef, FieldDef, ProtoSchema, TypeDef, TypeKind, TypeRef};
use crate::error::SchemaError;
use prost_reflect::{
    DescriptorPool, EnumDescriptor, FieldDescriptor, FileDescriptor, Kind, MessageDescriptor,
};
use std::collections::HashMap;
use std::path::Path;

/// Comments of every file in a pool, keyed by file name and descriptor path.
#[derive(Debug, Default)]
struct CommentIndex {
    comments: HashMap<(String, Vec<i32>), String>,
}

impl CommentIndex {
    fn build(pool: &DescriptorPool) -> Self {
        let mut index = CommentIndex::default();
        for file in pool.files() {
            index.add_file(&file);
        }
        index
    }

    fn add_file(&mut self, file: &FileDescriptor) {
        let Some(info) = &file.file_descriptor_proto().source_code_info else {
            return;
        };
        for location in &info.location {
            let comment = location
                .leading_comments
                .as_deref()
                .or(location.trailing_comments.as_deref());
            if let Some(comment) = comment {
                self.comments.insert(
                    (file.name().to_string(), location.path.clone()),
                    comment.to_string(),
                );
            }
        }
    }

    fn get(&self, file: &FileDescriptor, path: &[i32]) -> String {
        self.comments
            .get(&(file.name().to_string(), path.to_vec()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Compile `file` and every file it imports, and reflect all their types.
///
/// `file` may be absolute or relative to `project_root`.
pub fn load_proto(project_root: &Path, file: &Path) -> Result<ProtoSchema, SchemaError> {
    let relative = file.strip_prefix(project_root).unwrap_or(file);
    let proto_error = |message: String| SchemaError::Proto {
        path: file.to_path_buf(),
        message,
    };

    let mut compiler =
        protox::Compiler::new([project_root]).map_err(|e| proto_error(e.to_string()))?;
    compiler.include_imports(true).include_source_info(true);
    compiler
        .open_file(relative)
        .map_err(|e| proto_error(e.to_string()))?;

    let pool = compiler.descriptor_pool();
    let schema = schema_from_pool(&pool);
    tracing::debug!(file = %file.display(), types = schema.len(), "loaded proto schema");
    Ok(schema)
}

/// Reflect every message and enum of a descriptor pool. Synthetic map entry messages are skipped;
/// map fields point at their value type instead.
pub fn schema_from_pool(pool: &DescriptorPool) -> ProtoSchema {
    let comments = CommentIndex::build(pool);
    let mut schema = ProtoSchema::new();

    for message in pool.all_messages().filter(|m| !m.is_map_entry()) {
        schema.insert(message_def(&message, &comments));
    }
    for enumeration in pool.all_enums() {
        schema.insert(enum_def(&enumeration, &comments));
    }
    schema
}

fn message_def(message: &MessageDescriptor, comments: &CommentIndex) -> TypeDef {
    let file = message.parent_file();
    let fields = message
        .fields()
        .map(|field| field_def(&field, &file, comments))
        .collect();

    TypeDef::new(
        message.full_name(),
        message.package_name(),
        file.name(),
        TypeKind::Message(fields),
    )
    .with_comment(comments.get(&file, message.path()))
}

fn enum_def(enumeration: &EnumDescriptor, comments: &CommentIndex) -> TypeDef {
    let file = enumeration.parent_file();
    let values = enumeration
        .values()
        .map(|value| EnumValueDef {
            name: value.name().to_string(),
            number: value.number(),
            comment: comments.get(&file, value.path()),
        })
        .collect();

    TypeDef::new(
        enumeration.full_name(),
        enumeration.package_name(),
        file.name(),
        TypeKind::Enum(values),
    )
    .with_comment(comments.get(&file, enumeration.path()))
}

fn field_def(field: &FieldDescriptor, file: &FileDescriptor, comments: &CommentIndex) -> FieldDef {
    let (declared_type, resolved) = match field.kind() {
        Kind::Message(entry) if field.is_map() => {
            let key = entry.map_entry_key_field();
            let value = entry.map_entry_value_field();
            let (value_name, resolved) = kind_name(&value.kind());
            let (key_name, _) = kind_name(&key.kind());
            (format!("map<{}, {}>", key_name, value_name), resolved)
        }
        other => kind_name(&other),
    };

    FieldDef {
        name: field.name().to_string(),
        declared_type,
        resolved,
        comment: comments.get(file, field.path()),
    }
}

/// Display name of a field kind, and the type it links to when it is a message or enum.
fn kind_name(kind: &Kind) -> (String, Option<TypeRef>) {
    let named = |full_name: &str, package: &str| {
        let full = strip_package(full_name, package);
        (
            full.clone(),
            Some(TypeRef {
                qualified_name: full_name.to_string(),
                full_name: full,
            }),
        )
    };

    match kind {
        Kind::Message(message) => named(message.full_name(), message.package_name()),
        Kind::Enum(enumeration) => named(enumeration.full_name(), enumeration.package_name()),
        scalar => (scalar_name(scalar).to_string(), None),
    }
}

fn strip_package(qualified_name: &str, package: &str) -> String {
    if package.is_empty() {
        return qualified_name.to_string();
    }
    qualified_name
        .strip_prefix(package)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(qualified_name)
        .to_string()
}

fn scalar_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::Double => "double",
        Kind::Float => "float",
        Kind::Int32 => "int32",
        Kind::Int64 => "int64",
        Kind::Uint32 => "uint32",
        Kind::Uint64 => "uint64",
        Kind::Sint32 => "sint32",
        Kind::Sint64 => "sint64",
        Kind::Fixed32 => "fixed32",
        Kind::Fixed64 => "fixed64",
        Kind::Sfixed32 => "sfixed32",
        Kind::Sfixed64 => "sfixed64",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Message(_) | Kind::Enum(_) => "message",
    }
}
