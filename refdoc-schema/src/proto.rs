//! Protobuf schema model
//!
//!     The walker does not talk to the proto compiler directly. [loader] reflects a compiled
//!     descriptor pool into a [ProtoSchema]: an owned map of every message and enum, keyed by the
//!     package-qualified name, with comments and field type references already resolved. Tests
//!     build schemas by hand through the same constructors.
//!
//!     Names
//!
//!     - qualified name: `perfetto.protos.TraceConfig.BufferConfig`, used for lookups
//!     - full name: `TraceConfig.BufferConfig`, the nesting path without the package. This is the
//!       anchor identity used by cross-links.
//!     - local name: `BufferConfig`, the key of the walker's visited set

pub mod loader;
pub mod walker;

pub use loader::load_proto;
pub use walker::{collect_types, generate_proto_reference, walk, NameCollision, TraversalContext};

use crate::error::SchemaError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ProtoSchema {
    types: BTreeMap<String, TypeDef>,
}

impl ProtoSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type. A type with the same qualified name is replaced.
    pub fn insert(&mut self, def: TypeDef) {
        self.types.insert(def.qualified_name.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeDef> {
        self.types.get(qualified_name)
    }

    /// Resolve a user-supplied type name.
    ///
    /// Accepts the qualified name with or without a leading dot, or a full name (nesting path
    /// without package) when exactly one type carries it.
    pub fn resolve(&self, name: &str) -> Result<&TypeDef, SchemaError> {
        let name = name.trim_start_matches('.');
        if let Some(def) = self.types.get(name) {
            return Ok(def);
        }
        let mut by_full_name = self.types.values().filter(|def| def.full_name == name);
        match (by_full_name.next(), by_full_name.next()) {
            (Some(def), None) => Ok(def),
            _ => Err(SchemaError::UnknownType(name.to_string())),
        }
    }
}

/// A message or enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Local name, e.g. `BufferConfig`.
    pub name: String,
    pub qualified_name: String,
    pub full_name: String,
    pub comment: String,
    /// Defining file, relative to the project root.
    pub file: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Enum(Vec<EnumValueDef>),
    Message(Vec<FieldDef>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    /// Type as shown in the reference: a scalar name, a message/enum full name, or `map<K, V>`.
    pub declared_type: String,
    pub resolved: Option<TypeRef>,
    pub comment: String,
}

/// Navigational pointer from a field to the type it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub qualified_name: String,
    pub full_name: String,
}

impl TypeDef {
    /// Split a qualified name into its package and nesting path, given the package name.
    pub fn new(
        qualified_name: impl Into<String>,
        package: &str,
        file: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        let qualified_name = qualified_name.into();
        let full_name = qualified_name
            .strip_prefix(package)
            .map(|rest| rest.trim_start_matches('.'))
            .filter(|rest| !package.is_empty() && !rest.is_empty())
            .unwrap_or(qualified_name.as_str())
            .to_string();
        let name = full_name.rsplit('.').next().unwrap_or(&full_name).to_string();
        Self {
            name,
            qualified_name,
            full_name,
            comment: String::new(),
            file: file.into(),
            kind,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            qualified_name: self.qualified_name.clone(),
            full_name: self.full_name.clone(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }
}

impl FieldDef {
    pub fn scalar(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            resolved: None,
            comment: String::new(),
        }
    }

    pub fn of_type(name: impl Into<String>, target: &TypeDef) -> Self {
        Self {
            name: name.into(),
            declared_type: target.full_name.clone(),
            resolved: Some(target.type_ref()),
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A type emitted by the walker, with the nesting depth it was reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEntity<'a> {
    pub def: &'a TypeDef,
    pub depth: usize,
}
