//! Recursive type walk
//!
//! Starting from a root type, every message and enum reachable through fields is emitted once.
//! A message's own rows come first; the types its fields reference are visited afterwards, in
//! field order, one level deeper. The visited set lives in an explicit [TraversalContext] so a
//! walk never leaks state into the next one.

use super::{ProtoSchema, TypeDef, TypeEntity, TypeKind};
use crate::error::SchemaError;
use crate::reference::types_to_markdown;
use std::collections::HashMap;

/// Two distinct types that share a local name. Only the first one is documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub local_name: String,
    pub emitted: String,
    pub skipped: String,
}

/// Per-walk state.
///
/// Types are deduplicated by local name, not by full name. Schemas that reuse a nested type
/// name (two messages each declaring their own `Id`) lose the second one; those cases are
/// recorded in [TraversalContext::collisions].
#[derive(Debug, Default)]
pub struct TraversalContext {
    visited: HashMap<String, String>,
    collisions: Vec<NameCollision>,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a type as visited. Returns false if its local name was already taken.
    fn visit(&mut self, def: &TypeDef) -> bool {
        match self.visited.get(&def.name) {
            None => {
                self.visited.insert(def.name.clone(), def.full_name.clone());
                true
            }
            Some(emitted) => {
                if *emitted != def.full_name {
                    let collision = NameCollision {
                        local_name: def.name.clone(),
                        emitted: emitted.clone(),
                        skipped: def.full_name.clone(),
                    };
                    tracing::warn!(
                        name = %collision.local_name,
                        emitted = %collision.emitted,
                        skipped = %collision.skipped,
                        "type name already documented, skipping"
                    );
                    self.collisions.push(collision);
                }
                false
            }
        }
    }

    pub fn is_visited(&self, local_name: &str) -> bool {
        self.visited.contains_key(local_name)
    }

    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }
}

/// Collect the entities reachable from `start`, in emission order.
pub fn collect_types<'a>(
    schema: &'a ProtoSchema,
    start: &str,
    depth: usize,
    ctx: &mut TraversalContext,
) -> Result<Vec<TypeEntity<'a>>, SchemaError> {
    let root = schema.resolve(start)?;
    let mut entities = Vec::new();
    collect_into(schema, root, depth, ctx, &mut entities)?;
    Ok(entities)
}

fn collect_into<'a>(
    schema: &'a ProtoSchema,
    def: &'a TypeDef,
    depth: usize,
    ctx: &mut TraversalContext,
    out: &mut Vec<TypeEntity<'a>>,
) -> Result<(), SchemaError> {
    if !ctx.visit(def) {
        return Ok(());
    }
    out.push(TypeEntity { def, depth });

    let TypeKind::Message(fields) = &def.kind else {
        return Ok(());
    };

    let mut sub_types = Vec::new();
    for field in fields {
        if let Some(target) = &field.resolved {
            let resolved = schema
                .get(&target.qualified_name)
                .ok_or_else(|| SchemaError::UnknownType(target.qualified_name.clone()))?;
            sub_types.push(resolved);
        }
    }

    for sub_type in sub_types {
        collect_into(schema, sub_type, depth + 1, ctx, out)?;
    }
    Ok(())
}

/// Walk from `start` and render the reached types as markdown.
pub fn walk(
    schema: &ProtoSchema,
    start: &str,
    depth: usize,
    ctx: &mut TraversalContext,
) -> Result<String, SchemaError> {
    let entities = collect_types(schema, start, depth, ctx)?;
    Ok(types_to_markdown(&entities))
}

/// Render the reference for one root type with a fresh traversal context.
pub fn generate_proto_reference(schema: &ProtoSchema, start: &str) -> Result<String, SchemaError> {
    walk(schema, start, 0, &mut TraversalContext::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{EnumValueDef, FieldDef};

    const PKG: &str = "perfetto.protos";
    const FILE: &str = "protos/perfetto/config/trace_config.proto";

    fn message(qualified: &str, fields: Vec<FieldDef>) -> TypeDef {
        TypeDef::new(qualified, PKG, FILE, TypeKind::Message(fields))
    }

    fn stub(qualified: &str) -> TypeDef {
        message(qualified, vec![])
    }

    fn names(entities: &[TypeEntity<'_>]) -> Vec<(String, usize)> {
        entities
            .iter()
            .map(|e| (e.def.full_name.clone(), e.depth))
            .collect()
    }

    #[test]
    fn shared_nested_type_is_emitted_once() {
        let buffer = stub("perfetto.protos.TraceConfig.BufferConfig");
        let root = message(
            "perfetto.protos.TraceConfig",
            vec![
                FieldDef::of_type("buffers", &buffer),
                FieldDef::of_type("spare_buffers", &buffer),
                FieldDef::scalar("duration_ms", "uint32"),
            ],
        );
        let mut schema = ProtoSchema::new();
        schema.insert(root);
        schema.insert(buffer);

        let entities =
            collect_types(&schema, "perfetto.protos.TraceConfig", 0, &mut TraversalContext::new())
                .unwrap();
        assert_eq!(
            names(&entities),
            vec![
                ("TraceConfig".to_string(), 0),
                ("TraceConfig.BufferConfig".to_string(), 1)
            ]
        );
    }

    #[test]
    fn cyclic_types_terminate() {
        let a_ref = stub("perfetto.protos.A");
        let b_ref = stub("perfetto.protos.B");
        let mut schema = ProtoSchema::new();
        schema.insert(message("perfetto.protos.A", vec![FieldDef::of_type("b", &b_ref)]));
        schema.insert(message("perfetto.protos.B", vec![FieldDef::of_type("a", &a_ref)]));

        let entities =
            collect_types(&schema, "perfetto.protos.A", 0, &mut TraversalContext::new()).unwrap();
        assert_eq!(
            names(&entities),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn own_rows_come_before_sub_types_depth_first() {
        let c = stub("perfetto.protos.C");
        let b = message("perfetto.protos.B", vec![FieldDef::of_type("c", &c)]);
        let d = stub("perfetto.protos.D");
        let a = message(
            "perfetto.protos.A",
            vec![
                FieldDef::of_type("b", &b),
                FieldDef::of_type("d", &d),
                FieldDef::of_type("c", &c),
            ],
        );
        let mut schema = ProtoSchema::new();
        for def in [a, b, c, d] {
            schema.insert(def);
        }

        let entities =
            collect_types(&schema, "perfetto.protos.A", 0, &mut TraversalContext::new()).unwrap();
        assert_eq!(
            names(&entities),
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("D".to_string(), 1),
            ]
        );
    }

    #[test]
    fn local_name_collision_is_recorded() {
        let first_id = stub("perfetto.protos.Track.Id");
        let second_id = stub("perfetto.protos.Slice.Id");
        let track = message("perfetto.protos.Track", vec![FieldDef::of_type("id", &first_id)]);
        let slice = message("perfetto.protos.Slice", vec![FieldDef::of_type("id", &second_id)]);
        let root = message(
            "perfetto.protos.Root",
            vec![FieldDef::of_type("track", &track), FieldDef::of_type("slice", &slice)],
        );
        let mut schema = ProtoSchema::new();
        for def in [root, track, slice, first_id, second_id] {
            schema.insert(def);
        }

        let mut ctx = TraversalContext::new();
        let entities = collect_types(&schema, "perfetto.protos.Root", 0, &mut ctx).unwrap();

        assert_eq!(
            names(&entities),
            vec![
                ("Root".to_string(), 0),
                ("Track".to_string(), 1),
                ("Track.Id".to_string(), 2),
                ("Slice".to_string(), 1),
            ]
        );
        assert_eq!(
            ctx.collisions(),
            &[NameCollision {
                local_name: "Id".to_string(),
                emitted: "Track.Id".to_string(),
                skipped: "Slice.Id".to_string(),
            }]
        );
    }

    #[test]
    fn fresh_context_per_walk() {
        let mut schema = ProtoSchema::new();
        schema.insert(stub("perfetto.protos.A"));

        let first = generate_proto_reference(&schema, "perfetto.protos.A").unwrap();
        let second = generate_proto_reference(&schema, "perfetto.protos.A").unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn shared_context_skips_already_documented_types() {
        let mut schema = ProtoSchema::new();
        schema.insert(stub("perfetto.protos.A"));

        let mut ctx = TraversalContext::new();
        assert!(!walk(&schema, "perfetto.protos.A", 0, &mut ctx).unwrap().is_empty());
        assert!(ctx.is_visited("A"));
        assert_eq!(walk(&schema, "perfetto.protos.A", 0, &mut ctx).unwrap(), "");
    }

    #[test]
    fn enums_are_leaves() {
        let kind = TypeDef::new(
            "perfetto.protos.Kind",
            PKG,
            FILE,
            TypeKind::Enum(vec![EnumValueDef {
                name: "KIND_UNSPECIFIED".to_string(),
                number: 0,
                comment: String::new(),
            }]),
        );
        let mut schema = ProtoSchema::new();
        schema.insert(message("perfetto.protos.Event", vec![FieldDef::of_type("kind", &kind)]));
        schema.insert(kind);

        let entities =
            collect_types(&schema, "Event", 0, &mut TraversalContext::new()).unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities[1].def.is_enum());
    }

    #[test]
    fn unknown_start_type_is_an_error() {
        let schema = ProtoSchema::new();
        let err = generate_proto_reference(&schema, "perfetto.protos.Nope").unwrap_err();
        assert_eq!(err.to_string(), "unknown type 'perfetto.protos.Nope'");
    }
}
