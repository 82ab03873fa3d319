//! # refdoc-schema
//!
//! Reference extraction for two schema sources.
//!
//!     Table macros: C++ headers describe trace-processor tables with an X-macro mini language
//!     (`NAME(..)`, `C(type, name)`, `@param` comments). There is no grammar for it other than
//!     what the headers happen to contain, so the parser is deliberately strict: an unknown line
//!     is an error rather than a silently malformed table.
//!
//!     Protobuf: `.proto` files are compiled in-process and reflected into an owned schema model.
//!     The walker emits every type reachable from a root type once, cross-linked by anchor.
//!
//!     Both end up as markdown through the [reference] renderer, which is then fed to the
//!     markdown renderer in `refdoc-render`.
//!
//! File Layout
//!
//!     .
//!     ├── comment.rs            # comment normalization shared by both extractors
//!     ├── error.rs
//!     ├── tables.rs             # Table entity, invocation discovery, macro body location
//!     ├── tables
//!     │   ├── classify.rs       # LineKind classifier
//!     │   └── body.rs           # state machine over classified lines
//!     ├── proto.rs              # ProtoSchema / TypeDef model
//!     ├── proto
//!     │   ├── loader.rs         # protox + prost-reflect → ProtoSchema
//!     │   └── walker.rs         # TraversalContext and the recursive walk
//!     └── reference.rs          # entities → markdown tables
//!
//! Testing
//!
//!     Unit tests live next to the code. Integration tests under tests/ run against the header and
//!     proto fixtures in tests/fixtures.

pub mod comment;
pub mod error;
pub mod proto;
pub mod reference;
pub mod tables;

pub use error::SchemaError;
pub use proto::{ProtoSchema, TypeEntity};
pub use tables::{Column, Table, TableSyntax};
