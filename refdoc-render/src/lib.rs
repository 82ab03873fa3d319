//! Markdown rendering for the documentation site
//!
//!     Pages are written in CommonMark with GitHub tables. This crate turns them into HTML while
//!     enforcing the site's conventions: heading anchors, docs-relative and repository links,
//!     dead-link checks, copied images and highlighted code.
//!
//!     Parsing and HTML generation are delegated to comrak; the crate only rewrites the parsed
//!     AST in between. This is a pure lib: it never prints and never reads the environment, the
//!     CLI decides where things go.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── anchor.rs        # explicit {#id} markers and derived anchors
//!     ├── links.rs         # LinkPolicy and LinkClass
//!     ├── highlight.rs     # syntect, class based output
//!     ├── markdown.rs      # RenderContext, render(), the AST hooks
//!     ├── page.rs          # minijinja page template, _nav.html
//!     ├── publish.rs       # render + template + copy + write
//!     └── lib.rs
//!
//! Testing
//!
//!     Unit tests sit next to each hook. tests/site.rs publishes the fixture tree under
//!     tests/fixtures the way the site build does.

pub mod anchor;
pub mod error;
pub mod highlight;
pub mod links;
pub mod markdown;
pub mod page;
pub mod publish;

pub use error::RenderError;
pub use links::{LinkClass, LinkPolicy};
pub use markdown::{render, AssetCopy, RenderContext, RenderedDocument};
pub use publish::{publish, PublishResult, PublishSpec};
