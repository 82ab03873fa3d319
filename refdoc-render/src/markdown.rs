//! Markdown → HTML
//!
//!     Parsing and HTML formatting are comrak's. In between, the parsed AST is rewritten in
//!     document order by four hooks:
//!
//!     - headings get an anchor element (explicit `{#id}` marker or derived from the text)
//!     - links are classified and rewritten, repository targets must exist
//!     - docs images are rewritten and their copy into the output tree is planned
//!     - code blocks are replaced by highlighted HTML
//!
//!     Nothing touches the filesystem except existence checks. Planned copies come back in
//!     [RenderedDocument::assets] and are applied by [crate::publish] once the whole render
//!     succeeded.

use crate::anchor::{anchor_html, implicit_anchor, take_explicit_anchor, DEFAULT_ANCHOR_LEVELS};
use crate::error::RenderError;
use crate::highlight::{code_block_html, highlight};
use crate::links::{LinkClass, LinkPolicy};
use comrak::nodes::{Ast, AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, ComrakOptions};
use std::cell::RefCell;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_CODE_CLASS: &str = "hljs code-block";

/// Everything a render needs to know besides the markdown itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Source document, for diagnostics.
    pub document: PathBuf,
    /// Project root that repository links and docs images resolve against.
    pub root: PathBuf,
    /// Site output directory. Without it, docs images are checked but not copied.
    pub out_dir: Option<PathBuf>,
    pub links: LinkPolicy,
    pub anchor_levels: RangeInclusive<u8>,
    pub code_class: String,
}

impl RenderContext {
    pub fn new(document: impl AsRef<Path>, root: impl AsRef<Path>) -> Self {
        Self {
            document: document.as_ref().to_path_buf(),
            root: root.as_ref().to_path_buf(),
            out_dir: None,
            links: LinkPolicy::default(),
            anchor_levels: DEFAULT_ANCHOR_LEVELS,
            code_class: DEFAULT_CODE_CLASS.to_string(),
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = Some(out_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_links(mut self, links: LinkPolicy) -> Self {
        self.links = links;
        self
    }

    pub fn with_anchor_levels(mut self, levels: RangeInclusive<u8>) -> Self {
        self.anchor_levels = levels;
        self
    }

    pub fn with_code_class(mut self, class: impl Into<String>) -> Self {
        self.code_class = class.into();
        self
    }

    fn dead_link(&self, target: impl Into<String>) -> RenderError {
        RenderError::DeadLink {
            document: self.document.clone(),
            target: target.into(),
        }
    }
}

/// A file to copy into the output tree once rendering succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub assets: Vec<AssetCopy>,
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    // Pages embed raw HTML, and the hooks emit HTML nodes
    options.render.unsafe_ = true;
    options
}

/// Render markdown to an HTML fragment.
pub fn render(markdown: &str, ctx: &RenderContext) -> Result<RenderedDocument, RenderError> {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let mut assets = Vec::new();
    let nodes: Vec<&AstNode<'_>> = root.descendants().collect();
    for node in nodes {
        let heading_level = match &node.data.borrow().value {
            NodeValue::Heading(heading) => Some(heading.level),
            _ => None,
        };
        if let Some(level) = heading_level {
            apply_heading_anchor(&arena, node, level, ctx);
            continue;
        }

        let mut data = node.data.borrow_mut();
        let replacement = match &mut data.value {
            NodeValue::Link(link) => {
                link.url = rewrite_link(&link.url, ctx)?;
                None
            }
            NodeValue::Image(image) => {
                image.url = rewrite_image(&image.url, ctx, &mut assets)?;
                None
            }
            NodeValue::CodeBlock(block) => {
                let highlighted = highlight(&block.literal, &block.info)?;
                Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal: code_block_html(&highlighted, &ctx.code_class),
                }))
            }
            _ => None,
        };
        if let Some(value) = replacement {
            data.value = value;
        }
    }

    let mut html = Vec::new();
    format_html(root, &options, &mut html).map_err(|err| RenderError::io(&ctx.document, err))?;
    let html = String::from_utf8(html).map_err(|err| {
        RenderError::io(&ctx.document, io::Error::new(io::ErrorKind::InvalidData, err))
    })?;

    Ok(RenderedDocument { html, assets })
}

fn rewrite_link(href: &str, ctx: &RenderContext) -> Result<String, RenderError> {
    let class = ctx.links.classify(href);
    if let LinkClass::Repository { path } = &class {
        ctx.links
            .check_repository_target(&ctx.root, path)
            .map_err(|target| ctx.dead_link(target))?;
    }
    let rewritten = ctx.links.link_href(&class, href);
    tracing::debug!(href, rewritten = %rewritten, "link");
    Ok(rewritten)
}

fn rewrite_image(
    href: &str,
    ctx: &RenderContext,
    assets: &mut Vec<AssetCopy>,
) -> Result<String, RenderError> {
    let class = ctx.links.classify(href);
    let LinkClass::DocsRelative { path } = &class else {
        return Ok(ctx.links.image_src(&class, href));
    };

    let relative = ctx.links.docs_file(path);
    let source = ctx.root.join(&relative);
    if !source.is_file() {
        return Err(ctx.dead_link(format!("/{}", relative.display())));
    }
    if let Some(out_dir) = &ctx.out_dir {
        assets.push(AssetCopy {
            source,
            destination: out_dir.join(&relative),
        });
    }
    Ok(ctx.links.image_src(&class, href))
}

/// Concatenated text of a heading's inline content.
fn heading_text<'a>(heading: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for node in heading.descendants().skip(1) {
        match &node.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Remove the first `{#id}` marker found in the heading's text nodes.
fn take_heading_marker<'a>(heading: &'a AstNode<'a>) -> Option<String> {
    for node in heading.descendants().skip(1) {
        let mut data = node.data.borrow_mut();
        if let NodeValue::Text(literal) = &mut data.value {
            if let Some((id, stripped)) = take_explicit_anchor(literal) {
                *literal = stripped;
                return Some(id);
            }
        }
    }
    None
}

fn apply_heading_anchor<'a>(
    arena: &'a Arena<AstNode<'a>>,
    heading: &'a AstNode<'a>,
    level: u8,
    ctx: &RenderContext,
) {
    let id = match take_heading_marker(heading) {
        Some(id) => id,
        None => match implicit_anchor(&heading_text(heading), level, &ctx.anchor_levels) {
            Some(id) => id,
            None => return,
        },
    };
    let anchor = arena.alloc(AstNode::new(RefCell::new(Ast::new(
        NodeValue::HtmlInline(anchor_html(&id)),
        (0, 0).into(),
    ))));
    heading.prepend(anchor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tools")).unwrap();
        fs::write(dir.path().join("tools/x"), "#!/bin/sh\n").unwrap();
        fs::create_dir_all(dir.path().join("docs/images")).unwrap();
        fs::write(dir.path().join("docs/images/arch.png"), [0u8; 4]).unwrap();
        dir
    }

    fn render_in(dir: &TempDir, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let ctx = RenderContext::new("docs/page.md", dir.path());
        render(markdown, &ctx)
    }

    #[test]
    fn derived_anchor_on_level_two() {
        let dir = project();
        let html = render_in(&dir, "## Hello, World!\n").unwrap().html;
        assert_eq!(
            html.trim(),
            r##"<h2><a name="hello-world" class="anchor" href="#hello-world"></a>Hello, World!</h2>"##
        );
    }

    #[test]
    fn levels_outside_range_get_no_anchor() {
        let dir = project();
        let html = render_in(&dir, "# Title\n\n#### Fields:\n").unwrap().html;
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<h4>Fields:</h4>"));
    }

    #[test]
    fn explicit_marker_wins_at_any_level() {
        let dir = project();
        let html = render_in(&dir, "# {#custom} Hello World\n\n## Other {#other}\n")
            .unwrap()
            .html;
        assert!(html.contains(
            r##"<h1><a name="custom" class="anchor" href="#custom"></a>Hello World</h1>"##
        ));
        assert!(html.contains(r##"<h2><a name="other" class="anchor" href="#other"></a>Other</h2>"##));
        assert!(!html.contains("{#"));
    }

    #[test]
    fn rewrites_links_by_class() {
        let dir = project();
        let html = render_in(
            &dir,
            "[a](foo.md) [b](../tools/x) [c](/tools/x#42) [d](https://example.com)\n",
        )
        .unwrap()
        .html;
        assert!(html.contains(r#"<a href="/docs/foo">a</a>"#));
        assert!(html.contains(r#"<a href="https://github.com/google/perfetto/blob/master/tools/x">b</a>"#));
        assert!(html.contains(
            r#"<a href="https://github.com/google/perfetto/blob/master/tools/x#L42">c</a>"#
        ));
        assert!(html.contains(r#"<a href="https://example.com">d</a>"#));
    }

    #[test]
    fn dead_repository_link_fails() {
        let dir = project();
        let err = render_in(&dir, "See [gone](/tools/gone#3).\n").unwrap_err();
        match err {
            RenderError::DeadLink { document, target } => {
                assert_eq!(document, PathBuf::from("docs/page.md"));
                assert_eq!(target, "/tools/gone");
            }
            other => panic!("expected dead link, got {other:?}"),
        }
    }

    #[test]
    fn first_dead_link_in_document_order_is_reported() {
        let dir = project();
        let err = render_in(&dir, "[a](/tools/first)\n\n[b](/tools/second)\n").unwrap_err();
        assert_eq!(err.to_string(), "docs/page.md: dead link: /tools/first");
    }

    #[test]
    fn plans_image_copies_only_with_out_dir() {
        let dir = project();
        let markdown = "![arch](images/arch.png)\n";

        let rendered = render_in(&dir, markdown).unwrap();
        assert!(rendered.html.contains(r#"src="/docs/images/arch.png""#));
        assert!(rendered.assets.is_empty());

        let ctx = RenderContext::new("docs/page.md", dir.path()).with_out_dir("site");
        let rendered = render(markdown, &ctx).unwrap();
        assert_eq!(
            rendered.assets,
            vec![AssetCopy {
                source: dir.path().join("docs/images/arch.png"),
                destination: PathBuf::from("site/docs/images/arch.png"),
            }]
        );
    }

    #[test]
    fn repository_images_are_untouched() {
        let dir = project();
        let html = render_in(&dir, "![x](/tools/x.png)\n\n![y](../tools/missing.png)\n")
            .unwrap()
            .html;
        assert!(html.contains(r#"src="/tools/x.png""#));
        assert!(html.contains(r#"src="../tools/missing.png""#));
        assert!(!html.contains("blob/master"));
    }

    #[test]
    fn parent_escape_is_a_dead_link() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("outside.txt"), "").unwrap();

        let ctx = RenderContext::new("docs/page.md", &root);
        let err = render("[a](../../outside.txt)\n", &ctx).unwrap_err();
        assert_eq!(err.to_string(), "docs/page.md: dead link: /../outside.txt");
    }

    #[test]
    fn missing_image_is_a_dead_link() {
        let dir = project();
        let err = render_in(&dir, "![gone](images/gone.png)\n").unwrap_err();
        assert!(matches!(err, RenderError::DeadLink { ref target, .. } if target == "/docs/images/gone.png"));
    }

    #[test]
    fn external_images_are_untouched() {
        let dir = project();
        let rendered = render_in(&dir, "![x](https://example.com/x.png)\n").unwrap();
        assert!(rendered.html.contains(r#"src="https://example.com/x.png""#));
        assert!(rendered.assets.is_empty());
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let dir = project();
        let html = render_in(&dir, "```rust\nfn main() {}\n```\n").unwrap().html;
        assert!(html.contains(r#"<code class="hljs code-block">"#));
        assert!(html.contains("hljs-rust"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn code_class_is_configurable() {
        let dir = project();
        let ctx = RenderContext::new("p.md", dir.path()).with_code_class("code");
        let html = render("```\nplain\n```\n", &ctx).unwrap().html;
        assert!(html.contains(r#"<code class="code">"#));
    }

    #[test]
    fn raw_html_passes_through() {
        let dir = project();
        let html = render_in(&dir, "<div class=\"note\">hi</div>\n").unwrap().html;
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }

    #[test]
    fn tables_render() {
        let dir = project();
        let html = render_in(&dir, "a | b\n--- | ---\n1 | 2\n").unwrap().html;
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
