//! Shared configuration loader for refdoc.
//!
//! `defaults/refdoc.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. The CLI layers a user file and flag overrides
//! on top of those defaults via [`Loader`] before deserializing into
//! [`RefdocConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use refdoc_render::{LinkPolicy, RenderContext};
use refdoc_schema::TableSyntax;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/refdoc.default.toml");

/// Top-level configuration consumed by the refdoc commands.
#[derive(Debug, Clone, Deserialize)]
pub struct RefdocConfig {
    pub project: ProjectConfig,
    pub links: LinksConfig,
    pub headings: HeadingsConfig,
    pub highlight: HighlightConfig,
    pub tables: TablesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    pub docs_prefix: String,
    pub source_base_url: String,
}

/// Heading levels that receive a derived anchor.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadingsConfig {
    pub anchor_min_level: u8,
    pub anchor_max_level: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub css_class: String,
}

/// The table macro dialect.
#[derive(Debug, Clone, Deserialize)]
pub struct TablesConfig {
    pub invocation_macro: String,
    pub handle_types: Vec<String>,
}

impl RefdocConfig {
    pub fn table_syntax(&self) -> TableSyntax {
        TableSyntax {
            invocation_macro: self.tables.invocation_macro.clone(),
            handle_types: self.tables.handle_types.clone(),
        }
    }

    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy {
            docs_prefix: self.links.docs_prefix.clone(),
            source_base_url: self.links.source_base_url.clone(),
        }
    }

    /// Render settings for `document`, rooted at the configured project root.
    pub fn render_context(&self, document: impl AsRef<Path>) -> RenderContext {
        RenderContext::new(document, &self.project.root)
            .with_links(self.link_policy())
            .with_anchor_levels(self.headings.anchor_min_level..=self.headings.anchor_max_level)
            .with_code_class(self.highlight.css_class.clone())
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `project.root` from `--root`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<RefdocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RefdocConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.project.root, PathBuf::from("."));
        assert_eq!(config.links.docs_prefix, "/docs/");
        assert_eq!(config.headings.anchor_min_level, 2);
        assert_eq!(config.headings.anchor_max_level, 3);
        assert_eq!(config.highlight.css_class, "hljs code-block");
        assert_eq!(config.table_syntax(), TableSyntax::default());
        assert_eq!(config.link_policy(), LinkPolicy::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("project.root", "/src/perfetto")
            .expect("override to apply")
            .set_override("headings.anchor_max_level", 4)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.project.root, PathBuf::from("/src/perfetto"));

        let ctx = config.render_context("docs/index.md");
        assert_eq!(ctx.root, PathBuf::from("/src/perfetto"));
        assert_eq!(ctx.anchor_levels, 2..=4);
    }

    #[test]
    fn layers_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refdoc.toml");
        fs::write(
            &path,
            "[tables]\ninvocation_macro = \"MY_TABLE\"\n\n[highlight]\ncss_class = \"code\"\n",
        )
        .unwrap();

        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(config.tables.invocation_macro, "MY_TABLE");
        assert_eq!(config.tables.handle_types, vec!["StringPool::Id".to_string()]);
        assert_eq!(config.render_context("a.md").code_class, "code");
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new().with_file("/definitely/not/here.toml").build();
        assert!(result.is_err());
    }
}
