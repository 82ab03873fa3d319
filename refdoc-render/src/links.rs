//! Link classification and rewriting
//!
//!     Every href found in a document falls into exactly one [LinkClass]:
//!
//!         DocsRelative    foo.md, ./foo.md, /docs/foo.md   →  /docs/foo
//!         Repository      ../tools/x, /tools/x#42           →  <source base>/tools/x#L42
//!         External        https://…, mailto:…, #anchor, //host   unchanged
//!
//!     Repository targets must exist under the project root; checking that is left to the caller
//!     (see [LinkPolicy::check_repository_target]) so classification stays pure.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use url::Url;

pub const DEFAULT_DOCS_PREFIX: &str = "/docs/";
pub const DEFAULT_SOURCE_BASE_URL: &str = "https://github.com/google/perfetto/blob/master";

static LINE_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Site prefix of documentation pages, with leading and trailing slash.
    pub docs_prefix: String,
    /// Repository browser URL that repository-relative paths are appended to.
    pub source_base_url: String,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            docs_prefix: DEFAULT_DOCS_PREFIX.to_string(),
            source_base_url: DEFAULT_SOURCE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// A page or asset of the docs tree. `path` is relative to the docs prefix and still carries
    /// any fragment or query.
    DocsRelative { path: String },
    /// A file in the repository. `path` starts with `/`, line fragments already use `#L<n>`.
    Repository { path: String },
    External,
}

impl LinkPolicy {
    pub fn classify(&self, href: &str) -> LinkClass {
        if let Some(rest) = href.strip_prefix(self.docs_prefix.as_str()) {
            return LinkClass::DocsRelative {
                path: rest.to_string(),
            };
        }
        if is_bare_relative(href) {
            return LinkClass::DocsRelative {
                path: href.trim_start_matches("./").to_string(),
            };
        }
        let repository_path = match href.strip_prefix("..") {
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ if href.starts_with('/') && !href.starts_with("//") => Some(href),
            _ => None,
        };
        match repository_path {
            Some(path) => LinkClass::Repository {
                path: LINE_FRAGMENT.replace(path, "#L$1").into_owned(),
            },
            None => LinkClass::External,
        }
    }

    /// The href a link of the given class is rewritten to.
    pub fn link_href(&self, class: &LinkClass, href: &str) -> String {
        match class {
            LinkClass::DocsRelative { path } => {
                let (target, suffix) = split_target(path);
                let target = target.strip_suffix(".md").unwrap_or(target);
                format!("{}{}{}", self.docs_prefix, target, suffix)
            }
            LinkClass::Repository { path } => format!("{}{}", self.source_base_url, path),
            LinkClass::External => href.to_string(),
        }
    }

    /// The src an image of the given class is rewritten to. Only docs images move; their file
    /// extensions are kept.
    pub fn image_src(&self, class: &LinkClass, href: &str) -> String {
        match class {
            LinkClass::DocsRelative { path } => format!("{}{}", self.docs_prefix, path),
            LinkClass::Repository { .. } | LinkClass::External => href.to_string(),
        }
    }

    /// The docs-tree file a docs-relative href refers to, relative to the project root
    /// (`docs/images/a.png`).
    pub fn docs_file(&self, path: &str) -> PathBuf {
        let (target, _) = split_target(path);
        Path::new(self.docs_prefix.trim_matches('/')).join(target)
    }

    /// Ensure a repository link points at an existing file under `root`. Paths that climb out
    /// of the root with `..` never resolve.
    ///
    /// Returns the target as it should be reported when it does not.
    pub fn check_repository_target(&self, root: &Path, path: &str) -> Result<(), String> {
        let (target, _) = split_target(path);
        let relative = Path::new(target.trim_start_matches('/'));
        let escapes_root = relative
            .components()
            .any(|component| matches!(component, Component::ParentDir));
        if !escapes_root && root.join(relative).exists() {
            Ok(())
        } else {
            Err(target.to_string())
        }
    }
}

/// `foo.md`, `_index.md`, `./foo.md`, but not `https://…` or `mailto:…`.
fn is_bare_relative(href: &str) -> bool {
    let starts_like_a_path = href.starts_with("./")
        || href
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    starts_like_a_path && Url::parse(href).is_err()
}

/// Split `path?query#fragment` into the path and the rest.
fn split_target(path: &str) -> (&str, &str) {
    match path.find(['#', '?']) {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    }
}
