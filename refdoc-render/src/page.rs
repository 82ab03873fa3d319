//! Page templates
//!
//! A rendered fragment becomes a full page through a minijinja template. Templates see:
//!
//!     markdown    the rendered HTML fragment
//!     fileName    the output path without its first component, e.g. `/docs/quickstart.html`
//!     nav         contents of `_nav.html` next to the output file, when present
//!
//! Auto-escaping is off: every value is already HTML.

use crate::error::RenderError;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Navigation fragment looked up next to each output page.
pub const NAV_FILE: &str = "_nav.html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageData {
    pub markdown: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<String>,
}

impl PageData {
    /// Collect the template data for the page written to `output`.
    pub fn for_output(markdown: String, output: &Path) -> Result<Self, RenderError> {
        Ok(Self {
            markdown,
            file_name: page_file_name(output),
            nav: read_nav(output)?,
        })
    }
}

/// `site/docs/a.html` → `/docs/a.html`.
pub fn page_file_name(output: &Path) -> String {
    let rest: Vec<_> = output
        .components()
        .skip(1)
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", rest.join("/"))
}

/// Contents of the navigation fragment beside `output`, if there is one.
pub fn read_nav(output: &Path) -> Result<Option<String>, RenderError> {
    let nav_path = output
        .parent()
        .map(|dir| dir.join(NAV_FILE))
        .unwrap_or_else(|| NAV_FILE.into());
    if !nav_path.is_file() {
        return Ok(None);
    }
    fs::read_to_string(&nav_path)
        .map(Some)
        .map_err(|err| RenderError::io(nav_path, err))
}

/// Render a page template. `name` only shows up in template error messages.
pub fn render_page(name: &str, template: &str, data: &PageData) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(name, template)?;
    let page = env.get_template(name)?.render(data)?;
    Ok(page)
}
