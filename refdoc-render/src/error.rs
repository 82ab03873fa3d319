//! Error types for rendering and publishing

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A repository link or docs image points at a file that does not exist.
    #[error("{}: dead link: {target}", document.display())]
    DeadLink { document: PathBuf, target: String },

    #[error("failed to highlight {language} code block: {message}")]
    Highlight { language: String, message: String },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}
