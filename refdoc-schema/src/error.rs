//! Errors raised while extracting reference entities

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal extraction failures. Any of these aborts the whole generation run.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A macro body line matched none of the table grammar productions.
    #[error("{}:{line_number}: cannot parse table macro line \"{line}\"", path.display())]
    Parse {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    /// The requested root type does not exist in the loaded schema.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// The proto compiler rejected the input.
    #[error("failed to compile {}: {message}", path.display())]
    Proto { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A table invocation whose `#define` body could not be located.
///
/// Not an error: the invocation is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMacroBody {
    pub invocation: String,
    pub path: PathBuf,
}

impl fmt::Display for MissingMacroBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not find table {} in {}",
            self.invocation,
            self.path.display()
        )
    }
}
