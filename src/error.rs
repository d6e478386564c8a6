use std::path::PathBuf;

use thiserror::Error;

use crate::CompilationError;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Failure of a build that writes units to disk.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// The compilation diagnostic, when the build failed before writing.
    pub fn as_compilation_error(&self) -> Option<&CompilationError> {
        match self {
            BuildError::Compilation(err) => Some(err),
            _ => None,
        }
    }
}
