//! Soundscape loading errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// Why a soundscape file could not be loaded or saved.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The soundscape file could not be read.
    #[error("cannot read soundscape '{path}': {source}")]
    Read {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The soundscape file could not be written.
    #[error("cannot write soundscape '{path}': {source}")]
    Write {
        /// File that was created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML, or a field has the wrong shape.
    #[error("soundscape syntax: {0}")]
    Syntax(#[from] toml::de::Error),

    /// The in-memory config has no TOML form.
    #[error("soundscape serialization: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed, but refers to missing clips, snapshots or entries.
    #[error("invalid soundscape: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
