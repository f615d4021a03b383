//! Error types for the soundscape engine.

use glade_config::{ConfigError, PlayerEffect};
use glade_core::{EnvelopeError, InvariantViolation};
use thiserror::Error;

/// Boxed error returned by a [`ClipSource`](crate::ClipSource).
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or driving a [`Soundscape`](crate::Soundscape).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Area name that no music zone, effect zone or emitter listens to.
    #[error("unknown zone '{0}'")]
    UnknownZone(String),

    /// Player effect with no configuration entry.
    #[error("player effect '{0}' is not configured")]
    UnknownEffect(PlayerEffect),

    /// Clip name missing from the clip table.
    #[error("unknown clip '{0}'")]
    UnknownClip(String),

    /// Snapshot name missing from the snapshot table.
    #[error("unknown snapshot '{0}'")]
    UnknownSnapshot(String),

    /// A clip file could not be loaded.
    #[error("failed to load clip '{name}': {source}")]
    ClipLoad {
        /// Clip name.
        name: String,
        /// Loader error.
        #[source]
        source: SourceError,
    },

    /// A dual-channel lookup failed.
    #[error("channel invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// A note envelope that passed validation could not be built.
    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Create a clip load error.
    pub fn clip_load(name: impl Into<String>, source: impl Into<SourceError>) -> Self {
        EngineError::ClipLoad {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
