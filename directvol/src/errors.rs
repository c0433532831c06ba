//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout directvol.
pub type DirectVolumeResult<T> = std::result::Result<T, DirectVolumeError>;

/// Errors reported by the volume metadata store.
#[derive(Error, Debug)]
pub enum DirectVolumeError {
    /// The metadata path for a volume exists but is not a directory.
    #[error("{} should be a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The mount descriptor is not a valid JSON document for the schema.
    #[error("invalid mount descriptor: {0}")]
    InvalidDescriptor(#[source] serde_json::Error),

    /// No mount descriptor has been recorded for the volume.
    #[error("no mount descriptor recorded for volume {0}")]
    NotFound(String),

    /// Filesystem failure while reading or writing volume metadata.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic failure surfaced by the convenience API.
    ///
    /// The concrete cause stays chained as `source` so diagnostics keep the
    /// original error even though callers only see one code.
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source: Box<DirectVolumeError>,
    },
}

impl DirectVolumeError {
    /// Wrap an error as an [`Internal`](Self::Internal) failure.
    pub(crate) fn internal(context: impl Into<String>, source: DirectVolumeError) -> Self {
        Self::Internal {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
