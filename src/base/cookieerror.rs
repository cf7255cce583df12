use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A required collaborator was left out of a [`PersistentStoreConfig`].
///
/// Returned synchronously from construction and never swallowed.
///
/// [`PersistentStoreConfig`]: crate::cookies::persistent::PersistentStoreConfig
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ConfigurationError {
    #[error("Cookie store cannot be absent")]
    MissingStore,
    #[error("Persister cannot be absent")]
    MissingPersister,
    #[error("Failure sink cannot be absent")]
    MissingFailureSink,
    #[error("Log tag cannot be blank")]
    EmptyLogTag,
}

/// A cookie record (or a cookie name) that cannot become a live cookie.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RecordError {
    #[error("Cannot decode an empty cookie record")]
    Empty,
    #[error("Invalid cookie name: {0:?}")]
    InvalidName(String),
}

/// Any failure on a persister's write or read path.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cookie snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("Invalid cookie record: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("Persistence backend error: {0}")]
    Backend(String),
}

impl PersistenceError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        PersistenceError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Failure reported by a third-party persister.
    pub fn backend(message: impl Into<String>) -> Self {
        PersistenceError::Backend(message.into())
    }

    /// Whether the failure came from the codec rather than the medium.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PersistenceError::Codec(_) | PersistenceError::InvalidRecord(_)
        )
    }
}

/// A `Set-Cookie` line that could not be turned into a cookie.
#[derive(Debug, Error)]
pub enum CookieParseError {
    #[error("Failed to parse cookie: {0}")]
    Syntax(#[from] cookie::ParseError),
    #[error(transparent)]
    InvalidName(#[from] RecordError),
}
