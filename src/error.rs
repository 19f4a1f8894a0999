use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or rewriting the SSH config and key directory.
#[derive(Debug, Error)]
pub enum Error {
    /// The file a mutation needs to rewrite is absent
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content that does not decode into Host blocks
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Refused to overwrite something that already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Alias that cannot be written as a single-pattern `Host` line
    #[error("Invalid host alias: {0:?}")]
    InvalidAlias(String),

    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// ssh-keygen missing or exited unsuccessfully
    #[error("Key generation failed: {0}")]
    KeyGen(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Like [`Error::io`], but a missing file becomes [`Error::NotFound`].
    pub fn io_or_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path)
        } else {
            Error::Io { path, source }
        }
    }
}
