//! Error types for resource loading.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, `zip` and `binrw`
//! errors, config parse errors) are automatically converted via `From` impls.
//!
//! Most problems found while *reading resources* are not errors at all: an
//! undersized lump or a missing file is logged through `tracing` and the load
//! carries on with whatever resolved. The variants here are reserved for
//! conditions the caller has to act on.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a resource engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A resource read was attempted while the reader is suspended.
    ///
    /// Call [`ResourceEngine::resume`](crate::ResourceEngine::resume) first.
    #[error("Data reader is suspended: {0}")]
    Suspended(String),

    /// The reader was disposed and must not be used anymore.
    #[error("Data reader is disposed: {0}")]
    Disposed(String),

    /// Filesystem I/O failed (walking a directory, reading a lump, temp copies).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip backend could not open or read an archive entry.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A lump archive has a bad header or a directory that points outside the file.
    #[error("Invalid WAD '{path}': {reason}")]
    InvalidWad { path: Utf8PathBuf, reason: String },

    /// Binary structure decoding failed.
    #[error("Binary read error: {0}")]
    Binary(#[from] binrw::Error),

    /// A named entry does not exist in its container.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A configured resource location is missing or of the wrong kind.
    #[error("Invalid resource location: {0}")]
    InvalidLocation(Utf8PathBuf),

    /// The resource stack file could not be parsed.
    #[error("Invalid stack config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a JSON stack file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for errors from backends and other sources.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
