use crate::util::utf::UtfError;
use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, ArchiveError>`.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Possible errors from an [`Archive`](super::Archive).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// The entry exists, although is unable to be read as text due to invalid UTF-8.
    #[error("[InvalidUtf8Entry - `{path}`]: Entry cannot be read as UTF-8")]
    InvalidUtf8Entry {
        /// The root cause of the error.
        source: UtfError,
        /// The archive path responsible for triggering the error.
        path: String,
    },

    /// A requested path does not point to an entry within the archive.
    #[error("[MissingEntry - `{path}`]: No such entry")]
    MissingEntry {
        /// The archive path responsible for triggering the error.
        path: String,
    },

    /// The entry exists, although is unable to be read, typically I/O.
    #[error("[CannotRead - `{path}`]: {source}")]
    CannotRead {
        /// The root cause of the error.
        source: io::Error,
        /// The archive path responsible for triggering the error.
        path: String,
    },

    /// The archive itself is unreadable due to not existing,
    /// unsupported format, or malformed state.
    ///
    /// Path *is* [`None`] when the archive was supplied as bytes or a reader.
    #[error("[UnreadableArchive - `{path:?}`]: {source}")]
    UnreadableArchive {
        /// The root cause of this error.
        source: io::Error,
        /// The path responsible for triggering the error, if applicable.
        path: Option<PathBuf>,
    },
}
