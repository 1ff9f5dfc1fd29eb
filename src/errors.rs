//! Error-related types.
//!
//! Only archive-structure failures surface as errors during ingestion.
//! Degraded metadata and a missing cover are ordinary results:
//! [`Metadata::default`](crate::epub::Metadata::default) and [`None`] respectively.

pub use crate::archive::errors::{ArchiveError, ArchiveResult};
pub use crate::util::utf::UtfError;
use std::error::Error;

/// Alias for `Result<T, EbookError>`.
pub type EbookResult<T> = Result<T, EbookError>;

/// Unified error type.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum EbookError {
    /// The archive itself is unreadable (not a zip container, for instance),
    /// or an entry required for ingestion cannot be decompressed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The archive is readable but is not a usable EPUB.
    #[error(transparent)]
    InvalidArchive(#[from] InvalidArchiveError),

    /// Cancellation was observed by the
    /// [`ChunkedProcessor`](crate::render::ChunkedProcessor) between slices.
    ///
    /// No partially processed content is returned.
    #[error("Processing was aborted")]
    Aborted,

    /// The blocking task running an asynchronous ingestion failed to complete.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

/// Reasons an archive is not a usable EPUB.
///
/// Each variant is fatal to ingestion.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum InvalidArchiveError {
    /// The fixed-location `META-INF/container.xml` entry does not exist.
    #[error("Missing `META-INF/container.xml`")]
    MissingContainer,

    /// `META-INF/container.xml` is not well-formed XML.
    #[error("Unparsable `META-INF/container.xml`: {0}")]
    UnparsableContainer(#[source] Box<dyn Error + Send + Sync + 'static>),

    /// `META-INF/container.xml` holds no recognizable `rootfile` reference.
    #[error("Missing `rootfile` element referencing an `.opf` file in `META-INF/container.xml`")]
    NoPackageReference,

    /// The referenced package `.opf` entry does not exist in the archive.
    #[error("Package file referenced by `META-INF/container.xml` does not exist: {0}")]
    MissingPackage(String),
}
