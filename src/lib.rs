//! # libris
//!
//! EPUB ingestion and render-time resource resolution for personal library applications.
//!
//! # Overview
//! ## Ingestion
//! - [`archive`]: Read-only access to archive entries (zip, directory, or memory).
//! - [`epub`]: Locating the package, extracting [`Metadata`](epub::Metadata),
//!   and finding a cover with [`CoverLocator`](epub::CoverLocator).
//! - [`image`]: Raster image detection by signature.
//!
//! ## Rendering
//! - [`render`]: Relative path resolution, chapter resource rewriting,
//!   and cooperative chunked processing of large markup.
//!
//! ## Errors
//! - [`errors`]: [`EbookError`](errors::EbookError) and related error types.
//!
//! # Examples
//! Ingesting an EPUB:
//! ```no_run
//! use libris::epub::{IngestSettings, Ingestor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ingested = Ingestor::new(IngestSettings::builder().cover_dir("covers/42"))
//!     .open("example.epub")?;
//!
//! println!("Title = {}", ingested.metadata().title());
//! # Ok(())
//! # }
//! ```
//! Rewriting a chapter for display:
//! ```no_run
//! use libris::archive::open_archive;
//! use libris::render::{Chapter, ChapterRewriter, ResourceLookupTable};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = open_archive("example.epub".as_ref())?;
//! let table = ResourceLookupTable::from_archive(archive.as_ref())?;
//!
//! let href = "OEBPS/text/ch1.xhtml";
//! let chapter = Chapter::new("ch1", href, archive.read_str(href)?);
//! let html = ChapterRewriter::default().rewrite(&chapter, &table);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//! Diagnostics are emitted through [`tracing`];
//! installing a subscriber is left to the application.

pub mod archive;
pub mod epub;
pub mod errors;
pub mod image;
pub mod render;

mod parser;
mod util;

/// The prelude re-exports the most commonly used types.
///
/// ```
/// use libris::prelude::*;
/// ```
#[cfg(feature = "prelude")]
pub mod prelude {
    pub use crate::archive::Archive;
    pub use crate::epub::{CoverResult, IngestSettings, Ingested, Ingestor, Metadata};
    pub use crate::errors::{EbookError, EbookResult};
    pub use crate::render::{
        CancellationToken, Chapter, ChapterRewriter, ChunkedProcessor, ResourceLookupTable,
        RewriteSettings,
    };
}
