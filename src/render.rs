//! Render-time chapter processing.
//!
//! Everything here operates on one chapter at a time and is independent of ingestion.
//! A [`ResourceLookupTable`] is typically prepared once per book
//! ([`ResourceLookupTable::from_archive`]), then shared across chapters.

mod cancellation;
mod chunked;
mod lookup;
mod path;
mod rewrite;

pub use self::cancellation::CancellationToken;
pub use self::chunked::{ChunkedJob, ChunkedProcessor};
pub use self::lookup::ResourceLookupTable;
pub use self::path::resolve_reference;
pub use self::rewrite::{Chapter, ChapterRewriter, RewriteSettings, RewriteSettingsBuilder};
