//! Byte-oriented access to the entries of an ebook container.
//!
//! An [`Archive`] lists entries and decompresses them by name.
//! The ingestion and cover logic only ever talks to this trait,
//! so any source (zip bytes, an unzipped directory, an in-memory map)
//! can be plugged in.

mod directory;
pub mod errors;
mod memory;
mod zip;

pub use self::directory::DirectoryArchive;
pub use self::errors::{ArchiveError, ArchiveResult};
pub use self::memory::MemoryArchive;
pub use self::zip::ZipArchive;

use crate::util;
use crate::util::sync::SendAndSync;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A single entry contained within an [`Archive`].
///
/// The path is archive-relative and always uses forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveEntry {
    path: String,
    is_directory: bool,
}

impl ArchiveEntry {
    pub(crate) fn new(path: impl Into<String>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
        }
    }

    /// The archive-relative location, such as `OEBPS/images/cover.jpg`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment, such as `cover.jpg`.
    pub fn file_name(&self) -> &str {
        util::uri::file_name(self.path.trim_end_matches('/'))
    }

    /// Returns `true` if the entry is a directory marker rather than a file.
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

/// Read access to the contents of an ebook container.
///
/// Requested paths are archive-relative;
/// a leading `/` is ignored (`/OEBPS/content.opf` == `OEBPS/content.opf`).
pub trait Archive: SendAndSync {
    /// All entries, in the order the underlying container enumerates them.
    fn entries(&self) -> ArchiveResult<Vec<ArchiveEntry>>;

    /// Decompresses and returns the raw bytes of the entry at `path`.
    ///
    /// # Errors
    /// [`ArchiveError::MissingEntry`] if no such entry exists.
    fn read_bytes(&self, path: &str) -> ArchiveResult<Vec<u8>>;

    /// Reads the entry at `path` as text.
    ///
    /// UTF-16 content with a byte order mark is converted to UTF-8,
    /// and a leading UTF-8 byte order mark is dropped.
    fn read_str(&self, path: &str) -> ArchiveResult<String> {
        util::utf::into_utf8_str(self.read_bytes(path)?).map_err(|source| {
            ArchiveError::InvalidUtf8Entry {
                source,
                path: path.to_owned(),
            }
        })
    }

    /// Returns `true` if a file entry exists at `path`.
    fn contains(&self, path: &str) -> bool {
        let key = entry_key(path);
        self.entries()
            .map(|entries| entries.iter().any(|e| !e.is_directory() && e.path() == key))
            .unwrap_or(false)
    }
}

/// Normalizes a requested path into the key form used by archives.
///
/// `/EPUB/OEBPS/toc.xhtml` -> `EPUB/OEBPS/toc.xhtml`
pub(crate) fn entry_key(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Opens the archive located at `path`.
///
/// Files are treated as zip containers; directories are treated as the
/// contents of an unzipped EPUB.
pub fn open_archive(path: &Path) -> ArchiveResult<Box<dyn Archive>> {
    Ok(if path.is_file() {
        let file = File::open(path).map_err(|error| ArchiveError::UnreadableArchive {
            source: error,
            path: Some(path.to_path_buf()),
        })?;
        Box::new(ZipArchive::new(BufReader::new(file), Some(path))?)
    } else {
        Box::new(DirectoryArchive::new(path)?)
    })
}
