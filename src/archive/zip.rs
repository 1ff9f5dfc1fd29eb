use crate::archive::errors::ArchiveResult;
use crate::archive::{self, Archive, ArchiveEntry, ArchiveError};
use crate::util::sync::{Guard, Lock};
use std::io;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive as Zip;
use zip::result::ZipError;

/// [`Archive`] over a zip container, such as a packaged `.epub` file.
pub struct ZipArchive<R>(Lock<Zip<R>>);

impl<R: Read + Seek> ZipArchive<R> {
    /// `reader` (and optional `path` for a more descriptive error message).
    ///
    /// # Errors
    /// [`ArchiveError::UnreadableArchive`] if `reader` is not a zip container.
    pub fn new(reader: R, path: Option<&Path>) -> ArchiveResult<Self> {
        Zip::new(reader)
            .map(|zip| Self(Lock::new(zip)))
            .map_err(|error| ArchiveError::UnreadableArchive {
                source: io::Error::from(error),
                path: path.map(Path::to_path_buf),
            })
    }
}

impl<#[cfg(feature = "threadsafe")] R: Send + Sync, #[cfg(not(feature = "threadsafe"))] R> Archive
    for ZipArchive<R>
where
    R: Read + Seek,
{
    fn entries(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        let lock = acquire_archive_lock(&self.0)?;

        Ok(lock
            .file_names()
            .map(|name| ArchiveEntry::new(name, name.ends_with('/')))
            .collect())
    }

    fn read_bytes(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        let mut lock = acquire_archive_lock(&self.0)?;
        let mut zip_file = match lock.by_name(archive::entry_key(path)) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingEntry {
                    path: path.to_owned(),
                });
            }
            Err(error) => {
                return Err(ArchiveError::CannotRead {
                    source: io::Error::from(error),
                    path: path.to_owned(),
                });
            }
        };
        let mut buf = Vec::new();

        zip_file
            .read_to_end(&mut buf)
            .map(|_| buf)
            .map_err(|error| ArchiveError::CannotRead {
                source: error,
                path: path.to_owned(),
            })
    }
}

fn acquire_archive_lock<T>(lock: &Lock<T>) -> ArchiveResult<Guard<'_, T>> {
    lock.acquire().ok_or_else(|| ArchiveError::UnreadableArchive {
        source: io::Error::other("ZipArchive reader is unavailable"),
        path: None,
    })
}
