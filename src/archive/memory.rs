use crate::archive::errors::ArchiveResult;
use crate::archive::{self, Archive, ArchiveEntry, ArchiveError};
use std::collections::BTreeMap;

/// [`Archive`] over entries that are already decompressed and held in memory.
///
/// Entries enumerate in lexicographic path order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive(BTreeMap<String, Vec<u8>>);

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the entry at `path`.
    ///
    /// Paths ending with `/` are treated as directory markers.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let path = path.into();
        let key = archive::entry_key(&path).to_owned();
        self.0.insert(key, bytes.into());
    }

    /// Builder-style variant of [`Self::insert`].
    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl<P: Into<String>, B: Into<Vec<u8>>> FromIterator<(P, B)> for MemoryArchive {
    fn from_iter<T: IntoIterator<Item = (P, B)>>(iter: T) -> Self {
        let mut archive = Self::new();
        for (path, bytes) in iter {
            archive.insert(path, bytes);
        }
        archive
    }
}

impl Archive for MemoryArchive {
    fn entries(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        Ok(self
            .0
            .keys()
            .map(|path| ArchiveEntry::new(path.as_str(), path.ends_with('/')))
            .collect())
    }

    fn read_bytes(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        let key = archive::entry_key(path);

        match self.0.get(key) {
            Some(bytes) if !key.ends_with('/') => Ok(bytes.clone()),
            _ => Err(ArchiveError::MissingEntry {
                path: path.to_owned(),
            }),
        }
    }
}
