use crate::archive::errors::ArchiveResult;
use crate::archive::{self, Archive, ArchiveEntry, ArchiveError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// [`Archive`] over a directory holding the contents of an unzipped EPUB.
#[derive(Debug)]
pub struct DirectoryArchive(PathBuf);

impl DirectoryArchive {
    /// # Errors
    /// [`ArchiveError::UnreadableArchive`] if `dir` does not exist or is not a directory.
    pub fn new(dir: &Path) -> ArchiveResult<Self> {
        match dir.canonicalize() {
            Ok(root) if root.is_dir() => Ok(Self(root)),
            Ok(_) => Err(ArchiveError::UnreadableArchive {
                path: Some(dir.to_path_buf()),
                source: io::Error::from(io::ErrorKind::NotADirectory),
            }),
            Err(source) => Err(ArchiveError::UnreadableArchive {
                path: Some(dir.to_path_buf()),
                source,
            }),
        }
    }

    fn get_path(&self, path: &str) -> ArchiveResult<PathBuf> {
        let joined = self.0.join(archive::entry_key(path));
        let resolved = joined
            .canonicalize()
            .map_err(|_| ArchiveError::MissingEntry {
                path: path.to_owned(),
            })?;

        // Path traversal mitigation
        if resolved.starts_with(&self.0) && resolved.is_file() {
            Ok(resolved)
        } else {
            Err(ArchiveError::MissingEntry {
                path: path.to_owned(),
            })
        }
    }
}

impl Archive for DirectoryArchive {
    fn entries(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        fn unreadable(source: io::Error, path: &Path) -> ArchiveError {
            ArchiveError::UnreadableArchive {
                path: Some(path.to_path_buf()),
                source,
            }
        }

        fn traverse(entries: &mut Vec<ArchiveEntry>, root: &Path, dir: &Path) -> ArchiveResult<()> {
            let mut children = dir
                .read_dir()
                .and_then(|read_dir| read_dir.collect::<io::Result<Vec<_>>>())
                .map_err(|err| unreadable(err, dir))?;
            // `read_dir` order is platform-dependent
            children.sort_by_key(fs::DirEntry::file_name);

            for entry in children {
                let file_type = entry.file_type().map_err(|err| unreadable(err, &entry.path()))?;

                // Symlinks are skipped to avoid escaping the root
                if file_type.is_symlink() {
                    continue;
                }

                let path = entry.path();
                // Only UTF-8 paths are supported
                let Some(relative) = path.strip_prefix(root).ok().and_then(Path::to_str) else {
                    continue;
                };
                // Enforce forward slashes
                let relative = relative.replace('\\', "/");

                if file_type.is_dir() {
                    entries.push(ArchiveEntry::new(relative + "/", true));
                    traverse(entries, root, &path)?;
                } else {
                    entries.push(ArchiveEntry::new(relative, false));
                }
            }
            Ok(())
        }

        let mut entries = Vec::new();
        traverse(&mut entries, &self.0, &self.0)?;
        Ok(entries)
    }

    fn read_bytes(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        let resolved = self.get_path(path)?;

        fs::read(&resolved).map_err(|source| ArchiveError::CannotRead {
            source,
            path: path.to_owned(),
        })
    }
}
