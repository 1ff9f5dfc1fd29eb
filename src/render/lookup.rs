use crate::archive::{Archive, ArchiveResult};
use crate::image::ImageFormat;
use crate::util::uri;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use tracing::debug;

const SVG_MEDIA_TYPE: &str = "image/svg+xml";

/// Maps archive resource paths to references a renderer can display directly,
/// such as `data:` URIs.
///
/// Besides full archive paths, bare file names may be registered as fallback keys
/// (see [`Self::insert_with_fallbacks`]).
/// The table is prepared once per book and only read while rewriting chapters.
///
/// # Examples
/// ```
/// # use libris::render::ResourceLookupTable;
/// let mut table = ResourceLookupTable::new();
/// table.insert_with_fallbacks("OEBPS/images/a.png", "data:image/png;base64,AAAA");
///
/// assert_eq!(Some("data:image/png;base64,AAAA"), table.get("OEBPS/images/a.png"));
/// assert_eq!(Some("data:image/png;base64,AAAA"), table.get("a.png"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLookupTable(HashMap<String, String>);

impl ResourceLookupTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table holding a base64 `data:` URI for every image entry within `archive`,
    /// keyed by archive path with file name fallbacks.
    ///
    /// The media type is taken from the image signature when recognized,
    /// otherwise from the entry extension.
    ///
    /// # Errors
    /// Any [`ArchiveError`](crate::archive::ArchiveError) raised while listing or reading entries.
    pub fn from_archive(archive: &dyn Archive) -> ArchiveResult<Self> {
        let mut table = Self::new();

        for entry in archive.entries()? {
            if entry.is_directory() {
                continue;
            }
            let extension = uri::extension(entry.path());
            let Some(guessed) = ImageFormat::from_extension(extension)
                .map(ImageFormat::media_type)
                .or_else(|| extension.eq_ignore_ascii_case(".svg").then_some(SVG_MEDIA_TYPE))
            else {
                continue;
            };
            let data = archive.read_bytes(entry.path())?;
            let media_type = ImageFormat::detect(&data).map_or(guessed, ImageFormat::media_type);

            table.insert_with_fallbacks(
                entry.path(),
                format!("data:{media_type};base64,{}", STANDARD.encode(&data)),
            );
        }

        debug!(resources = table.len(), "Prepared resource lookup table");
        Ok(table)
    }

    /// Registers `reference` for the given archive `path`, replacing any previous value.
    pub fn insert(&mut self, path: impl Into<String>, reference: impl Into<String>) {
        self.0.insert(path.into(), reference.into());
    }

    /// Registers `reference` for `path` and, if not yet taken, for its bare file name.
    ///
    /// The first resource registered under a file name keeps it.
    pub fn insert_with_fallbacks(&mut self, path: impl Into<String>, reference: impl Into<String>) {
        let path = path.into();
        let reference = reference.into();
        let file_name = uri::file_name(&path);

        if !file_name.is_empty() && file_name != path {
            self.0
                .entry(file_name.to_owned())
                .or_insert_with(|| reference.clone());
        }
        self.0.insert(path, reference);
    }

    /// Returns the reference registered under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The number of registered keys, fallbacks included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceLookupTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
