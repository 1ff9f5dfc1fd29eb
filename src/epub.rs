//! EPUB package ingestion.
//!
//! Ingestion reads only the entries it needs:
//! `META-INF/container.xml`, the package `.opf` file, and cover candidates.
//!
//! For more information regarding the EPUB container format, see:
//! <https://www.w3.org/TR/epub/#sec-ocf>

mod consts;
mod container;
mod cover;
mod metadata;

pub use self::cover::{CoverLocator, CoverResult, CoverStrategy, LocatedCover, score_cover_candidate};
pub use self::metadata::Metadata;

pub(crate) use self::consts::IMAGE_DIRS;

use crate::archive::{self, Archive, ArchiveError, ZipArchive};
use crate::errors::{EbookError, EbookResult, InvalidArchiveError};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The outcome of ingesting one EPUB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    package_path: String,
    metadata: Metadata,
    cover: Option<CoverResult>,
}

impl Ingested {
    /// The archive path of the package `.opf` file, such as `OEBPS/content.opf`.
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// The extracted (possibly degraded) metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The saved cover, if one was found.
    pub fn cover(&self) -> Option<&CoverResult> {
        self.cover.as_ref()
    }

    /// Splits into the metadata and cover handed to persistence.
    pub fn into_parts(self) -> (Metadata, Option<CoverResult>) {
        (self.metadata, self.cover)
    }
}

/// Ingests EPUB archives according to [`IngestSettings`].
///
/// # Examples
/// - Ingesting EPUB bytes and saving the cover into a per-item directory:
/// ```no_run
/// # use libris::epub::{IngestSettings, Ingestor};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("/books/example.epub")?;
/// let ingested = Ingestor::new(IngestSettings::builder().cover_dir("/library/covers/42"))
///     .read(bytes)?;
///
/// println!("{}", ingested.metadata().title());
/// if let Some(cover) = ingested.cover() {
///     println!("cover saved to {}", cover.saved_file_path().display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    settings: IngestSettings,
}

impl Ingestor {
    /// Creates an ingestor with the given settings.
    pub fn new(settings: impl Into<IngestSettings>) -> Self {
        Self {
            settings: settings.into(),
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Ingests the raw bytes of an EPUB file.
    ///
    /// # Errors
    /// - [`EbookError::Archive`]: `bytes` are not a readable zip container.
    /// - [`EbookError::InvalidArchive`]: the container is not a usable EPUB.
    pub fn read(&self, bytes: impl Into<Vec<u8>>) -> EbookResult<Ingested> {
        let archive = ZipArchive::new(Cursor::new(bytes.into()), None)?;
        self.ingest(&archive)
    }

    /// Ingests an EPUB file, or a directory holding an unzipped EPUB.
    ///
    /// # Errors
    /// See [`Self::read`].
    pub fn open(&self, path: impl AsRef<Path>) -> EbookResult<Ingested> {
        let archive = archive::open_archive(path.as_ref())?;
        self.ingest(archive.as_ref())
    }

    /// Ingests an already opened [`Archive`].
    ///
    /// Metadata and cover failures degrade rather than fail:
    /// [`Metadata::default`] and no cover respectively.
    ///
    /// # Errors
    /// See [`Self::read`].
    pub fn ingest(&self, archive: &dyn Archive) -> EbookResult<Ingested> {
        let package_path = container::resolve_package_path(archive, self.settings.strict)?;
        let package = match archive.read_bytes(&package_path) {
            Ok(package) => package,
            Err(ArchiveError::MissingEntry { .. }) => {
                return Err(InvalidArchiveError::MissingPackage(package_path).into());
            }
            Err(error) => return Err(error.into()),
        };

        let metadata = if self.settings.skip_metadata {
            Metadata::default()
        } else {
            metadata::extract_metadata(&package)
        };

        let cover = match (&self.settings.cover_dir, self.settings.skip_cover) {
            (Some(cover_dir), false) => {
                // The package text only feeds a heuristic scan
                let package_text = String::from_utf8_lossy(&package);
                let cover = CoverLocator::new(archive)
                    .with_package(&package_path, &package_text)
                    .locate_and_save(cover_dir);

                if cover.is_none() {
                    warn!(%package_path, "No cover image found");
                }
                cover
            }
            _ => None,
        };

        info!(
            %package_path,
            title = metadata.title(),
            has_cover = cover.is_some(),
            "Ingested EPUB"
        );
        Ok(Ingested {
            package_path,
            metadata,
            cover,
        })
    }
}

/// Ingests the raw bytes of an EPUB on the tokio blocking pool,
/// so an async caller suspends rather than blocks during archive I/O.
///
/// # Errors
/// See [`Ingestor::read`]; additionally [`EbookError::Join`]
/// if the blocking task panics or is cancelled.
pub async fn ingest_async(
    bytes: Vec<u8>,
    settings: impl Into<IngestSettings>,
) -> EbookResult<Ingested> {
    let ingestor = Ingestor::new(settings);

    tokio::task::spawn_blocking(move || ingestor.read(bytes))
        .await
        .map_err(EbookError::Join)?
}

/// Configuration for an [`Ingestor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSettings {
    /// Directory receiving `cover<ext>`, created if absent.
    ///
    /// When [`None`], cover location is skipped.
    ///
    /// Default: [`None`]
    pub cover_dir: Option<PathBuf>,
    /// Skip metadata extraction and yield [`Metadata::default`].
    ///
    /// The package file must still exist.
    ///
    /// Default: `false`
    pub skip_metadata: bool,
    /// Skip cover location even when [`Self::cover_dir`] is set.
    ///
    /// Default: `false`
    pub skip_cover: bool,
    /// Require the container `rootfile` to declare the
    /// `application/oebps-package+xml` media type.
    ///
    /// Default: `false`
    pub strict: bool,
}

impl IngestSettings {
    /// Returns a builder to create an [`IngestSettings`] instance.
    pub fn builder() -> IngestSettingsBuilder {
        IngestSettingsBuilder(Self::default())
    }
}

impl From<IngestSettingsBuilder> for IngestSettings {
    fn from(value: IngestSettingsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct an [`IngestSettings`] instance.
///
/// # Examples
/// ```
/// # use libris::epub::IngestSettings;
/// let settings = IngestSettings::builder()
///     .cover_dir("/library/covers/42")
///     .strict(true)
///     .build();
///
/// assert!(settings.strict);
/// assert!(settings.cover_dir.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct IngestSettingsBuilder(IngestSettings);

impl IngestSettingsBuilder {
    /// Turn this builder into an [`IngestSettings`] instance.
    pub fn build(self) -> IngestSettings {
        self.0
    }

    /// See [`IngestSettings::cover_dir`].
    pub fn cover_dir(mut self, cover_dir: impl Into<PathBuf>) -> Self {
        self.0.cover_dir = Some(cover_dir.into());
        self
    }

    /// See [`IngestSettings::skip_metadata`].
    pub fn skip_metadata(mut self, skip_metadata: bool) -> Self {
        self.0.skip_metadata = skip_metadata;
        self
    }

    /// See [`IngestSettings::skip_cover`].
    pub fn skip_cover(mut self, skip_cover: bool) -> Self {
        self.0.skip_cover = skip_cover;
        self
    }

    /// See [`IngestSettings::strict`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.0.strict = strict;
        self
    }
}
