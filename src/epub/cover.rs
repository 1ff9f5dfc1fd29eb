//! Cover image discovery.
//!
//! Strategies run in order and the first validated candidate wins:
//! 1. [`CoverStrategy::ExplicitReference`]: the package names its cover.
//! 2. [`CoverStrategy::NamingConvention`]: image names suggesting a cover, best score first.
//! 3. [`CoverStrategy::ConventionalDirectory`]: the first image in a well-known image directory.
//! 4. [`CoverStrategy::Fallback`]: any image, preferring ones that are not decorations.
//!
//! Every candidate must pass [`is_valid_image`] before it is accepted.

use crate::archive::{Archive, ArchiveEntry};
use crate::epub::consts;
use crate::image::{ImageFormat, is_valid_image};
use crate::util::str::StrExt;
use crate::util::uri;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// A `>` within a quoted attribute value does not end the tag
static ITEM_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:opf:)?item\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid item regex")
});
static META_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:opf:)?meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid meta regex")
});
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute regex")
});

/// Substrings of a file name that suggest a cover.
const COVER_HINTS: &[&str] = &["cover", "title", "front", "vol"];
/// Substrings of a file name that suggest a decorative, non-cover asset.
const DECORATION_HINTS: &[&str] = &["icon", "bullet", "ornament", "decoration"];

/// The strategy that produced a cover.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CoverStrategy {
    /// Referenced by the package: `cover-image` property, `<meta name="cover">`,
    /// an item with the id `cover`, or an item href containing `cover`.
    ExplicitReference,
    /// An image whose path suggests a cover, ranked by [`score_cover_candidate`].
    NamingConvention,
    /// The first image within a conventional image directory.
    ConventionalDirectory,
    /// Any image within the archive.
    Fallback,
}

/// A validated cover image, not yet written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedCover {
    path: String,
    data: Vec<u8>,
    strategy: CoverStrategy,
}

impl LocatedCover {
    /// The archive path of the originating entry.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The strategy that found this cover.
    pub fn strategy(&self) -> CoverStrategy {
        self.strategy
    }

    /// The extension of the originating entry including its dot (`.jpg`),
    /// or that of the detected format when the entry has none.
    pub fn extension(&self) -> &str {
        match uri::extension(&self.path) {
            "" => ImageFormat::detect(&self.data).map_or("", ImageFormat::extension),
            ext => ext,
        }
    }

    /// Writes the image to `<output_dir>/cover<ext>`, creating `output_dir` if absent.
    ///
    /// # Errors
    /// Any I/O error from creating the directory or writing the file.
    pub fn save(&self, output_dir: &Path) -> io::Result<CoverResult> {
        fs::create_dir_all(output_dir)?;

        let saved_file_path = output_dir.join(format!("cover{}", self.extension()));
        fs::write(&saved_file_path, &self.data)?;

        Ok(CoverResult {
            source_entry_path: self.path.clone(),
            saved_file_path,
            strategy: self.strategy,
        })
    }
}

/// A cover that has been saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverResult {
    source_entry_path: String,
    saved_file_path: PathBuf,
    strategy: CoverStrategy,
}

impl CoverResult {
    /// The archive path of the originating entry.
    pub fn source_entry_path(&self) -> &str {
        &self.source_entry_path
    }

    /// Where the cover was written;
    /// its extension matches that of [`Self::source_entry_path`].
    pub fn saved_file_path(&self) -> &Path {
        &self.saved_file_path
    }

    /// The strategy that found this cover.
    pub fn strategy(&self) -> CoverStrategy {
        self.strategy
    }
}

/// Ranks an image path by how likely it is to be a cover. Higher is better.
///
/// | Condition (file name, case-insensitive) | Score |
/// |---|---|
/// | contains `cover` | +10 |
/// | is exactly `cover.jpg` or `cover.png` | +15 |
/// | contains `title` | +8 |
/// | contains `front` | +8 |
/// | at the archive root or directly under an `images/` directory | +5 |
/// | each of `icon`, `bullet`, `ornament`, `decoration` | -5 |
/// | `.jpg`, `.jpeg` or `.png` extension | +2 |
pub fn score_cover_candidate(path: &str) -> i32 {
    let lower = path.to_ascii_lowercase();
    let name = uri::file_name(&lower);
    let dir = uri::parent(&lower);
    let mut score = 0;

    if name.contains("cover") {
        score += 10;

        if name == "cover.jpg" || name == "cover.png" {
            score += 15;
        }
    }
    if name.contains("title") {
        score += 8;
    }
    if name.contains("front") {
        score += 8;
    }
    if dir.is_empty() || dir == "images" || dir.ends_with("/images") {
        score += 5;
    }
    for hint in DECORATION_HINTS {
        if name.contains(hint) {
            score -= 5;
        }
    }
    if matches!(uri::extension(name), ".jpg" | ".jpeg" | ".png") {
        score += 2;
    }
    score
}

/// Searches an [`Archive`] for its most plausible cover image.
///
/// # Examples
/// ```
/// # use libris::archive::MemoryArchive;
/// # use libris::epub::CoverLocator;
/// let archive = MemoryArchive::new()
///     .with("images/cover.jpg", &b"\xFF\xD8\xFF\xE0\x00\x10JFIF"[..])
///     .with("images/random_icon.png", &b"\x89PNG\r\n\x1A\n"[..]);
///
/// let cover = CoverLocator::new(&archive).locate().unwrap();
/// assert_eq!("images/cover.jpg", cover.path());
/// ```
pub struct CoverLocator<'a> {
    archive: &'a dyn Archive,
    package: Option<(&'a str, &'a str)>,
}

impl<'a> CoverLocator<'a> {
    /// Creates a locator that only uses the heuristic strategies (2 to 4).
    pub fn new(archive: &'a dyn Archive) -> Self {
        Self {
            archive,
            package: None,
        }
    }

    /// Enables [`CoverStrategy::ExplicitReference`] using the raw package `.opf`
    /// text and its archive path (hrefs are resolved against its directory).
    pub fn with_package(mut self, package_path: &'a str, package: &'a str) -> Self {
        self.package = Some((package_path, package));
        self
    }

    /// Runs all strategies in order and returns the first validated candidate.
    ///
    /// Returns [`None`] if no strategy yields a genuine image.
    pub fn locate(&self) -> Option<LocatedCover> {
        let entries = self.archive.entries().unwrap_or_else(|error| {
            warn!(%error, "Unable to list archive entries; only explicit covers are considered");
            Vec::new()
        });
        let images: Vec<&ArchiveEntry> = entries.iter().filter(|e| is_image_entry(e)).collect();
        let mut search = Search::new(self.archive);

        if let Some((package_path, package)) = self.package {
            let candidates = explicit_candidates(package_path, package);
            if let Some(found) = search.first_valid(CoverStrategy::ExplicitReference, candidates) {
                return Some(found);
            }
        }

        let mut named: Vec<&str> = images
            .iter()
            .map(|e| e.path())
            .filter(|path| suggests_cover(path))
            .collect();
        // Stable: equal scores keep enumeration order
        named.sort_by_key(|path| Reverse(score_cover_candidate(path)));
        if let Some(found) = search.first_valid(CoverStrategy::NamingConvention, named) {
            return Some(found);
        }

        for dir in consts::IMAGE_DIRS {
            let prefix = format!("{dir}/");
            let mut in_dir: Vec<&str> = images
                .iter()
                .map(|e| e.path())
                .filter(|path| path.starts_with(&prefix))
                .collect();
            in_dir.sort_unstable();

            if let Some(found) = search.first_valid(CoverStrategy::ConventionalDirectory, in_dir) {
                return Some(found);
            }
        }

        let mut all: Vec<&str> = images.iter().map(|e| e.path()).collect();
        all.sort_unstable();
        // Stable: non-decorative images first, each group in lexicographic order
        all.sort_by_key(|path| is_decoration(path));
        search.first_valid(CoverStrategy::Fallback, all)
    }

    /// [`Self::locate`], then [`LocatedCover::save`] into `output_dir`.
    ///
    /// A save failure is logged and reported as no cover.
    pub fn locate_and_save(&self, output_dir: &Path) -> Option<CoverResult> {
        let located = self.locate()?;

        match located.save(output_dir) {
            Ok(result) => {
                info!(
                    source = result.source_entry_path(),
                    saved = %result.saved_file_path().display(),
                    strategy = ?result.strategy(),
                    "Saved cover image"
                );
                Some(result)
            }
            Err(error) => {
                warn!(
                    %error,
                    source = located.path(),
                    output_dir = %output_dir.display(),
                    "Unable to save cover image"
                );
                None
            }
        }
    }
}

/// Tracks candidates already rejected so no entry is read twice.
struct Search<'a> {
    archive: &'a dyn Archive,
    rejected: HashSet<String>,
}

impl<'a> Search<'a> {
    fn new(archive: &'a dyn Archive) -> Self {
        Self {
            archive,
            rejected: HashSet::new(),
        }
    }

    fn first_valid<S: AsRef<str>>(
        &mut self,
        strategy: CoverStrategy,
        candidates: impl IntoIterator<Item = S>,
    ) -> Option<LocatedCover> {
        debug!(?strategy, "Searching for cover");

        candidates
            .into_iter()
            .find_map(|candidate| self.try_candidate(strategy, candidate.as_ref()))
    }

    fn try_candidate(&mut self, strategy: CoverStrategy, path: &str) -> Option<LocatedCover> {
        if self.rejected.contains(path) {
            return None;
        }

        match self.archive.read_bytes(path) {
            Ok(data) if is_valid_image(&data) => {
                return Some(LocatedCover {
                    path: path.to_owned(),
                    data,
                    strategy,
                });
            }
            Ok(_) => debug!(path, "Rejected cover candidate: not a recognized image"),
            Err(error) => debug!(path, %error, "Rejected cover candidate: unreadable"),
        }
        self.rejected.insert(path.to_owned());
        None
    }
}

fn is_image_entry(entry: &ArchiveEntry) -> bool {
    let ext = uri::extension(entry.path()).trim_start_matches('.');
    !entry.is_directory()
        && consts::IMAGE_EXTENSIONS
            .iter()
            .any(|image_ext| ext.eq_ignore_ascii_case(image_ext))
}

fn suggests_cover(path: &str) -> bool {
    path.to_ascii_lowercase().contains_any(COVER_HINTS)
}

fn is_decoration(path: &str) -> bool {
    uri::file_name(&path.to_ascii_lowercase()).contains_any(DECORATION_HINTS)
}

/// Cover hrefs declared by the package, most authoritative first,
/// resolved to archive paths.
fn explicit_candidates(package_path: &str, package: &str) -> Vec<String> {
    let items: Vec<HashMap<String, String>> = ITEM_TAG
        .find_iter(package)
        .map(|tag| attributes(tag.as_str()))
        .collect();
    let href_of = |item: &HashMap<String, String>| item.get("href").cloned();
    let mut hrefs = Vec::new();

    // EPUB 3: `<item properties="cover-image" .../>`
    hrefs.extend(
        items
            .iter()
            .filter(|item| {
                item.get("properties")
                    .is_some_and(|p| p.split_whitespace().any(|p| p == consts::COVER_IMAGE))
            })
            .filter_map(href_of),
    );

    // EPUB 2: `<meta name="cover" content="item-id"/>`
    for meta in META_TAG.find_iter(package).map(|tag| attributes(tag.as_str())) {
        if meta.get("name").map(String::as_str) != Some(consts::COVER) {
            continue;
        }
        let Some(content) = meta.get("content") else {
            continue;
        };
        match items.iter().find(|item| item.get("id") == Some(content)) {
            Some(item) => hrefs.extend(href_of(item)),
            // Some packages place the href itself in `content`
            None if ImageFormat::from_extension(uri::extension(content)).is_some() => {
                hrefs.push(content.clone());
            }
            None => {}
        }
    }

    // `<item id="cover" href="..."/>`
    hrefs.extend(
        items
            .iter()
            .filter(|item| item.get("id").is_some_and(|id| id.eq_ignore_ascii_case(consts::COVER)))
            .filter_map(href_of),
    );

    // `<item href="...cover..."/>`
    hrefs.extend(
        items
            .iter()
            .filter_map(href_of)
            .filter(|href| href.to_ascii_lowercase().contains(consts::COVER)),
    );

    let package_dir = uri::parent(package_path);
    let mut seen = HashSet::new();

    hrefs
        .iter()
        .map(|href| {
            let resolved = uri::resolve(package_dir, uri::strip_query_and_fragment(href.trim()));
            let decoded = uri::decode(&resolved).into_owned();
            decoded.trim_start_matches('/').to_owned()
        })
        .filter(|path| !path.is_empty() && seen.insert(path.clone()))
        .collect()
}

/// Parses the attributes of a single raw start tag; keys are lowercased.
fn attributes(tag: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(tag)
        .filter_map(|captures| {
            let key = captures.get(1)?.as_str().to_ascii_lowercase();
            let value = captures.get(2).or_else(|| captures.get(3))?.as_str();
            let value = quick_xml::escape::unescape(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_owned());
            Some((key, value))
        })
        .collect()
}
