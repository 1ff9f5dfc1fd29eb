//! Bibliographic metadata from the package `<metadata>` block.

use crate::epub::consts::{self, bytes};
use crate::parser::ParserResult;
use crate::parser::xml::{self, XmlElement, XmlReader};
use quick_xml::events::Event;
use tracing::{debug, warn};

/// Normalized bibliographic record of an EPUB.
///
/// [`Metadata::title`] is never empty;
/// when a title cannot be found it is [`Metadata::UNKNOWN_TITLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    title: String,
    creator: Option<String>,
    publisher: Option<String>,
    language: Option<String>,
    identifier: Option<String>,
    description: Option<String>,
    date: Option<String>,
    subjects: Vec<String>,
}

impl Metadata {
    /// The title given to a book whose package provides none.
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    /// The main title (`dc:title`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns `true` if the title is the [`Self::UNKNOWN_TITLE`] placeholder.
    pub fn has_unknown_title(&self) -> bool {
        self.title == Self::UNKNOWN_TITLE
    }

    /// The first `dc:creator`.
    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    /// The first `dc:publisher`.
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    /// The first `dc:language`.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The first `dc:identifier`.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The first `dc:description`.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The first `dc:date`, verbatim.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Every `dc:subject`, in document order.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }
}

impl Default for Metadata {
    /// The degraded record: an unknown title and nothing else.
    fn default() -> Self {
        Self {
            title: Self::UNKNOWN_TITLE.to_owned(),
            creator: None,
            publisher: None,
            language: None,
            identifier: None,
            description: None,
            date: None,
            subjects: Vec::new(),
        }
    }
}

/// Extracts [`Metadata`] from the raw package `.opf` document.
///
/// Never fails; malformed packages degrade to [`Metadata::default`].
pub(crate) fn extract_metadata(package: &[u8]) -> Metadata {
    match parse_metadata(package) {
        Ok(metadata) => {
            debug!(title = metadata.title(), "Extracted metadata");
            metadata
        }
        Err(error) => {
            warn!(%error, "Unable to parse package metadata; using defaults");
            Metadata::default()
        }
    }
}

fn parse_metadata(package: &[u8]) -> ParserResult<Metadata> {
    let mut reader = xml::reader(package);
    let mut metadata = Metadata::default();
    let mut title = None;
    let mut in_metadata = false;

    while let Some(event) = reader.next() {
        match event? {
            Event::Start(el) if !in_metadata => {
                in_metadata = el.is_local_name(consts::METADATA);
            }
            // Only the first `<metadata>` block is considered
            Event::End(el) if in_metadata && el.local_name().as_ref() == consts::METADATA.as_bytes() => {
                break;
            }
            Event::Start(el) if in_metadata => {
                let field = match el.local_name().as_ref() {
                    bytes::TITLE => &mut title,
                    bytes::CREATOR => &mut metadata.creator,
                    bytes::PUBLISHER => &mut metadata.publisher,
                    bytes::LANGUAGE => &mut metadata.language,
                    bytes::IDENTIFIER => &mut metadata.identifier,
                    bytes::DESCRIPTION => &mut metadata.description,
                    bytes::DATE => &mut metadata.date,
                    bytes::SUBJECT => {
                        let subject = reader.get_text_simple(&el)?;
                        if !subject.is_empty() {
                            metadata.subjects.push(subject);
                        }
                        continue;
                    }
                    _ => continue,
                };
                let value = reader.get_text_simple(&el)?;

                // First non-empty occurrence wins
                if field.is_none() && !value.is_empty() {
                    field.replace(value);
                }
            }
            _ => {}
        }
    }

    if let Some(title) = title {
        metadata.title = title;
    }
    Ok(metadata)
}
