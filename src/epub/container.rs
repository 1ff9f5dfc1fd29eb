use crate::archive::{Archive, ArchiveError};
use crate::epub::consts;
use crate::errors::{EbookResult, InvalidArchiveError};
use crate::parser::ParserResult;
use crate::parser::xml::{self, XmlElement, XmlReader};
use crate::util::uri;
use quick_xml::events::Event;
use tracing::debug;

/// Reads `META-INF/container.xml` and returns the archive path of the package `.opf` file.
///
/// With `strict` enabled, only a `rootfile` declaring the
/// `application/oebps-package+xml` media type is accepted.
///
/// # Errors
/// - [`InvalidArchiveError::MissingContainer`]
/// - [`InvalidArchiveError::UnparsableContainer`]
/// - [`InvalidArchiveError::NoPackageReference`]
pub(crate) fn resolve_package_path(archive: &dyn Archive, strict: bool) -> EbookResult<String> {
    let data = match archive.read_bytes(consts::CONTAINER) {
        Ok(data) => data,
        Err(ArchiveError::MissingEntry { .. }) => {
            return Err(InvalidArchiveError::MissingContainer.into());
        }
        Err(error) => return Err(error.into()),
    };

    let package_path = parse_container(&data, strict)
        .map_err(InvalidArchiveError::UnparsableContainer)?
        .ok_or(InvalidArchiveError::NoPackageReference)?;

    debug!(%package_path, "Resolved package location");
    Ok(package_path)
}

/// Returns the first acceptable `rootfile` location.
///
/// Although rare, multiple package locations could exist.
/// Only the first is accepted as it is the default rendition.
fn parse_container(data: &[u8], strict: bool) -> ParserResult<Option<String>> {
    let mut reader = xml::reader(data);

    while let Some(event) = reader.next() {
        let el = match event? {
            Event::Start(el) | Event::Empty(el) if el.is_local_name(consts::ROOT_FILE) => el,
            _ => continue,
        };
        let Some(full_path) = el.get_attribute(consts::FULL_PATH) else {
            continue;
        };
        let media_type = el.get_attribute(consts::MEDIA_TYPE);

        if strict && media_type.as_deref() != Some(consts::OEBPS_PACKAGE) {
            continue;
        }

        let full_path = uri::decode(full_path.trim()).trim_start_matches('/').to_owned();
        if !full_path.is_empty() {
            return Ok(Some(full_path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::errors::EbookError;

    const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    #[test]
    fn test_parse_container() {
        #[rustfmt::skip]
        let expected = [
            (Some("OEBPS/content.opf"), CONTAINER, true),
            (Some("content.opf"), r#"<container><rootfiles><rootfile full-path="/content.opf"/></rootfiles></container>"#, false),
            (None, r#"<container><rootfiles><rootfile full-path="/content.opf"/></rootfiles></container>"#, true),
            (Some("My Book/content.opf"), r#"<c><rootfile full-path="My%20Book/content.opf"></rootfile></c>"#, false),
            (Some("b.opf"), r#"<c><rootfile/><rootfile full-path=""/><rootfile full-path="b.opf"/></c>"#, false),
            (None, r#"<container><rootfiles/></container>"#, false),
        ];

        for (expected, xml, strict) in expected {
            assert_eq!(
                expected.map(str::to_owned),
                parse_container(xml.as_bytes(), strict).unwrap(),
                "{xml}"
            );
        }
    }

    #[test]
    fn test_unparsable_container() {
        assert!(parse_container(b"<container><rootfiles></container>", false).is_err());
    }

    #[test]
    fn test_resolve_package_path_errors() {
        let missing = MemoryArchive::new().with("mimetype", "application/epub+zip");
        assert!(matches!(
            resolve_package_path(&missing, false),
            Err(EbookError::InvalidArchive(InvalidArchiveError::MissingContainer))
        ));

        let unreferenced = MemoryArchive::new().with(consts::CONTAINER, "<container/>");
        assert!(matches!(
            resolve_package_path(&unreferenced, false),
            Err(EbookError::InvalidArchive(InvalidArchiveError::NoPackageReference))
        ));

        let malformed = MemoryArchive::new().with(consts::CONTAINER, "<container><rootfiles></container>");
        assert!(matches!(
            resolve_package_path(&malformed, false),
            Err(EbookError::InvalidArchive(InvalidArchiveError::UnparsableContainer(_)))
        ));

        let valid = MemoryArchive::new().with(consts::CONTAINER, CONTAINER);
        assert_eq!("OEBPS/content.opf", resolve_package_path(&valid, true).unwrap());
    }
}
