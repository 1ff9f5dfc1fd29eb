use crate::ingest::util::TestEpub;
use libris::epub::{IngestSettings, Ingestor};
use libris::errors::{EbookError, InvalidArchiveError};
use wasm_bindgen_test::wasm_bindgen_test;

#[test]
#[wasm_bindgen_test]
fn test_missing_container() {
    let bytes = TestEpub::empty().entry("OEBPS/content.opf", "<package/>").build();

    assert!(matches!(
        Ingestor::default().read(bytes),
        Err(EbookError::InvalidArchive(InvalidArchiveError::MissingContainer))
    ));
}

#[test]
#[wasm_bindgen_test]
fn test_missing_package() {
    let bytes = TestEpub::empty()
        .entry("META-INF/container.xml", crate::ingest::util::CONTAINER)
        .build();

    match Ingestor::default().read(bytes) {
        Err(EbookError::InvalidArchive(InvalidArchiveError::MissingPackage(path))) => {
            assert_eq!("OEBPS/content.opf", path);
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
#[wasm_bindgen_test]
fn test_unparsable_container() {
    let bytes = TestEpub::new()
        .entry("META-INF/container.xml", "<container><rootfiles></container>")
        .build();

    assert!(matches!(
        Ingestor::default().read(bytes),
        Err(EbookError::InvalidArchive(InvalidArchiveError::UnparsableContainer(_)))
    ));
}

#[test]
#[wasm_bindgen_test]
fn test_not_an_archive() {
    assert!(matches!(
        Ingestor::default().read(b"PK definitely not a zip".to_vec()),
        Err(EbookError::Archive(_))
    ));
}

#[test]
#[wasm_bindgen_test]
fn test_strict_media_type() {
    let container = r#"<container><rootfiles>
        <rootfile full-path="OEBPS/content.opf"/>
    </rootfiles></container>"#;
    let bytes = TestEpub::new().entry("META-INF/container.xml", container).build();

    // Relaxed by default
    let relaxed = Ingestor::default().read(bytes.clone()).unwrap();
    assert_eq!("OEBPS/content.opf", relaxed.package_path());

    let strict = Ingestor::new(IngestSettings::builder().strict(true)).read(bytes);
    assert!(matches!(
        strict,
        Err(EbookError::InvalidArchive(InvalidArchiveError::NoPackageReference))
    ));
}

#[test]
#[wasm_bindgen_test]
fn test_leading_slash_and_encoded_package_path() {
    let container = r#"<container><rootfiles>
        <rootfile full-path="/My%20Book/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles></container>"#;
    let bytes = TestEpub::empty()
        .entry("META-INF/container.xml", container)
        .entry(
            "My Book/content.opf",
            "<package><metadata><dc:title>Spaced</dc:title></metadata></package>",
        )
        .build();
    let ingested = Ingestor::default().read(bytes).unwrap();

    assert_eq!("My Book/content.opf", ingested.package_path());
    assert_eq!("Spaced", ingested.metadata().title());
}
