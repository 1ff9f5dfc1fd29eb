use crate::ingest::util::TestEpub;
use libris::epub::{IngestSettings, Ingestor, Metadata};
use wasm_bindgen_test::wasm_bindgen_test;

#[test]
#[wasm_bindgen_test]
fn test_metadata() {
    let bytes = TestEpub::new()
        .package(
            r#"
            <dc:identifier id="uid">urn:isbn:9780000000000</dc:identifier>
            <dc:title>The <em>Nested</em> Title</dc:title>
            <dc:creator>Ada Lovelace</dc:creator>
            <dc:publisher>Example &amp; Sons</dc:publisher>
            <dc:language>en-GB</dc:language>
            <dc:description>First line.
                Second line.</dc:description>
            <dc:date>1843</dc:date>
            <dc:subject>Mathematics</dc:subject>
            <dc:subject>Computing</dc:subject>"#,
            "",
        )
        .build();
    let ingested = Ingestor::default().read(bytes).unwrap();
    let metadata = ingested.metadata();

    assert_eq!("The Nested Title", metadata.title());
    assert_eq!(Some("Ada Lovelace"), metadata.creator());
    assert_eq!(Some("Example & Sons"), metadata.publisher());
    assert_eq!(Some("en-GB"), metadata.language());
    assert_eq!(Some("urn:isbn:9780000000000"), metadata.identifier());
    assert_eq!(Some("First line. Second line."), metadata.description());
    assert_eq!(Some("1843"), metadata.date());
    assert_eq!(["Mathematics", "Computing"], metadata.subjects());
}

#[test]
#[wasm_bindgen_test]
fn test_degraded_metadata() {
    let bytes = TestEpub::new()
        .entry("OEBPS/content.opf", "<package><metadata><dc:title>Broken</metadata>")
        .build();
    let ingested = Ingestor::default().read(bytes).unwrap();

    // Degraded, not failed
    assert_eq!(&Metadata::default(), ingested.metadata());
    assert_eq!(Metadata::UNKNOWN_TITLE, ingested.metadata().title());
}

#[test]
#[wasm_bindgen_test]
fn test_missing_title() {
    let bytes = TestEpub::new()
        .package("<dc:creator>Anonymous</dc:creator>", "")
        .build();
    let metadata = Ingestor::default().read(bytes).unwrap().metadata().clone();

    assert!(metadata.has_unknown_title());
    assert_eq!(Some("Anonymous"), metadata.creator());
}

#[test]
#[wasm_bindgen_test]
fn test_skip_metadata() {
    let bytes = TestEpub::new().build();
    let ingested = Ingestor::new(IngestSettings::builder().skip_metadata(true))
        .read(bytes)
        .unwrap();

    assert_eq!(&Metadata::default(), ingested.metadata());
}
