use crate::ingest::util::{GIF, JPEG, PNG, TestEpub};
use libris::archive::MemoryArchive;
use libris::epub::{
    CoverLocator, CoverResult, CoverStrategy, IngestSettings, Ingestor, score_cover_candidate,
};
use std::fs;
use std::path::Path;
use wasm_bindgen_test::wasm_bindgen_test;

fn ingest_cover(epub: TestEpub, cover_dir: &Path) -> Option<CoverResult> {
    Ingestor::new(IngestSettings::builder().cover_dir(cover_dir))
        .read(epub.build())
        .unwrap()
        .cover()
        .cloned()
}

#[test]
fn test_explicit_reference_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let epub = TestEpub::new()
        .package(
            "<dc:title>Explicit</dc:title>",
            r#"<item id="cover" href="art/front-art.png" media-type="image/png"/>"#,
        )
        .entry("cover.jpg", JPEG)
        .entry("OEBPS/art/front-art.png", PNG);
    let cover = ingest_cover(epub, dir.path()).unwrap();

    assert_eq!("OEBPS/art/front-art.png", cover.source_entry_path());
    assert_eq!(CoverStrategy::ExplicitReference, cover.strategy());
    assert_eq!(dir.path().join("cover.png"), cover.saved_file_path());
    assert_eq!(PNG, fs::read(cover.saved_file_path()).unwrap());
}

#[test]
fn test_epub2_meta_and_epub3_property() {
    let dir = tempfile::tempdir().unwrap();

    let epub2 = TestEpub::new()
        .package(
            r#"<meta name="cover" content="img-1"/>"#,
            r#"<item id="img-1" href="images/a.gif" media-type="image/gif"/>
               <item id="img-2" href="images/b.png" media-type="image/png"/>"#,
        )
        .entry("OEBPS/images/a.gif", GIF)
        .entry("OEBPS/images/b.png", PNG);
    let cover = ingest_cover(epub2, &dir.path().join("epub2")).unwrap();
    assert_eq!("OEBPS/images/a.gif", cover.source_entry_path());
    assert_eq!(CoverStrategy::ExplicitReference, cover.strategy());

    let epub3 = TestEpub::new()
        .package(
            "",
            r#"<item id="img-1" href="images/a.gif" media-type="image/gif"/>
               <item id="img-2" href="images/b%20c.png" properties="cover-image" media-type="image/png"/>"#,
        )
        .entry("OEBPS/images/a.gif", GIF)
        .entry("OEBPS/images/b c.png", PNG);
    let cover = ingest_cover(epub3, &dir.path().join("epub3")).unwrap();
    assert_eq!("OEBPS/images/b c.png", cover.source_entry_path());
    assert_eq!(dir.path().join("epub3/cover.png"), cover.saved_file_path());
}

#[test]
fn test_naming_convention_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let epub = TestEpub::new()
        .entry("random_icon.png", PNG)
        .entry("OEBPS/images/title-page.png", PNG)
        .entry("cover.jpg", JPEG);
    let cover = ingest_cover(epub, dir.path()).unwrap();

    assert_eq!("cover.jpg", cover.source_entry_path());
    assert_eq!(CoverStrategy::NamingConvention, cover.strategy());
    assert!(score_cover_candidate("cover.jpg") > score_cover_candidate("random_icon.png"));
}

#[test]
fn test_fake_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let epub = TestEpub::new()
        .package("", r#"<item id="cover" href="images/cover.jpg" media-type="image/jpeg"/>"#)
        .entry("OEBPS/images/cover.jpg", "<html>not an image</html>")
        .entry("OEBPS/images/plate.png", PNG);
    let cover = ingest_cover(epub, dir.path()).unwrap();

    assert_eq!("OEBPS/images/plate.png", cover.source_entry_path());
    assert_eq!(CoverStrategy::ConventionalDirectory, cover.strategy());
}

#[test]
fn test_fallback_avoids_decorations() {
    let archive = MemoryArchive::new()
        .with("OEBPS/art/bullet.png", PNG)
        .with("OEBPS/art/plate-01.jpg", JPEG);
    let cover = CoverLocator::new(&archive).locate().unwrap();

    assert_eq!("OEBPS/art/plate-01.jpg", cover.path());
    assert_eq!(CoverStrategy::Fallback, cover.strategy());
}

#[test]
fn test_no_cover() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("covers");
    let epub = TestEpub::new().entry("OEBPS/images/cover.jpg", [0u8; 64].to_vec());

    assert!(ingest_cover(epub, &output).is_none());
    assert!(!output.exists());
}

#[test]
fn test_save_failure_degrades() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the output directory should be
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "").unwrap();

    let epub = TestEpub::new().entry("cover.jpg", JPEG);
    let ingested = Ingestor::new(IngestSettings::builder().cover_dir(&blocked))
        .read(epub.build())
        .unwrap();

    assert_eq!("Example", ingested.metadata().title());
    assert!(ingested.cover().is_none());
}

#[test]
#[wasm_bindgen_test]
fn test_score_cover_candidate() {
    #[rustfmt::skip]
    let expected = [
        (32, "cover.jpg"),
        (32, "OEBPS/images/cover.png"),
        (10, "OEBPS/art/cover.gif"),
        (20, "OEBPS/front-cover.jpeg"),
        (2, "random_icon.png"),
        (-15, "OEBPS/art/bullet_ornament_icon.gif"),
    ];

    for (expected, path) in expected {
        assert_eq!(expected, score_cover_candidate(path), "{path}");
    }
}
