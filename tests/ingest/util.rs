use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PACKAGE_PATH: &str = "OEBPS/content.opf";

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01";
pub const PNG: &[u8] = b"\x89PNG\r\n\x1A\n\x00\x00\x00\rIHDR";
pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

/// Builds EPUB archives in memory, entry by entry.
pub struct TestEpub {
    entries: Vec<(String, Vec<u8>)>,
}

impl TestEpub {
    /// An archive with only a `mimetype` entry.
    pub fn empty() -> Self {
        Self {
            entries: vec![("mimetype".to_owned(), b"application/epub+zip".to_vec())],
        }
    }

    /// An archive with a container pointing at [`PACKAGE_PATH`] and a minimal package.
    pub fn new() -> Self {
        Self::empty()
            .entry("META-INF/container.xml", CONTAINER)
            .package("<dc:title>Example</dc:title>", "")
    }

    /// Adds or replaces an entry.
    pub fn entry(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.retain(|(existing, _)| existing != path);
        self.entries.push((path.to_owned(), bytes.into()));
        self
    }

    /// Replaces the package document at [`PACKAGE_PATH`].
    pub fn package(self, metadata: &str, manifest: &str) -> Self {
        let package = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{metadata}</metadata>
  <manifest>{manifest}</manifest>
  <spine/>
</package>"#
        );
        self.entry(PACKAGE_PATH, package)
    }

    /// Zips all entries (stored, uncompressed).
    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (path, bytes) in &self.entries {
            writer.start_file(path.as_str(), options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}
