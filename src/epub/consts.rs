// Paths
pub(crate) const CONTAINER: &str = "META-INF/container.xml";

// Container
pub(crate) const ROOT_FILE: &str = "rootfile";
pub(crate) const FULL_PATH: &str = "full-path";
pub(crate) const MEDIA_TYPE: &str = "media-type";
pub(crate) const OEBPS_PACKAGE: &str = "application/oebps-package+xml";

// Package
pub(crate) const METADATA: &str = "metadata";
pub(crate) const COVER: &str = "cover";
pub(crate) const COVER_IMAGE: &str = "cover-image";

// Metadata elements (matched by local name, ignoring `dc:`)
pub(crate) mod bytes {
    pub(crate) const TITLE: &[u8] = b"title";
    pub(crate) const CREATOR: &[u8] = b"creator";
    pub(crate) const PUBLISHER: &[u8] = b"publisher";
    pub(crate) const LANGUAGE: &[u8] = b"language";
    pub(crate) const IDENTIFIER: &[u8] = b"identifier";
    pub(crate) const DESCRIPTION: &[u8] = b"description";
    pub(crate) const DATE: &[u8] = b"date";
    pub(crate) const SUBJECT: &[u8] = b"subject";
}

/// Directory names conventionally holding images,
/// checked in order when guessing where a resource lives.
pub(crate) const IMAGE_DIRS: &[&str] = &[
    "images",
    "Images",
    "OEBPS/images",
    "OEBPS/Images",
    "OPS/images",
    "OPS/Images",
    "img",
    "graphics",
];

/// Extensions of raster image entries (lowercase, without the dot).
pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
