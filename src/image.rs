//! Raster image detection by magic bytes.
//!
//! A file named `cover.jpg` is only trusted as an image
//! once its leading bytes agree.

/// The minimum number of bytes a buffer must hold to be considered an image.
pub const MIN_IMAGE_LEN: usize = 8;

/// Raster formats recognized by their leading signature bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// `FF D8 FF`
    Jpeg,
    /// `89 50 4E 47`
    Png,
    /// `47 49 46` (`GIF`)
    Gif,
    /// `52 49 46 46` (`RIFF` container)
    WebP,
    /// `42 4D` (`BM`)
    Bmp,
}

impl ImageFormat {
    #[rustfmt::skip]
    const SIGNATURES: &'static [(&'static [u8], ImageFormat)] = &[
        (b"\xFF\xD8\xFF", Self::Jpeg),
        (b"\x89\x50\x4E\x47", Self::Png),
        (b"\x47\x49\x46", Self::Gif),
        (b"\x52\x49\x46\x46", Self::WebP),
        (b"\x42\x4D", Self::Bmp),
    ];

    /// Detects the format from the leading bytes of `data`.
    ///
    /// Returns [`None`] for buffers shorter than [`MIN_IMAGE_LEN`]
    /// or without a recognized signature.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < MIN_IMAGE_LEN {
            return None;
        }
        Self::SIGNATURES
            .iter()
            .find(|(signature, _)| data.starts_with(signature))
            .map(|(_, format)| *format)
    }

    /// Guesses the format from a file extension such as `jpg` or `.PNG`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');

        [
            ("jpg", Self::Jpeg),
            ("jpeg", Self::Jpeg),
            ("png", Self::Png),
            ("gif", Self::Gif),
            ("webp", Self::WebP),
            ("bmp", Self::Bmp),
        ]
        .into_iter()
        .find(|(ext, _)| extension.eq_ignore_ascii_case(ext))
        .map(|(_, format)| format)
    }

    /// The IANA media type, such as `image/jpeg`.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// The canonical file extension including its leading dot, such as `.jpg`.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Gif => ".gif",
            Self::WebP => ".webp",
            Self::Bmp => ".bmp",
        }
    }
}

/// Returns `true` if `data` starts with a recognized raster image signature.
///
/// Buffers shorter than [`MIN_IMAGE_LEN`] bytes are always rejected.
pub fn is_valid_image(data: &[u8]) -> bool {
    ImageFormat::detect(data).is_some()
}
