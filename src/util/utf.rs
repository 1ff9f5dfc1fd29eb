use std::string::{FromUtf8Error, FromUtf16Error};
use thiserror::Error;

/// Specific error details regarding text decoding of an archive entry.
#[derive(Error, Debug)]
pub enum UtfError {
    /// The entry starts with a UTF-16 byte order mark but has an odd byte count.
    #[error("UTF-16 data needs to contain an even amount of bytes")]
    UnevenByteCount,
    /// The entry is neither UTF-16 (with a byte order mark) nor valid UTF-8.
    #[error(transparent)]
    InvalidUtf8(FromUtf8Error),
    /// The entry starts with a UTF-16 byte order mark but is not valid UTF-16.
    #[error(transparent)]
    InvalidUtf16(FromUtf16Error),
}

const UTF_8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes entry bytes into a [`String`].
///
/// UTF-16 is only recognized when a byte order mark is present.
/// A UTF-8 byte order mark is dropped.
pub(crate) fn into_utf8_str(mut data: Vec<u8>) -> Result<String, UtfError> {
    if is_utf16(&data) {
        from_utf16(&data)
    } else {
        if data.starts_with(UTF_8_BOM) {
            data.drain(..UTF_8_BOM.len());
        }
        String::from_utf8(data).map_err(UtfError::InvalidUtf8)
    }
}

/// Checks if a UTF-16 byte order mark (BOM) exists
fn is_utf16(data: &[u8]) -> bool {
    data.starts_with(b"\xFF\xFE") || data.starts_with(b"\xFE\xFF")
}

fn from_utf16(data: &[u8]) -> Result<String, UtfError> {
    // Determine byte order for little endian (le) and big endian (be)
    let endian = if data.starts_with(b"\xFF") {
        u16::from_le_bytes
    } else {
        u16::from_be_bytes
    };

    let utf16 = data[2..]
        .chunks(2)
        .map(|chunk| chunk.try_into().map(endian))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| UtfError::UnevenByteCount)?;

    String::from_utf16(&utf16).map_err(UtfError::InvalidUtf16)
}
