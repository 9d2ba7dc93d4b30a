//! Byte-to-text decoding for uploaded sources.

use irradiance_core::error::{IrradianceError, Result};
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';

/// How raw bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 only; invalid sequences are a [`IrradianceError::DecodeError`].
    Utf8,
    /// UTF-8 first, then Latin-1 (ISO-8859-1) when the bytes are not valid UTF-8.
    Utf8OrLatin1,
}

/// Decode `bytes` according to `encoding`, dropping a leading byte-order mark.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) => match encoding {
            TextEncoding::Utf8 => {
                return Err(IrradianceError::DecodeError(format!(
                    "input is not valid UTF-8: {}",
                    e
                )))
            }
            TextEncoding::Utf8OrLatin1 => {
                debug!("input is not valid UTF-8 ({}); decoding as Latin-1", e);
                decode_latin1(bytes)
            }
        },
    };

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Every byte maps to the Unicode code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
