//! Text decoding for template members.
//!
//! Template members are UTF-16LE JSON. A BOM of either endianness
//! overrides the default; UTF-8 is accepted as a fallback because some
//! third-party tooling re-saves members without re-encoding them.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("UTF-16 text has an odd byte length")]
    OddUtf16Length,
    #[error("invalid UTF-16 code unit sequence")]
    InvalidUtf16,
    #[error("text is neither valid UTF-16 nor valid UTF-8")]
    UnknownEncoding,
}

/// Decodes member bytes to a string, honoring a BOM when present and
/// defaulting to UTF-16LE otherwise. Any leading BOM character is
/// stripped from the result.
pub fn decode_member_text(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        let text = decode_utf16(&bytes[2..], true)?;
        return Ok(strip_bom(&text).to_string());
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let text = decode_utf16(&bytes[2..], false)?;
        return Ok(strip_bom(&text).to_string());
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        let text = std::str::from_utf8(&bytes[3..]).map_err(|_| DecodeError::UnknownEncoding)?;
        return Ok(strip_bom(text).to_string());
    }

    if looks_like_utf16(bytes, true) {
        let text = decode_utf16(bytes, true)?;
        return Ok(strip_bom(&text).to_string());
    }
    if looks_like_utf16(bytes, false) {
        let text = decode_utf16(bytes, false)?;
        return Ok(strip_bom(&text).to_string());
    }

    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::UnknownEncoding)?;
    Ok(strip_bom(text).to_string())
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddUtf16Length);
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16)
}

/// JSON documents open with an ASCII byte (`{`, `[`, or whitespace), so
/// UTF-16 members interleave NUL bytes in a predictable position for the
/// first two characters.
fn looks_like_utf16(bytes: &[u8], little_endian: bool) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    if little_endian {
        bytes[0] != 0 && bytes[1] == 0 && bytes[3] == 0
    } else {
        bytes[0] == 0 && bytes[2] == 0
    }
}

pub(crate) fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}
