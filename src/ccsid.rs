//! CCSID and charset-name resolution.
//!
//! A user-supplied token is either a symbolic charset name (`UTF-8`,
//! `ibm037`, `latin1`) or a numeric Coded Character Set Identifier
//! (`37`, `1208`). Both resolve to the same [`Encoding`]; the inverse
//! direction recovers the numeric CCSID used for platform tagging.

use tracing::debug;

use crate::{Encoding, Result, ScrubError};

/// Resolve a symbolic name or numeric CCSID to an [`Encoding`].
///
/// Matching is case-insensitive and tolerant of surrounding whitespace.
/// Unknown tokens yield [`ScrubError::UnknownEncoding`]; deciding on a
/// fallback is the caller's business.
pub fn resolve(token: &str) -> Result<Encoding> {
    let trimmed = token.trim();

    if let Ok(ccsid) = trimmed.parse::<u32>() {
        return from_ccsid(ccsid).ok_or_else(|| ScrubError::UnknownEncoding(token.to_string()));
    }

    let encoding = match trimmed.to_uppercase().as_str() {
        "UTF8" | "UTF-8" => Encoding::UTF8,
        "UTF16LE" | "UTF-16LE" => Encoding::UTF16LE,
        // Unmarked UTF-16 is big-endian by convention, matching CCSID 1200
        "UTF16BE" | "UTF-16BE" | "UTF16" | "UTF-16" => Encoding::UTF16BE,
        "ASCII" | "US-ASCII" => Encoding::ASCII,
        "ISO88591" | "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Encoding::ISO_8859_1,
        "ISO885915" | "ISO-8859-15" | "ISO8859-15" | "LATIN9" | "LATIN-9" => Encoding::ISO_8859_15,
        "WINDOWS1252" | "WINDOWS-1252" | "WIN1252" | "CP1252" => Encoding::WINDOWS_1252,
        "EBCDIC037" | "IBM037" | "CP037" | "EBCDIC-CP-US" => Encoding::EBCDIC_037,
        "EBCDIC500" | "IBM500" | "CP500" | "EBCDIC-INTERNATIONAL" => Encoding::EBCDIC_500,
        "EBCDIC1047" | "IBM1047" | "CP1047" => Encoding::EBCDIC_1047,
        "EBCDIC1140" | "IBM1140" | "CP1140" => Encoding::EBCDIC_1140,
        "EBCDIC1148" | "IBM1148" | "CP1148" => Encoding::EBCDIC_1148,
        _ => return Err(ScrubError::UnknownEncoding(token.to_string())),
    };

    debug!("resolved '{}' to {}", token, encoding.name());
    Ok(encoding)
}

/// Look up the encoding registered for a numeric CCSID.
fn from_ccsid(ccsid: u32) -> Option<Encoding> {
    let encoding = match ccsid {
        37 => Encoding::EBCDIC_037,
        367 => Encoding::ASCII,
        500 => Encoding::EBCDIC_500,
        819 => Encoding::ISO_8859_1,
        923 => Encoding::ISO_8859_15,
        1047 => Encoding::EBCDIC_1047,
        1140 => Encoding::EBCDIC_1140,
        1148 => Encoding::EBCDIC_1148,
        // 1200 is the growing-UTF-16 CCSID, big-endian when untagged;
        // 13488 is its frozen UCS-2 predecessor still seen on IBM i
        1200 | 1201 | 13488 => Encoding::UTF16BE,
        1202 => Encoding::UTF16LE,
        1208 => Encoding::UTF8,
        1252 | 5348 => Encoding::WINDOWS_1252,
        _ => return None,
    };
    debug!("resolved CCSID {} to {}", ccsid, encoding.name());
    Some(encoding)
}

/// The numeric CCSID to stamp on files written in this encoding.
///
/// Returns `None` for encodings with no platform tag; tagging is then
/// skipped entirely.
pub fn ccsid_for(encoding: Encoding) -> Option<u16> {
    match encoding {
        Encoding::UTF8 => Some(1208),
        Encoding::UTF16LE => Some(1202),
        Encoding::UTF16BE => Some(1200),
        Encoding::ASCII => Some(367),
        Encoding::ISO_8859_1 => Some(819),
        Encoding::ISO_8859_15 => Some(923),
        Encoding::WINDOWS_1252 => Some(1252),
        Encoding::EBCDIC_037 => Some(37),
        Encoding::EBCDIC_500 => Some(500),
        Encoding::EBCDIC_1047 => Some(1047),
        Encoding::EBCDIC_1140 => Some(1140),
        Encoding::EBCDIC_1148 => Some(1148),
    }
}
