//! Output line terminator selection.
//!
//! Each terminator choice carries two representations: the character
//! sequence for ASCII-derived destinations, and a reserved raw byte
//! sequence for EBCDIC destinations. The EBCDIC bytes are not what a
//! naive re-encoding would produce: EBCDIC newline is `0x25`, so an
//! encoded `"\n"` must never reach an EBCDIC output file as `0x0A`.

use crate::{codec, EbcdicClassifier, Encoding, Result};

/// Output line terminator choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// Carriage return only
    Cr,
    /// Carriage return followed by line feed
    Crlf,
    /// Line feed only
    #[default]
    Lf,
}

impl LineTerminator {
    /// The terminator as a character sequence.
    pub fn as_str(self) -> &'static str {
        match self {
            LineTerminator::Cr => "\r",
            LineTerminator::Crlf => "\r\n",
            LineTerminator::Lf => "\n",
        }
    }

    /// The reserved raw byte sequence for EBCDIC destinations.
    pub fn ebcdic_bytes(self) -> &'static [u8] {
        match self {
            LineTerminator::Cr => &[0x0D],
            LineTerminator::Crlf => &[0x0D, 0x25],
            LineTerminator::Lf => &[0x25],
        }
    }

    /// The exact bytes to write after each line for the destination
    /// encoding.
    ///
    /// Consults the classifier; EBCDIC destinations get the reserved
    /// bytes, all others the encoded character sequence. Propagates the
    /// classifier's [`crate::ScrubError::Coding`] failure, and raises the
    /// same if the terminator characters cannot be encoded (no standard
    /// encoding does this).
    pub fn bytes(self, encoding: Encoding, classifier: &EbcdicClassifier) -> Result<Vec<u8>> {
        if classifier.is_ebcdic(encoding)? {
            return Ok(self.ebcdic_bytes().to_vec());
        }
        codec::encode_strict(encoding, self.as_str())
    }
}

impl std::str::FromStr for LineTerminator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cr" => Ok(LineTerminator::Cr),
            "crlf" => Ok(LineTerminator::Crlf),
            "lf" => Ok(LineTerminator::Lf),
            other => Err(format!("invalid line end '{other}' (expected cr, crlf or lf)")),
        }
    }
}

impl std::fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineTerminator::Cr => f.write_str("cr"),
            LineTerminator::Crlf => f.write_str("crlf"),
            LineTerminator::Lf => f.write_str("lf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_destinations_encode_the_characters() {
        let classifier = EbcdicClassifier::new();
        assert_eq!(
            LineTerminator::Lf.bytes(Encoding::UTF8, &classifier).unwrap(),
            b"\n"
        );
        assert_eq!(
            LineTerminator::Crlf.bytes(Encoding::ISO_8859_1, &classifier).unwrap(),
            b"\r\n"
        );
        assert_eq!(
            LineTerminator::Cr.bytes(Encoding::WINDOWS_1252, &classifier).unwrap(),
            b"\r"
        );
    }

    #[test]
    fn utf16_terminators_are_two_bytes_per_char() {
        let classifier = EbcdicClassifier::new();
        assert_eq!(
            LineTerminator::Lf.bytes(Encoding::UTF16LE, &classifier).unwrap(),
            vec![0x0A, 0x00]
        );
        assert_eq!(
            LineTerminator::Lf.bytes(Encoding::UTF16BE, &classifier).unwrap(),
            vec![0x00, 0x0A]
        );
    }

    #[test]
    fn ebcdic_destinations_use_reserved_bytes() {
        let classifier = EbcdicClassifier::new();
        assert_eq!(
            LineTerminator::Lf.bytes(Encoding::EBCDIC_037, &classifier).unwrap(),
            vec![0x25]
        );
        assert_eq!(
            LineTerminator::Cr.bytes(Encoding::EBCDIC_500, &classifier).unwrap(),
            vec![0x0D]
        );
        assert_eq!(
            LineTerminator::Crlf.bytes(Encoding::EBCDIC_1047, &classifier).unwrap(),
            vec![0x0D, 0x25]
        );
    }

    #[test]
    fn parse_choices() {
        assert_eq!("lf".parse::<LineTerminator>().unwrap(), LineTerminator::Lf);
        assert_eq!("CRLF".parse::<LineTerminator>().unwrap(), LineTerminator::Crlf);
        assert_eq!(" cr ".parse::<LineTerminator>().unwrap(), LineTerminator::Cr);
        assert!("nel".parse::<LineTerminator>().is_err());
    }
}
