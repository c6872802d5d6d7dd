//! # ccsid-scrub - CCSID-Aware Text Re-Encoder
//!
//! Re-encodes text files between legacy CCSID/EBCDIC encodings and modern
//! Unicode encodings, normalizing line terminators along the way. Built for
//! environments where IBM i (OS/400) files tagged with Coded Character Set
//! Identifiers interoperate with UTF-8 tooling.
//!
//! ## Features
//!
//! - **CCSID resolution** from symbolic names or numeric identifiers
//! - **EBCDIC Latin-1 family** (CP037, CP500, CP1047 and euro variants)
//!   alongside UTF-8, UTF-16 and the common ASCII-derived code pages
//! - **Line-terminator normalization** with byte-exact EBCDIC output
//!   (LF is `0x25`, not `0x0A`, on an EBCDIC destination)
//! - **Configurable replacement policy** for unconvertible characters
//! - **Smart-quote collapse** to plain ASCII quotes
//! - **Best-effort CCSID tagging** of the output file on IBM i
//!
//! ## Quick Start
//!
//! ```rust
//! use ccsid_scrub::{ccsid, EbcdicClassifier, LineTerminator};
//!
//! // Numeric CCSIDs and symbolic names resolve to the same encoding
//! let enc = ccsid::resolve("37").unwrap();
//! assert_eq!(enc.name(), "IBM037");
//! assert_eq!(enc, ccsid::resolve("ibm037").unwrap());
//!
//! // EBCDIC destinations get the reserved terminator bytes
//! let classifier = EbcdicClassifier::new();
//! let bytes = LineTerminator::Lf.bytes(enc, &classifier).unwrap();
//! assert_eq!(bytes, vec![0x25]);
//! ```
//!
//! Malformed input bytes and unmappable output characters are both
//! handled by the single [`ReplacementPolicy`]: one knob decides whether
//! bad units are dropped or substituted, on both sides of the pipeline.

#![deny(missing_docs)]

use thiserror::Error;

pub mod ccsid;
pub mod codec;
pub mod ebcdic;
pub mod line_end;
pub mod scrub;
pub mod tag;
mod tables;

pub use codec::{Decoder, Encoder, ReplacementPolicy};
pub use ebcdic::EbcdicClassifier;
pub use line_end::LineTerminator;
pub use scrub::{ConversionJob, ConversionReport, convert};

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ScrubError>;

/// Errors that can occur while resolving encodings or converting files
#[derive(Debug, Error)]
pub enum ScrubError {
    /// Token matched neither a known charset name nor a numeric CCSID
    #[error("unknown encoding or CCSID '{0}'")]
    UnknownEncoding(String),

    /// A registered encoding failed to encode text it is expected to
    /// handle (EBCDIC probe, terminator characters)
    #[error("encoding '{encoding}' cannot represent {detail}")]
    Coding {
        /// Canonical name of the failing encoding
        encoding: &'static str,
        /// What could not be represented
        detail: String,
    },

    /// The configured replacement string is not encodable in the
    /// destination encoding
    #[error("replacement '{replacement}' cannot be encoded in '{encoding}'")]
    InvalidReplacement {
        /// The rejected replacement string
        replacement: String,
        /// Canonical name of the destination encoding
        encoding: &'static str,
    },

    /// File open/read/write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported character encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    /// UTF-8 Unicode encoding (variable length, 1-4 bytes)
    UTF8,
    /// UTF-16LE Unicode encoding (little endian)
    UTF16LE,
    /// UTF-16BE Unicode encoding (big endian)
    UTF16BE,
    /// ASCII (7-bit, 0-127)
    ASCII,
    /// ISO-8859-1 (Latin-1) - Western European
    ISO_8859_1,
    /// ISO-8859-15 (Latin-9) - Western European with Euro
    ISO_8859_15,
    /// Windows-1252 (Western European)
    WINDOWS_1252,
    /// IBM EBCDIC Code Page 037 (US/Canada)
    EBCDIC_037,
    /// IBM EBCDIC Code Page 500 (International)
    EBCDIC_500,
    /// IBM EBCDIC Code Page 1047 (Latin-1/Open Systems)
    EBCDIC_1047,
    /// IBM EBCDIC Code Page 1140 (US/Canada with Euro)
    EBCDIC_1140,
    /// IBM EBCDIC Code Page 1148 (International with Euro)
    EBCDIC_1148,
}

impl Encoding {
    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::ASCII => "US-ASCII",
            Encoding::ISO_8859_1 => "ISO-8859-1",
            Encoding::ISO_8859_15 => "ISO-8859-15",
            Encoding::WINDOWS_1252 => "Windows-1252",
            Encoding::EBCDIC_037 => "IBM037",
            Encoding::EBCDIC_500 => "IBM500",
            Encoding::EBCDIC_1047 => "IBM1047",
            Encoding::EBCDIC_1140 => "IBM1140",
            Encoding::EBCDIC_1148 => "IBM1148",
        }
    }

    /// Check if this encoding maps every character to exactly one byte
    pub fn is_single_byte(self) -> bool {
        !matches!(self, Encoding::UTF8 | Encoding::UTF16LE | Encoding::UTF16BE)
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_names() {
        assert_eq!(Encoding::UTF8.name(), "UTF-8");
        assert_eq!(Encoding::EBCDIC_037.name(), "IBM037");
        assert_eq!(Encoding::EBCDIC_1148.name(), "IBM1148");
        assert_eq!(Encoding::WINDOWS_1252.to_string(), "Windows-1252");
    }

    #[test]
    fn single_byte_predicate() {
        assert!(Encoding::EBCDIC_037.is_single_byte());
        assert!(Encoding::ISO_8859_1.is_single_byte());
        assert!(!Encoding::UTF8.is_single_byte());
        assert!(!Encoding::UTF16LE.is_single_byte());
    }

    #[test]
    fn error_messages() {
        let err = ScrubError::UnknownEncoding("bogus".into());
        assert_eq!(err.to_string(), "unknown encoding or CCSID 'bogus'");

        let err = ScrubError::InvalidReplacement {
            replacement: "\u{20AC}".into(),
            encoding: "US-ASCII",
        };
        assert!(err.to_string().contains("US-ASCII"));
    }
}
