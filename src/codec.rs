//! Per-encoding decoding and encoding with a configurable error policy.
//!
//! Single-byte encodings go through the code-point tables; UTF-8 and
//! UTF-16 are handled algorithmically. Malformed input units and
//! unmappable output characters are both subject to the same
//! [`ReplacementPolicy`].

use std::collections::HashMap;

use crate::tables;
use crate::{Encoding, Result, ScrubError};

/// How unconvertible or malformed units are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Remove the offending unit from the output entirely
    #[default]
    Delete,
    /// Substitute the configured replacement string
    Replace,
}

impl std::str::FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delete" => Ok(ReplacementPolicy::Delete),
            "replace" => Ok(ReplacementPolicy::Replace),
            other => Err(format!("invalid option '{other}' (expected replace or delete)")),
        }
    }
}

/// Decodes bytes into text under a source encoding.
///
/// Decoding cannot fail: every malformed unit is resolved by the policy,
/// either dropped or replaced with the replacement string as text.
#[derive(Debug)]
pub struct Decoder {
    encoding: Encoding,
    policy: ReplacementPolicy,
    replacement: String,
}

impl Decoder {
    /// Create a decoder for the given source encoding.
    pub fn new(encoding: Encoding, policy: ReplacementPolicy, replacement: &str) -> Self {
        Self {
            encoding,
            policy,
            replacement: replacement.to_string(),
        }
    }

    /// Decode the full input buffer.
    pub fn decode(&self, input: &[u8]) -> String {
        match self.encoding {
            Encoding::UTF8 => self.decode_utf8(input),
            Encoding::UTF16LE => self.decode_utf16(input, false),
            Encoding::UTF16BE => self.decode_utf16(input, true),
            single_byte => {
                // Registered single-byte encodings always have a table.
                let mut out = String::with_capacity(input.len());
                if let Some(table) = tables::codepoints(single_byte) {
                    for &byte in input {
                        match tables::char_for(table, byte) {
                            Some(ch) => out.push(ch),
                            None => self.apply_policy(&mut out),
                        }
                    }
                }
                out
            }
        }
    }

    fn decode_utf8(&self, input: &[u8]) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, bad) = rest.split_at(err.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    self.apply_policy(&mut out);
                    // error_len is None for a truncated sequence at EOF
                    let skip = err.error_len().unwrap_or(bad.len());
                    rest = &bad[skip..];
                    if rest.is_empty() {
                        break;
                    }
                }
            }
        }
        out
    }

    fn decode_utf16(&self, input: &[u8], big_endian: bool) -> String {
        let mut units = Vec::with_capacity(input.len() / 2);
        let mut chunks = input.chunks_exact(2);
        for pair in chunks.by_ref() {
            let unit = if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            };
            units.push(unit);
        }
        let truncated = !chunks.remainder().is_empty();

        let mut out = String::with_capacity(units.len());
        for decoded in char::decode_utf16(units) {
            match decoded {
                Ok(ch) => out.push(ch),
                // unpaired surrogate
                Err(_) => self.apply_policy(&mut out),
            }
        }
        if truncated {
            self.apply_policy(&mut out);
        }
        out
    }

    fn apply_policy(&self, out: &mut String) {
        if self.policy == ReplacementPolicy::Replace {
            out.push_str(&self.replacement);
        }
    }
}

/// Encodes text into bytes under a destination encoding.
///
/// The replacement string is strictly pre-encoded at construction, so
/// policy application during encoding is a plain byte append.
#[derive(Debug)]
pub struct Encoder {
    encoding: Encoding,
    policy: ReplacementPolicy,
    replacement_bytes: Vec<u8>,
    reverse: Option<HashMap<char, u8>>,
}

impl Encoder {
    /// Create an encoder for the given destination encoding.
    ///
    /// Fails with [`ScrubError::InvalidReplacement`] when the replacement
    /// string itself cannot be represented in the destination encoding.
    pub fn new(encoding: Encoding, policy: ReplacementPolicy, replacement: &str) -> Result<Self> {
        let reverse = tables::codepoints(encoding).map(reverse_lookup);
        let replacement_bytes = encode_with(encoding, reverse.as_ref(), replacement)
            .map_err(|_| ScrubError::InvalidReplacement {
                replacement: replacement.to_string(),
                encoding: encoding.name(),
            })?;
        Ok(Self {
            encoding,
            policy,
            replacement_bytes,
            reverse,
        })
    }

    /// The destination encoding this encoder writes.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encode one line of text, applying the replacement policy to every
    /// unmappable character. No state carries over between calls.
    pub fn encode_line(&self, text: &str) -> Vec<u8> {
        match &self.reverse {
            Some(reverse) => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    match reverse.get(&ch) {
                        Some(&byte) => out.push(byte),
                        None => {
                            if self.policy == ReplacementPolicy::Replace {
                                out.extend_from_slice(&self.replacement_bytes);
                            }
                        }
                    }
                }
                out
            }
            // Unicode destinations represent everything
            None => unicode_bytes(self.encoding, text),
        }
    }
}

/// Strictly encode text, failing on the first unmappable character.
///
/// Used for the EBCDIC probe and the terminator characters, where an
/// unencodable character is an internal fault rather than user data.
pub fn encode_strict(encoding: Encoding, text: &str) -> Result<Vec<u8>> {
    let reverse = tables::codepoints(encoding).map(reverse_lookup);
    encode_with(encoding, reverse.as_ref(), text)
}

fn encode_with(
    encoding: Encoding,
    reverse: Option<&HashMap<char, u8>>,
    text: &str,
) -> Result<Vec<u8>> {
    match reverse {
        Some(reverse) => {
            let mut out = Vec::with_capacity(text.len());
            for ch in text.chars() {
                match reverse.get(&ch) {
                    Some(&byte) => out.push(byte),
                    None => {
                        return Err(ScrubError::Coding {
                            encoding: encoding.name(),
                            detail: format!("character '{}' (U+{:04X})", ch, ch as u32),
                        });
                    }
                }
            }
            Ok(out)
        }
        None => Ok(unicode_bytes(encoding, text)),
    }
}

fn unicode_bytes(encoding: Encoding, text: &str) -> Vec<u8> {
    match encoding {
        Encoding::UTF8 => text.as_bytes().to_vec(),
        Encoding::UTF16LE => text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect(),
        Encoding::UTF16BE => text
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
        // callers only reach here for table-less encodings
        _ => unreachable!(),
    }
}

fn reverse_lookup(table: &'static [u16; 256]) -> HashMap<char, u8> {
    let mut map = HashMap::with_capacity(256);
    for (byte, &cp) in table.iter().enumerate() {
        if cp == tables::UNMAPPED {
            continue;
        }
        if let Some(ch) = char::from_u32(cp as u32) {
            map.entry(ch).or_insert(byte as u8);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(encoding: Encoding, policy: ReplacementPolicy) -> Decoder {
        Decoder::new(encoding, policy, "?")
    }

    #[test]
    fn decode_ebcdic_hello() {
        let dec = decoder(Encoding::EBCDIC_037, ReplacementPolicy::Delete);
        assert_eq!(dec.decode(&[0xC8, 0xC5, 0xD3, 0xD3, 0xD6]), "HELLO");
    }

    #[test]
    fn decode_malformed_utf8_delete() {
        let dec = decoder(Encoding::UTF8, ReplacementPolicy::Delete);
        assert_eq!(dec.decode(b"ab\xFFcd"), "abcd");
    }

    #[test]
    fn decode_malformed_utf8_replace() {
        let dec = decoder(Encoding::UTF8, ReplacementPolicy::Replace);
        assert_eq!(dec.decode(b"ab\xFFcd"), "ab?cd");
        // truncated multi-byte sequence at EOF counts as one bad unit
        assert_eq!(dec.decode(b"ab\xE2\x82"), "ab?");
    }

    #[test]
    fn decode_utf16le() {
        let dec = decoder(Encoding::UTF16LE, ReplacementPolicy::Delete);
        assert_eq!(dec.decode(&[0x48, 0x00, 0x69, 0x00]), "Hi");
    }

    #[test]
    fn decode_utf16_odd_length_and_lone_surrogate() {
        let dec = decoder(Encoding::UTF16BE, ReplacementPolicy::Replace);
        // lone high surrogate 0xD800, then 'A', then a trailing odd byte
        assert_eq!(dec.decode(&[0xD8, 0x00, 0x00, 0x41, 0x41]), "?A?");
    }

    #[test]
    fn decode_unmapped_single_byte() {
        let del = decoder(Encoding::ASCII, ReplacementPolicy::Delete);
        assert_eq!(del.decode(b"a\xFFb"), "ab");
        let rep = decoder(Encoding::ASCII, ReplacementPolicy::Replace);
        assert_eq!(rep.decode(b"a\xFFb"), "a?b");
    }

    #[test]
    fn encode_euro_to_ascii_policies() {
        let del = Encoder::new(Encoding::ASCII, ReplacementPolicy::Delete, "?").unwrap();
        assert_eq!(del.encode_line("a\u{20AC}b"), b"ab");

        let rep = Encoder::new(Encoding::ASCII, ReplacementPolicy::Replace, "?").unwrap();
        assert_eq!(rep.encode_line("a\u{20AC}b"), b"a?b");
    }

    #[test]
    fn encode_to_ebcdic() {
        let enc = Encoder::new(Encoding::EBCDIC_037, ReplacementPolicy::Delete, "?").unwrap();
        assert_eq!(enc.encode_line("AB0"), vec![0xC1, 0xC2, 0xF0]);
    }

    #[test]
    fn encode_multi_char_replacement() {
        let enc = Encoder::new(Encoding::ASCII, ReplacementPolicy::Replace, "<?>").unwrap();
        assert_eq!(enc.encode_line("\u{20AC}"), b"<?>");
    }

    #[test]
    fn unencodable_replacement_is_rejected() {
        let err = Encoder::new(Encoding::ASCII, ReplacementPolicy::Replace, "\u{20AC}");
        assert!(matches!(err, Err(ScrubError::InvalidReplacement { .. })));
    }

    #[test]
    fn encode_strict_rejects_unmappable() {
        assert!(encode_strict(Encoding::ASCII, "ok").is_ok());
        assert!(matches!(
            encode_strict(Encoding::ASCII, "\u{20AC}"),
            Err(ScrubError::Coding { .. })
        ));
    }

    #[test]
    fn utf16_round_trip_through_encoder() {
        let enc = Encoder::new(Encoding::UTF16LE, ReplacementPolicy::Delete, "?").unwrap();
        let bytes = enc.encode_line("Hi\u{20AC}");
        let dec = decoder(Encoding::UTF16LE, ReplacementPolicy::Delete);
        assert_eq!(dec.decode(&bytes), "Hi\u{20AC}");
    }
}
