//! EBCDIC family classification.
//!
//! An encoding is EBCDIC when it encodes `"A"` as `0xC1`, the code point
//! `A` occupies in every EBCDIC code page. The probe runs once per
//! encoding per classifier instance; results are cached for the life of
//! the process.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::{codec, Encoding, Result};

/// The byte every EBCDIC code page assigns to `A`.
const EBCDIC_CAPITAL_A: u8 = 0xC1;

/// Probe-based EBCDIC classifier with a per-instance cache.
///
/// Constructed once at start-up and shared by the conversion pipeline;
/// the cache never changes an entry once written. Single-threaded use is
/// the norm, the mutex just keeps the component safe to share.
#[derive(Debug, Default)]
pub struct EbcdicClassifier {
    cache: Mutex<HashMap<Encoding, bool>>,
}

impl EbcdicClassifier {
    /// Create a classifier with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Determine whether the encoding is an EBCDIC-family encoding.
    ///
    /// Fails with [`crate::ScrubError::Coding`] if the encoding cannot
    /// represent `"A"` at all, which no registered encoding should hit.
    pub fn is_ebcdic(&self, encoding: Encoding) -> Result<bool> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&cached) = cache.get(&encoding) {
            return Ok(cached);
        }

        let probe = codec::encode_strict(encoding, "A")?;
        let is_ebcdic = probe.first() == Some(&EBCDIC_CAPITAL_A);
        cache.insert(encoding, is_ebcdic);

        debug!(
            "determined that encoding '{}' {} EBCDIC",
            encoding.name(),
            if is_ebcdic { "is" } else { "is not" }
        );
        Ok(is_ebcdic)
    }
}
