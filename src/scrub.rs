//! The conversion engine.
//!
//! Reads the input file as text under the source encoding, processes it
//! line by line (optional smart-quote collapse, re-encode under the
//! destination encoding with the configured policy), writes each line
//! followed by the destination's terminator bytes, and finally hands the
//! output file to the platform tagging adapter.

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::{
    ccsid, tag, Decoder, EbcdicClassifier, Encoder, Encoding, LineTerminator, ReplacementPolicy,
    Result,
};

/// The fully-resolved parameters for one conversion run.
///
/// Built once from the command line, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Input file path
    pub input: PathBuf,
    /// Output file path (created or truncated)
    pub output: PathBuf,
    /// Encoding the input file is read as
    pub input_encoding: Encoding,
    /// Encoding the output file is written as
    pub output_encoding: Encoding,
    /// Policy for unconvertible and malformed units
    pub policy: ReplacementPolicy,
    /// Substitution text when the policy is replace
    pub replacement: String,
    /// Terminator written after every output line
    pub line_end: LineTerminator,
    /// Collapse curly quotes to their ASCII equivalents
    pub smart_quotes: bool,
}

/// Summary of a finished conversion
#[derive(Debug, Serialize)]
pub struct ConversionReport {
    /// Always true for a report that was returned (failures are errors)
    pub success: bool,
    /// Lines written to the output file
    pub lines: u64,
    /// Total bytes written, terminators included
    pub bytes_written: u64,
    /// Whether the platform CCSID tag was applied
    pub tagged: bool,
}

/// Run a conversion job to completion.
///
/// An empty input file produces an empty output file and still counts as
/// success. On an I/O failure the output may be left partially written;
/// the handle itself is always released. Tagging failures never surface
/// here - the adapter only logs them.
pub fn convert(job: &ConversionJob, classifier: &EbcdicClassifier) -> Result<ConversionReport> {
    let decoder = Decoder::new(job.input_encoding, job.policy, &job.replacement);
    let encoder = Encoder::new(job.output_encoding, job.policy, &job.replacement)?;
    let terminator = job.line_end.bytes(job.output_encoding, classifier)?;

    debug!(
        "converting {} ({}) -> {} ({})",
        job.input.display(),
        job.input_encoding,
        job.output.display(),
        job.output_encoding
    );

    let raw = fs::read(&job.input)?;
    let text = decoder.decode(&raw);

    let mut writer = BufWriter::new(fs::File::create(&job.output)?);
    let mut lines = 0u64;
    let mut bytes_written = 0u64;
    for line in split_lines(&text) {
        let line = if job.smart_quotes {
            collapse_smart_quotes(line)
        } else {
            Cow::Borrowed(line)
        };
        let encoded = encoder.encode_line(&line);
        writer.write_all(&encoded)?;
        writer.write_all(&terminator)?;
        lines += 1;
        bytes_written += (encoded.len() + terminator.len()) as u64;
    }
    writer.flush()?;
    drop(writer);

    let tagged = tag::set_ccsid_tag(&job.output, ccsid::ccsid_for(job.output_encoding));

    debug!("wrote {} lines, {} bytes", lines, bytes_written);
    Ok(ConversionReport {
        success: true,
        lines,
        bytes_written,
        tagged,
    })
}

/// Replace left/right curly quotes with their straight ASCII forms.
fn collapse_smart_quotes(line: &str) -> Cow<'_, str> {
    if !line
        .chars()
        .any(|c| matches!(c, '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
    {
        return Cow::Borrowed(line);
    }
    Cow::Owned(
        line.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                other => other,
            })
            .collect(),
    )
}

/// Split decoded text into lines on `\n`, `\r` or `\r\n`.
///
/// A trailing break does not produce a trailing empty line, so a file
/// ending in a newline round-trips without growing.
fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find(['\r', '\n']) {
            Some(at) => {
                let line = &self.rest[..at];
                let after = &self.rest[at..];
                let skip = if after.starts_with("\r\n") { 2 } else { 1 };
                self.rest = &after[skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}
