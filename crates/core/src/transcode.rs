// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Line-oriented hex/base64 encoding of envelope
//! records for transport over text-only channels.
//!
//! One record per line, no framing markers beyond the newline itself. Each
//! line decodes independently — a corrupt line fails on its own without
//! poisoning its neighbors. Trailing empty lines are ignored.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::Encoding;
use crate::error::FormatError;

/// Encode a single envelope record (already length-prefixed bytes, or a raw
/// frame body — the transcoder is agnostic) as one text line, with no
/// trailing newline.
pub fn encode_line(encoding: Encoding, record: &[u8]) -> String {
    match encoding {
        Encoding::Binary => unreachable!("binary encoding has no line representation"),
        Encoding::Hex => hex::encode(record),
        Encoding::Base64 => BASE64.encode(record),
    }
}

/// Decode one text line back into record bytes. `line_number` is 1-based and
/// used only to annotate the error.
pub fn decode_line(
    encoding: Encoding,
    line: &str,
    line_number: usize,
) -> Result<Vec<u8>, FormatError> {
    match encoding {
        Encoding::Binary => unreachable!("binary encoding has no line representation"),
        Encoding::Hex => hex::decode(line).map_err(|e| FormatError::InvalidEncoding {
            encoding: "hex",
            line: line_number,
            reason: e.to_string(),
        }),
        Encoding::Base64 => BASE64.decode(line).map_err(|e| FormatError::InvalidEncoding {
            encoding: "base64",
            line: line_number,
            reason: e.to_string(),
        }),
    }
}

/// Encode a whole sequence of records as newline-joined text, with a single
/// trailing newline after the last record.
pub fn encode_lines<'a>(encoding: Encoding, records: impl Iterator<Item = &'a [u8]>) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&encode_line(encoding, record));
        out.push('\n');
    }
    out
}

/// Decode newline-separated text back into records, skipping trailing empty
/// lines (a final newline, or a run of blank lines at EOF) without treating
/// them as malformed input.
pub fn decode_lines(encoding: Encoding, text: &str) -> Result<Vec<Vec<u8>>, FormatError> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        out.push(decode_line(encoding, line, i + 1)?);
    }
    Ok(out)
}
