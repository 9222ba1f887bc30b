// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Length-prefixed serialization of a frame sequence
//! onto/from a byte stream.
//!
//! ```text
//! record := uint32_be(body_len) || body     ; body_len = HEADER_LEN + ciphertext_len
//! ```
//!
//! No magic, no version byte, no trailer — the envelope is purely a sequence
//! of length-prefixed frame bodies, one after another, until the underlying
//! stream ends.

use std::io::{self, Read, Write};

use crate::error::{CodecError, FormatError};
use crate::frame::{Frame, HEADER_LEN};

/// Length prefix width in bytes.
const LEN_PREFIX: usize = 4;

/// Build the full `uint32_be(body_len) || body` record for one frame, the
/// same bytes [`EnvelopeWriter::write_frame`] sends to its inner writer.
///
/// Used directly by the text transcoder, which needs the record as a value
/// to hex/base64-encode rather than bytes already committed to a stream.
pub fn frame_to_record(frame: &Frame) -> Result<Vec<u8>, CodecError> {
    let body = frame.to_bytes();
    let len = u32::try_from(body.len()).map_err(|_| {
        FormatError::MalformedEnvelope {
            body_len: u32::MAX,
            max: u32::MAX,
        }
    })?;
    let mut record = Vec::with_capacity(LEN_PREFIX + body.len());
    record.extend_from_slice(&len.to_be_bytes());
    record.extend_from_slice(&body);
    Ok(record)
}

/// Parse a complete `uint32_be(body_len) || body` record back into a
/// [`Frame`], requiring the record to contain exactly one frame with no
/// residue. Used by the text transcoder, where each decoded line is already
/// one whole record rather than a slice of a longer byte stream.
pub fn frame_from_record(record: &[u8], max_frame_size: u32) -> Result<Frame, CodecError> {
    let max_body_len = HEADER_LEN as u32 + max_frame_size;
    if record.len() < LEN_PREFIX {
        return Err(FormatError::TruncatedEnvelope { residue: record.len() }.into());
    }
    let body_len = u32::from_be_bytes(record[0..LEN_PREFIX].try_into().unwrap());
    if body_len < HEADER_LEN as u32 + 1 || body_len > max_body_len {
        return Err(FormatError::MalformedEnvelope {
            body_len,
            max: max_body_len,
        }
        .into());
    }
    let body = &record[LEN_PREFIX..];
    if body.len() != body_len as usize {
        return Err(FormatError::TruncatedEnvelope { residue: body.len() }.into());
    }
    Ok(Frame::from_bytes(body)?)
}

/// Writes a length-prefixed envelope record for each frame handed to it.
pub struct EnvelopeWriter<W: Write> {
    inner: W,
}

impl<W: Write> EnvelopeWriter<W> {
    pub fn new(inner: W) -> Self {
        EnvelopeWriter { inner }
    }

    /// Write one frame as `uint32_be(len) || body`.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), CodecError> {
        let record = frame_to_record(frame)?;
        self.inner.write_all(&record)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads length-prefixed envelope records off a byte stream, parsing each
/// into a [`Frame`].
///
/// Bounds-checks the length prefix against `max_frame_size` before reading
/// the body, so a corrupt or hostile length prefix cannot force an unbounded
/// read.
pub struct EnvelopeReader<R: Read> {
    inner: R,
    max_body_len: u32,
}

impl<R: Read> EnvelopeReader<R> {
    pub fn new(inner: R, max_frame_size: u32) -> Self {
        EnvelopeReader {
            inner,
            max_body_len: HEADER_LEN as u32 + max_frame_size,
        }
    }

    /// Read the next record, returning `Ok(None)` at a clean end of stream
    /// (zero bytes read where a length prefix was expected).
    ///
    /// A stream that ends partway through a length prefix or a body is a
    /// [`FormatError::TruncatedEnvelope`], not a clean end.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, CodecError> {
        let mut len_bytes = [0u8; LEN_PREFIX];
        match read_exact_or_eof(&mut self.inner, &mut len_bytes)? {
            None => return Ok(None),
            Some(0) => return Ok(None),
            Some(n) if n < LEN_PREFIX => {
                return Err(FormatError::TruncatedEnvelope { residue: n }.into())
            }
            Some(_) => {}
        }

        let body_len = u32::from_be_bytes(len_bytes);
        if body_len < HEADER_LEN as u32 + 1 || body_len > self.max_body_len {
            return Err(FormatError::MalformedEnvelope {
                body_len,
                max: self.max_body_len,
            }
            .into());
        }

        let mut body = vec![0u8; body_len as usize];
        match read_exact_or_eof(&mut self.inner, &mut body)? {
            Some(n) if n == body.len() => {}
            Some(n) => return Err(FormatError::TruncatedEnvelope { residue: n }.into()),
            None => {
                return Err(FormatError::TruncatedEnvelope { residue: 0 }.into())
            }
        }

        let frame = Frame::from_bytes(&body)?;
        Ok(Some(frame))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Like `Read::read_exact`, but distinguishes a clean zero-byte EOF (returns
/// `Ok(None)`) from a short read partway through the buffer (returns
/// `Ok(Some(n))` with `n < buf.len()`).
fn read_exact_or_eof<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<Option<usize>> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(read))
    }
}
