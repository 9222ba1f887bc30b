// MPL-2.0: https://mozilla.org/MPL/2.0/

//! A push/finish transducer that turns an arbitrary
//! sequence of plaintext byte chunks into a sequence of [`Frame`]s (and back),
//! without requiring the whole object to be resident in memory at once.

use crate::config::CodecConfig;
use crate::error::{AuthError, CodecError, FormatError, OrderError, SecurityError};
use crate::frame::{decrypt_frame, encrypt_frame, Frame};
use crate::keys::ObjectSubkey;
use crate::validate::{validate_frame_index, zeroize_buffer};

/// Accumulates pushed bytes and emits one [`Frame`] per `frame_size` bytes.
///
/// Call [`EncryptFramer::push`] any number of times with arbitrarily sized
/// chunks, then [`EncryptFramer::finish`] once to flush the final (possibly
/// short) frame. An object of zero total length yields zero frames, per S1.
pub struct EncryptFramer<'a> {
    subkey: &'a ObjectSubkey,
    object_id: &'a str,
    frame_size: usize,
    max_frame_index: u32,
    buffer: Vec<u8>,
    next_index: u32,
    bytes_in: u64,
}

impl<'a> EncryptFramer<'a> {
    pub fn new(subkey: &'a ObjectSubkey, object_id: &'a str, config: &CodecConfig) -> Self {
        let frame_size = config.frame_size as usize;
        EncryptFramer {
            subkey,
            object_id,
            frame_size,
            max_frame_index: config.max_frame_index,
            buffer: Vec::with_capacity(frame_size),
            next_index: 0,
            bytes_in: 0,
        }
    }

    /// Total plaintext bytes observed so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Append plaintext bytes, emitting every complete frame they produce.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, CodecError> {
        self.bytes_in += chunk.len() as u64;
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while self.buffer.len() >= self.frame_size {
            let rest = self.buffer.split_off(self.frame_size);
            let mut plaintext = std::mem::replace(&mut self.buffer, rest);
            let result = self.seal_next(&plaintext);
            zeroize_buffer(&mut plaintext);
            frames.push(result?);
        }
        Ok(frames)
    }

    /// Flush any remaining buffered bytes as a final short frame. Emits
    /// nothing if the framer never received any bytes (empty-object case).
    pub fn finish(mut self) -> Result<Vec<Frame>, CodecError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let mut plaintext = std::mem::take(&mut self.buffer);
        let result = self.seal_next(&plaintext);
        zeroize_buffer(&mut plaintext);
        Ok(vec![result?])
    }

    fn seal_next(&mut self, plaintext: &[u8]) -> Result<Frame, CodecError> {
        validate_frame_index(self.next_index, self.max_frame_index)
            .map_err(CodecError::from)?;
        let frame = encrypt_frame(self.subkey, self.object_id, self.next_index, plaintext);
        self.next_index += 1;
        Ok(frame)
    }
}

/// Zeroizes any plaintext bytes still buffered at drop time, covering
/// abandonment (§5): a session dropped before `finish()` is called still
/// wipes what it was holding.
impl<'a> Drop for EncryptFramer<'a> {
    fn drop(&mut self) {
        zeroize_buffer(&mut self.buffer);
    }
}

/// Outcome of decrypting one frame under permissive mode: either the
/// recovered plaintext, or a recorded authentication failure.
pub struct FrameAuthFailure {
    pub index: u32,
    pub source: AuthError,
}

/// Consumes frames in order, verifying strict monotone indexing starting at
/// zero, and recovers plaintext.
pub struct DecryptFramer<'a> {
    subkey: &'a ObjectSubkey,
    object_id: &'a str,
    max_frame_index: u32,
    permissive: bool,
    next_expected: u32,
    frames_seen: u64,
}

impl<'a> DecryptFramer<'a> {
    pub fn new(subkey: &'a ObjectSubkey, object_id: &'a str, config: &CodecConfig) -> Self {
        DecryptFramer {
            subkey,
            object_id,
            max_frame_index: config.max_frame_index,
            permissive: config.permissive_decrypt,
            next_expected: 0,
            frames_seen: 0,
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Decrypt one already-parsed frame, enforcing order before attempting
    /// decryption so an out-of-order frame never reaches the AEAD.
    ///
    /// In strict mode (default) an [`AuthError`] aborts the whole stream. In
    /// permissive mode the failure is recorded and decryption continues.
    pub fn accept(
        &mut self,
        frame: &Frame,
        failures: &mut Vec<FrameAuthFailure>,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        if frame.index != self.next_expected {
            return Err(OrderError {
                expected: self.next_expected,
                found: frame.index,
            }
            .into());
        }
        validate_frame_index(frame.index, self.max_frame_index)
            .map_err(|e: SecurityError| CodecError::from(e))?;

        self.next_expected += 1;
        self.frames_seen += 1;

        match decrypt_frame(self.subkey, self.object_id, frame) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(auth_err) if self.permissive => {
                failures.push(FrameAuthFailure {
                    index: frame.index,
                    source: auth_err,
                });
                Ok(None)
            }
            Err(auth_err) => Err(CodecError::from(auth_err)),
        }
    }

    /// Confirm the stream was not silently truncated: a stream that produced
    /// zero frames despite having seen raw bytes is a [`FormatError::TruncatedStream`].
    pub fn finish(self, raw_bytes_seen: u64) -> Result<(), CodecError> {
        if self.frames_seen == 0 && raw_bytes_seen > 0 {
            return Err(FormatError::TruncatedStream {
                bytes_seen: raw_bytes_seen,
            }
            .into());
        }
        Ok(())
    }
}
