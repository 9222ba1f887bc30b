// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Unified error hierarchy for the chunked AEAD codec.
//!
//! Each category below carries only the payload meaningful to it (a field
//! name, a frame index, a security code) rather than a free-form string bag.
//! [`CodecError`] is the type every public entry point returns.

use thiserror::Error;

/// Top-level error returned by every public codec operation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural mismatch of a caller-supplied value: size, range, alphabet, presence.
///
/// Always surfaced to the caller; never retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    Field { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            reason: reason.into(),
        }
    }
}

/// Policy violation: weak master secret, exceeded frame cap, path traversal.
///
/// Distinct from [`ValidationError`] so callers can tell "malformed input"
/// apart from "input that is well-formed but crosses a security boundary".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityError {
    #[error("master secret has insufficient entropy (fewer than 16 distinct bytes)")]
    WeakMasterSecret,

    #[error("master secret is all-zero")]
    ZeroMasterSecret,

    #[error("frame index {index} exceeds the configured safety ceiling {ceiling}")]
    FrameIndexCeilingExceeded { index: u32, ceiling: u32 },

    #[error("path component traverses outside the permitted root")]
    PathTraversal,
}

/// AEAD tag verification failed for a frame.
///
/// Never ignored, never produces partial plaintext: the frame that fails is
/// the last one the caller hears about.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("authentication failed for frame {index}")]
pub struct AuthError {
    pub index: u32,
}

/// Serialized bytes do not match the frame or envelope layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("frame body is only {len} bytes, need at least {min}")]
    ShortFrame { len: usize, min: usize },

    #[error("envelope record length {body_len} is out of bounds (min 33, max {max})")]
    MalformedEnvelope { body_len: u32, max: u32 },

    #[error("envelope stream ended with {residue} unconsumed bytes")]
    TruncatedEnvelope { residue: usize },

    #[error("stream ended with no frames but {bytes_seen} input bytes were observed")]
    TruncatedStream { bytes_seen: u64 },

    #[error("invalid {encoding} encoding on input line {line}: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        line: usize,
        reason: String,
    },
}

/// Frame indices were not monotone or did not start at zero.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected frame index {expected}, found {found}")]
pub struct OrderError {
    pub expected: u32,
    pub found: u32,
}
