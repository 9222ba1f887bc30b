// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Explicit session configuration.
//!
//! Replaces ambient/dynamic property lookup: every session is constructed
//! from one of these structs, validated once up front by [`crate::validate`].

use crate::error::ValidationError;

/// Lower bound on [`CodecConfig::frame_size`] (1 KiB).
pub const MIN_FRAME_SIZE: u32 = 1024;
/// Upper bound on [`CodecConfig::frame_size`] (10 MiB).
pub const MAX_FRAME_SIZE: u32 = 10 * 1024 * 1024;
/// Default target frame payload size (512 KiB).
pub const DEFAULT_FRAME_SIZE: u32 = 524_288;
/// Default operator-chosen ceiling on frames per object.
pub const DEFAULT_MAX_FRAME_INDEX: u32 = 100_000;

/// Text transcoding applied to an envelope stream on the way in/out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Raw envelope bytes, no transcoding.
    #[default]
    Binary,
    /// One lower-case hex-encoded record per line.
    Hex,
    /// One RFC 4648 base64-encoded record per line.
    Base64,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "binary" => Ok(Encoding::Binary),
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            other => Err(ValidationError::field(
                "encoding",
                format!("must be one of binary, hex, base64; got {other:?}"),
            )),
        }
    }
}

/// Explicit, caller-constructed configuration for an encrypt/decrypt session.
///
/// Construct with [`CodecConfig::default`] and adjust with the builder
/// methods; validated once at session construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub frame_size: u32,
    pub encoding: Encoding,
    pub permissive_decrypt: bool,
    pub max_frame_index: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            frame_size: DEFAULT_FRAME_SIZE,
            encoding: Encoding::Binary,
            permissive_decrypt: false,
            max_frame_index: DEFAULT_MAX_FRAME_INDEX,
        }
    }
}

impl CodecConfig {
    pub fn with_frame_size(mut self, frame_size: u32) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_permissive_decrypt(mut self, permissive: bool) -> Self {
        self.permissive_decrypt = permissive;
        self
    }

    pub fn with_max_frame_index(mut self, max_frame_index: u32) -> Self {
        self.max_frame_index = max_frame_index;
        self
    }

    /// Validate the frame size bound. Other fields cannot be invalid
    /// by construction (`Encoding` is a closed enum, bools have no range).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&self.frame_size) {
            return Err(ValidationError::field(
                "frame_size",
                format!(
                    "must be in [{MIN_FRAME_SIZE}, {MAX_FRAME_SIZE}], got {}",
                    self.frame_size
                ),
            ));
        }
        Ok(())
    }
}
