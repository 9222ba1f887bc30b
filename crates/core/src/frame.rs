// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Encrypt/decrypt a single frame, and the bit-exact
//! on-wire serialization layout.
//!
//! ```text
//! offset 0..4    : index        (uint32 big-endian)
//! offset 4..16   : nonce        (12 random bytes)
//! offset 16..32  : auth tag     (16 bytes from the AEAD)
//! offset 32..    : ciphertext   (N bytes, 1 <= N <= frame_size)
//! ```

use rand_core::{OsRng, RngCore};

use crate::aad::build_aad;
use crate::error::{AuthError, FormatError};
use crate::keys::ObjectSubkey;
use crate::primitives::{aead_open, aead_seal, NONCE_LEN, TAG_LEN};

/// Byte offset/length of the fixed frame header (index + nonce + tag).
pub const HEADER_LEN: usize = 4 + NONCE_LEN + TAG_LEN;

/// One AEAD-sealed unit of the chunked stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: u32,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Frame {
    /// Total serialized length: `32 + N`.
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len()
    }

    /// Serialize to the exact on-wire layout, no version byte, no padding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&self.index.to_be_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize a single frame body. Fails with [`FormatError::ShortFrame`]
    /// if fewer than `HEADER_LEN + 1` bytes are present.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_LEN + 1 {
            return Err(FormatError::ShortFrame {
                len: bytes.len(),
                min: HEADER_LEN + 1,
            });
        }
        let index = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[4..4 + NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[4 + NONCE_LEN..HEADER_LEN]);
        let ciphertext = bytes[HEADER_LEN..].to_vec();

        Ok(Frame {
            index,
            nonce,
            tag,
            ciphertext,
        })
    }
}

/// Encrypt one frame: sample a fresh nonce, build the AAD from
/// `(object_id, index)`, seal `plaintext` under `subkey`.
pub fn encrypt_frame(subkey: &ObjectSubkey, object_id: &str, index: u32, plaintext: &[u8]) -> Frame {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let aad = build_aad(object_id, index);
    let (ciphertext, tag) = aead_seal(subkey.as_bytes(), &nonce, &aad, plaintext);

    Frame {
        index,
        nonce,
        tag,
        ciphertext,
    }
}

/// Decrypt one frame, recomputing the AAD from `(object_id, frame.index)`.
///
/// Never returns partial output: on tag mismatch the caller receives an
/// [`AuthError`] carrying the failing frame's index, not a truncated buffer.
pub fn decrypt_frame(
    subkey: &ObjectSubkey,
    object_id: &str,
    frame: &Frame,
) -> Result<Vec<u8>, AuthError> {
    let aad = build_aad(object_id, frame.index);
    aead_open(
        subkey.as_bytes(),
        &frame.nonce,
        &aad,
        &frame.ciphertext,
        &frame.tag,
        frame.index,
    )
}
