// MPL-2.0: https://mozilla.org/MPL/2.0/

//! A thin wrapper over AES-256-GCM and HMAC-SHA-256.
//!
//! Nothing above this module reaches for a raw AEAD or HMAC call directly —
//! every encryption/authentication path in the crate funnels through here so
//! the primitive choice stays a one-module decision.

use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

/// Length in bytes of the AES-256-GCM nonce (96 bits).
pub const NONCE_LEN: usize = 12;
/// Length in bytes of the AES-256-GCM authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Seal `plaintext` under `key`/`nonce`, authenticating `aad` alongside it.
///
/// Returns `(ciphertext, tag)` with `ciphertext.len() == plaintext.len()`.
pub fn aead_seal(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> (Vec<u8>, [u8; TAG_LEN]) {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut sealed = cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .expect("AES-256-GCM encryption is infallible for well-formed inputs");

    // `aead`'s RustCrypto contract appends the tag to the ciphertext; split
    // it back out so callers deal with the two fields separately.
    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);
    (sealed, tag)
}

/// Open a sealed frame, verifying `tag` over `aad` and `ciphertext` under
/// `key`/`nonce`.
///
/// Fails atomically: on tag mismatch no plaintext bytes are returned, not
/// even a partial prefix.
pub fn aead_open(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
    frame_index: u32,
) -> Result<Vec<u8>, AuthError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: &combined,
                aad,
            },
        )
        .map_err(|_| AuthError { index: frame_index })
}

/// HMAC-SHA-256 over `data` with `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}
