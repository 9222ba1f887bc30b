// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Master-key generation/validation and per-object
//! subkey derivation via HKDF-SHA-256, built directly on
//! [`crate::primitives::hmac_sha256`] (one extract round, one expand round).

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CodecError, SecurityError, ValidationError};
use crate::primitives::hmac_sha256;
use crate::validate::{validate_master_secret, validate_object_id};

/// Domain-separation string bound into every derived subkey.
const SUBKEY_INFO: &[u8] = b"chunkvault/object-subkey/v1";

/// An opaque 32-byte operator-held root secret.
///
/// `Debug`-redacted, zeroized on drop. Never appears inside a frame; the
/// codec borrows it for the lifetime of a single call and does not retain
/// it afterwards.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret([u8; 32]);

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}

impl MasterSecret {
    /// Wrap raw bytes as a master secret, validating the entropy floor.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CodecError> {
        validate_master_secret(&bytes).map_err(CodecError::from)?;
        Ok(MasterSecret(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Serialize as lowercase hex.
    pub fn export(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from lowercase (or mixed-case) hex, re-validating the entropy
    /// floor and rejecting malformed hex.
    pub fn import(hex_str: &str) -> Result<Self, CodecError> {
        if hex_str.len() != 64 {
            return Err(ValidationError::field(
                "master_secret",
                format!("hex-encoded master must be 64 chars, got {}", hex_str.len()),
            )
            .into());
        }
        let bytes = hex::decode(hex_str).map_err(|e| {
            ValidationError::field("master_secret", format!("invalid hex: {e}"))
        })?;
        let array: [u8; 32] = bytes.try_into().expect("hex::decode of 64 chars is 32 bytes");
        MasterSecret::from_bytes(array)
    }
}

/// Draw 32 bytes from the OS CSPRNG, re-drawing if the entropy floor isn't
/// met (astronomically unlikely in practice).
pub fn generate_master() -> MasterSecret {
    loop {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        if let Ok(master) = MasterSecret::from_bytes(bytes) {
            return master;
        }
    }
}

/// A 32-byte key deterministically derived from (master secret, object id).
///
/// Held only for the duration of a session; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct ObjectSubkey([u8; 32]);

impl std::fmt::Debug for ObjectSubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ObjectSubkey([REDACTED])")
    }
}

impl ObjectSubkey {
    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Serialize as lowercase hex, for operator inspection only — callers
    /// should not persist a subkey separately from the master secret it was
    /// derived from.
    pub fn export(&self) -> String {
        hex::encode(self.0)
    }
}

/// Derive the per-object subkey by hand, per §4.2:
/// `salt = SHA-256(object_id)`, `prk = HMAC-SHA-256(salt, master)`
/// (HKDF-Extract), `okm = HMAC-SHA-256(prk, INFO || 0x01)` (one
/// HKDF-Expand round, which suffices since the output length never
/// exceeds the hash length).
pub fn derive_subkey(master: &MasterSecret, object_id: &str) -> Result<ObjectSubkey, CodecError> {
    validate_object_id(object_id).map_err(CodecError::from)?;

    let salt = Sha256::digest(object_id.as_bytes());
    let prk = hmac_sha256(&salt, master.as_bytes());

    let mut info_and_counter = Vec::with_capacity(SUBKEY_INFO.len() + 1);
    info_and_counter.extend_from_slice(SUBKEY_INFO);
    info_and_counter.push(0x01);
    let okm = hmac_sha256(&prk, &info_and_counter);

    Ok(ObjectSubkey(okm))
}

/// Enforce the weak-entropy floor directly, for callers constructing a
/// master secret without going through `MasterSecret::from_bytes`.
pub fn check_entropy_floor(bytes: &[u8; 32]) -> Result<(), SecurityError> {
    validate_master_secret(bytes)
}
