// MPL-2.0: https://mozilla.org/MPL/2.0/

//! Size, range, entropy, identifier-shape checks,
//! constant-time compare, and zeroization helpers.
//!
//! Every public entry point in this crate calls into here before touching
//! key material. Validation and security checks happen before any
//! cryptographic operation begins.

use crate::error::{SecurityError, ValidationError};
use zeroize::Zeroize;

/// Maximum encoded length of an object identifier.
pub const MAX_OBJECT_ID_LEN: usize = 256;
/// Maximum path length accepted from the CLI collaborator.
pub const MAX_PATH_LEN: usize = 4096;

/// Validate an object identifier: non-empty, ≤256 UTF-8 bytes, alphabet
/// restricted to `[A-Za-z0-9._:-]+`.
pub fn validate_object_id(object_id: &str) -> Result<(), ValidationError> {
    if object_id.is_empty() {
        return Err(ValidationError::field("object_id", "must not be empty"));
    }
    if object_id.len() > MAX_OBJECT_ID_LEN {
        return Err(ValidationError::field(
            "object_id",
            format!(
                "must be at most {MAX_OBJECT_ID_LEN} UTF-8 bytes, got {}",
                object_id.len()
            ),
        ));
    }
    if !object_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
    {
        return Err(ValidationError::field(
            "object_id",
            "must match [A-Za-z0-9._:-]+",
        ));
    }
    Ok(())
}

/// Validate a candidate master secret: exactly 32 bytes, not all-zero, at
/// least 16 distinct byte values (the entropy floor).
pub fn validate_master_secret(bytes: &[u8]) -> Result<(), SecurityError> {
    // Constant-time, so rejecting a weak secret doesn't leak which byte
    // position first differed from zero.
    if constant_time_eq(bytes, &vec![0u8; bytes.len()]) {
        return Err(SecurityError::ZeroMasterSecret);
    }
    let mut seen = [false; 256];
    let mut distinct = 0u32;
    for &b in bytes {
        if !seen[b as usize] {
            seen[b as usize] = true;
            distinct += 1;
        }
    }
    if distinct < 16 {
        return Err(SecurityError::WeakMasterSecret);
    }
    Ok(())
}

/// Validate a frame index against the operator-chosen safety ceiling.
pub fn validate_frame_index(index: u32, ceiling: u32) -> Result<(), SecurityError> {
    if index > ceiling {
        return Err(SecurityError::FrameIndexCeilingExceeded {
            index,
            ceiling,
        });
    }
    Ok(())
}

/// Reject any path with a `..` component or that is too long, per the CLI
/// collaborator's contract.
pub fn validate_path(path: &std::path::Path) -> Result<(), SecurityError> {
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(SecurityError::PathTraversal);
    }
    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(SecurityError::PathTraversal);
    }
    Ok(())
}

/// Constant-time equality for tag-like byte values.
///
/// Always walks the full length of both slices; returns `false` immediately
/// (and only) when the lengths differ, since length is not itself secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Overwrite a buffer with zeros through a write path the optimizer is not
/// permitted to elide.
pub fn zeroize_buffer(buf: &mut [u8]) {
    buf.zeroize();
}
