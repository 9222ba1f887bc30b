// MPL-2.0: https://mozilla.org/MPL/2.0/

//! A deterministic per-frame AAD from
//! (object id, frame index).
//!
//! No secret material enters the AAD — it is reconstructable by anyone who
//! knows the object id and the frame index, which is exactly what lets it
//! defeat reordering (index is bound) and cross-object substitution (object
//! id is bound, on top of the subkey already differing per object).

use sha2::{Digest, Sha256};

/// Length in bytes of [`build_aad`]'s output.
pub const AAD_LEN: usize = 32;

/// `aad(object_id, index) = SHA-256(object_id_utf8 || uint32_be(index))`.
pub fn build_aad(object_id: &str, index: u32) -> [u8; AAD_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(object_id.as_bytes());
    hasher.update(index.to_be_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aad_is_deterministic() {
        assert_eq!(build_aad("video-1", 0), build_aad("video-1", 0));
    }

    #[test]
    fn aad_differs_by_index() {
        assert_ne!(build_aad("video-1", 0), build_aad("video-1", 1));
    }

    #[test]
    fn aad_differs_by_object_id() {
        assert_ne!(build_aad("video-1", 0), build_aad("video-2", 0));
    }

    #[test]
    fn aad_is_32_bytes() {
        assert_eq!(build_aad("x", 0).len(), AAD_LEN);
    }
}
