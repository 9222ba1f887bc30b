// MPL-2.0: https://mozilla.org/MPL/2.0/

use chunkvault_core::config::CodecConfig;
use chunkvault_core::keys::{derive_subkey, generate_master};
use chunkvault_core::session::{decrypt_buffer, encrypt_buffer};
use chunkvault_core::{CodecError, OrderError};

fn random_bytes(len: usize, seed: u8) -> Vec<u8> {
    // deterministic pseudo-random filler, good enough for round-trip fixtures
    (0..len).map(|i| seed.wrapping_add((i * 31 + 7) as u8)).collect()
}

#[test]
fn s1_empty_object_round_trips_to_zero_frames() {
    let master = generate_master();
    let config = CodecConfig::default();
    let sealed = encrypt_buffer(&master, "s1-empty", b"", &config).unwrap();
    assert!(sealed.is_empty(), "empty object must produce an empty envelope");
    let opened = decrypt_buffer(&master, "s1-empty", &sealed, &config).unwrap();
    assert_eq!(opened, b"");
}

#[test]
fn s2_short_object_fits_one_frame() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(13, 1);
    let sealed = encrypt_buffer(&master, "s2-short", &plaintext, &config).unwrap();
    let opened = decrypt_buffer(&master, "s2-short", &sealed, &config).unwrap();
    assert_eq!(opened, plaintext);
}

#[test]
fn s3_exact_multiple_of_frame_size() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(2 * config.frame_size as usize, 2);
    let sealed = encrypt_buffer(&master, "s3-exact", &plaintext, &config).unwrap();
    let opened = decrypt_buffer(&master, "s3-exact", &sealed, &config).unwrap();
    assert_eq!(opened, plaintext);
}

#[test]
fn s4_ragged_tail_not_a_multiple_of_frame_size() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(1_000_000, 3);
    assert_ne!(plaintext.len() % config.frame_size as usize, 0);
    let sealed = encrypt_buffer(&master, "s4-ragged", &plaintext, &config).unwrap();
    let opened = decrypt_buffer(&master, "s4-ragged", &sealed, &config).unwrap();
    assert_eq!(opened, plaintext);
}

#[test]
fn s5_tampered_frame_index_is_detected() {
    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(1024);
    let plaintext = random_bytes(1024 * 3, 4);
    let mut sealed = encrypt_buffer(&master, "s5-tamper", &plaintext, &config).unwrap();

    // flip a byte inside the index field of the first record (4-byte length
    // prefix, then the frame's own 4-byte big-endian index).
    sealed[4 + 3] ^= 0x01;

    let err = decrypt_buffer(&master, "s5-tamper", &sealed, &config).unwrap_err();
    assert!(
        matches!(err, CodecError::Order(_)) || matches!(err, CodecError::Auth(_)),
        "expected an order or auth failure, got {err:?}"
    );
}

#[test]
fn s6_wrong_object_id_is_rejected() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(4096, 5);
    let sealed = encrypt_buffer(&master, "s6-object-a", &plaintext, &config).unwrap();
    let err = decrypt_buffer(&master, "s6-object-b", &sealed, &config).unwrap_err();
    assert!(matches!(err, CodecError::Auth(_)));
}

#[test]
fn invariant_round_trip_identity() {
    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(4096);
    for len in [0usize, 1, 4095, 4096, 4097, 20_000] {
        let plaintext = random_bytes(len, len as u8);
        let sealed = encrypt_buffer(&master, "inv-roundtrip", &plaintext, &config).unwrap();
        let opened = decrypt_buffer(&master, "inv-roundtrip", &sealed, &config).unwrap();
        assert_eq!(opened, plaintext, "mismatch at len {len}");
    }
}

#[test]
fn invariant_subkey_derivation_is_deterministic_and_domain_separated() {
    let master = generate_master();
    let a1 = derive_subkey(&master, "object-a").unwrap();
    let a2 = derive_subkey(&master, "object-a").unwrap();
    let b = derive_subkey(&master, "object-b").unwrap();
    assert_eq!(a1, a2);
    assert_ne!(a1, b);
}

#[test]
fn invariant_same_plaintext_different_objects_yield_different_ciphertext() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(512, 9);
    let sealed_a = encrypt_buffer(&master, "obj-a", &plaintext, &config).unwrap();
    let sealed_b = encrypt_buffer(&master, "obj-b", &plaintext, &config).unwrap();
    assert_ne!(sealed_a, sealed_b);
}

#[test]
fn invariant_reordered_frames_are_rejected() {
    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(8);
    let plaintext = random_bytes(32, 11);
    let sealed = encrypt_buffer(&master, "reorder-obj", &plaintext, &config).unwrap();

    // Swap the first two length-prefixed records wholesale.
    let rec_len = 4 + 4 + 12 + 16 + 8; // len-prefix + index + nonce + tag + 8-byte ciphertext
    let mut swapped = sealed.clone();
    let (first, rest) = swapped.split_at_mut(rec_len);
    let (second, _) = rest.split_at_mut(rec_len);
    first.swap_with_slice(second);

    let err = decrypt_buffer(&master, "reorder-obj", &swapped, &config).unwrap_err();
    assert!(matches!(err, CodecError::Order(OrderError { .. })));
}

#[test]
fn invariant_cross_object_substitution_is_rejected() {
    let master = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(4096, 13);
    let sealed_a = encrypt_buffer(&master, "victim-object", &plaintext, &config).unwrap();

    // Attempt to decrypt object A's envelope under object B's id.
    let err = decrypt_buffer(&master, "attacker-object", &sealed_a, &config).unwrap_err();
    assert!(matches!(err, CodecError::Auth(_)));
}

#[test]
fn invariant_wrong_master_secret_fails_closed() {
    let master_a = generate_master();
    let master_b = generate_master();
    let config = CodecConfig::default();
    let plaintext = random_bytes(4096, 17);
    let sealed = encrypt_buffer(&master_a, "obj", &plaintext, &config).unwrap();
    let err = decrypt_buffer(&master_b, "obj", &sealed, &config).unwrap_err();
    assert!(matches!(err, CodecError::Auth(_)));
}

#[test]
fn invariant_ciphertext_size_tracks_plaintext_size() {
    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(1024);
    let small = random_bytes(100, 21);
    let large = random_bytes(100_000, 22);
    let sealed_small = encrypt_buffer(&master, "size-obj", &small, &config).unwrap();
    let sealed_large = encrypt_buffer(&master, "size-obj", &large, &config).unwrap();
    assert!(sealed_large.len() > sealed_small.len());
}

#[test]
fn invariant_truncated_envelope_is_rejected_not_silently_accepted() {
    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(1024);
    let plaintext = random_bytes(1024 * 3, 23);
    let mut sealed = encrypt_buffer(&master, "trunc-obj", &plaintext, &config).unwrap();
    sealed.truncate(sealed.len() - 5);
    assert!(decrypt_buffer(&master, "trunc-obj", &sealed, &config).is_err());
}

#[test]
fn invariant_permissive_mode_surfaces_failures_without_aborting() {
    use chunkvault_core::session::decrypt_stream;

    let master = generate_master();
    let config = CodecConfig::default().with_frame_size(8);
    let plaintext = random_bytes(32, 29);
    let sealed = encrypt_buffer(&master, "permissive-obj", &plaintext, &config).unwrap();

    let mut tampered = sealed.clone();
    // corrupt the ciphertext byte of the second record only.
    let rec_len = 4 + 4 + 12 + 16 + 8;
    let idx = rec_len + rec_len - 1;
    tampered[idx] ^= 0xFF;

    let permissive_config = config.with_permissive_decrypt(true);
    let mut out = Vec::new();
    let stats = decrypt_stream(
        &master,
        "permissive-obj",
        tampered.as_slice(),
        &mut out,
        &permissive_config,
    )
    .unwrap();

    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].index, 1);
}
