// MPL-2.0: https://mozilla.org/MPL/2.0/

//! A chunked authenticated-encryption codec for arbitrarily large binary
//! objects.
//!
//! Cleartext byte streams are transformed into sequences of self-describing
//! AES-256-GCM frames and back, with per-frame integrity and protection
//! against reordering, cross-object substitution, and replay. No object
//! metadata (size, content type) is retained beyond what each frame needs to
//! decrypt itself.
//!
//! # Quick start
//!
//! ```
//! use chunkvault_core::{config::CodecConfig, keys::generate_master, session};
//!
//! let master = generate_master();
//! let config = CodecConfig::default();
//!
//! let sealed = session::encrypt_buffer(&master, "object-42", b"hello world", &config).unwrap();
//! let plaintext = session::decrypt_buffer(&master, "object-42", &sealed, &config).unwrap();
//! assert_eq!(plaintext, b"hello world");
//! ```

pub mod aad;
pub mod config;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod framer;
pub mod keys;
pub mod primitives;
pub mod session;
pub mod transcode;
pub mod validate;

pub use config::{CodecConfig, Encoding};
pub use error::{AuthError, CodecError, FormatError, OrderError, SecurityError, ValidationError};
pub use frame::Frame;
pub use framer::FrameAuthFailure;
pub use keys::{derive_subkey, generate_master, MasterSecret, ObjectSubkey};
pub use session::{decrypt_buffer, decrypt_stream, encrypt_buffer, encrypt_stream, DecryptStats, EncryptStats};
