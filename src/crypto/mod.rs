//! Cryptography module for sealkit
//!
//! Provides AES-GCM sealing into a portable `nonce || ciphertext || tag`
//! container. Container and key handling are backend independent; the
//! AES-GCM primitive itself sits behind [`AeadBackend`].

pub mod backend;
mod buffer;
mod engine;
mod envelope;
mod keys;
mod sealed;

pub use buffer::{concat, split_tail, Encoding};
pub use backend::{AeadBackend, DefaultBackend, RustCryptoGcm};
#[cfg(feature = "ring")]
pub use backend::RingGcm;
pub use engine::{AeadEngine, DecryptOptions, EncryptOptions, NonceSpec};
pub use envelope::{Envelope, ENVELOPE_VERSION};
pub use keys::{KeySize, SymmetricKey};
pub use sealed::{Framing, SealedData};

use rand::rngs::OsRng;
use rand::RngCore;
use std::ops::RangeInclusive;

/// Default GCM nonce size in bytes
pub const NONCE_SIZE: usize = 12;

/// Default GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// Tag lengths accepted by the engine.
///
/// 128 down to 96 bits, plus 64 and 32 bits. The short tags are only safe
/// with limits on message length and key lifetime, which callers enforce.
pub const SUPPORTED_TAG_LENGTHS: [usize; 7] = [16, 15, 14, 13, 12, 8, 4];

/// Largest nonce the default backend accepts
pub const MAX_NONCE_SIZE: usize = 32;

/// Nonce lengths accepted by the default backend
pub const SUPPORTED_NONCE_LENGTHS: RangeInclusive<usize> = 1..=MAX_NONCE_SIZE;

/// Fill a fresh buffer from the OS entropy source
pub(crate) fn random_bytes(len: usize) -> std::result::Result<Vec<u8>, rand::Error> {
    let mut buf = vec![0u8; len];
    OsRng.try_fill_bytes(&mut buf)?;
    Ok(buf)
}
