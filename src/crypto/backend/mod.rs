//! AES-GCM backends
//!
//! A backend is the only place that touches an AES-GCM implementation.
//! Everything above it (keys, containers, nonce policy) is shared, so every
//! backend reads and writes the same container bytes.

mod rust_crypto;
#[cfg(feature = "ring")]
mod ring;

pub use rust_crypto::RustCryptoGcm;
#[cfg(feature = "ring")]
pub use self::ring::RingGcm;

use crate::crypto::SymmetricKey;
use crate::error::Result;

/// Backend used by [`AeadEngine::new`](crate::crypto::AeadEngine::new)
pub type DefaultBackend = RustCryptoGcm;

/// An AES-GCM primitive
///
/// `seal` returns `ciphertext || tag` with a tag of `tag_length` bytes.
/// `open` takes the same layout back and must fail with
/// [`Error::AuthenticationFailure`](crate::Error::AuthenticationFailure)
/// on any tag mismatch, without returning plaintext.
pub trait AeadBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Whether a nonce of `length` bytes is accepted
    fn supports_nonce_length(&self, length: usize) -> bool;

    /// Whether a tag of `length` bytes is accepted
    fn supports_tag_length(&self, length: usize) -> bool;

    /// Encrypt and authenticate `plaintext`
    fn seal(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>>;

    /// Verify and decrypt `ciphertext_with_tag`
    fn open(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext_with_tag: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>>;
}
