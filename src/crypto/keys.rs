//! Symmetric key handling for sealkit
//!
//! Keys are raw AES key bytes held in zeroizing storage:
//! - `generate`: fresh bytes from the OS entropy source
//! - `import_from`: bytes from an external collaborator (KDF output, key file)
//!
//! Key material never leaves a `SymmetricKey` except as an explicit copy.

use crate::crypto::{random_bytes, Encoding};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Valid AES key sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum KeySize {
    /// AES-128
    Aes128,
    /// AES-192
    Aes192,
    /// AES-256
    #[default]
    Aes256,
}

impl KeySize {
    /// Key size in bits
    pub const fn bits(&self) -> u32 {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }

    /// Key size in bytes
    pub const fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    /// Look up a key size by bit count
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(KeySize::Aes128),
            192 => Ok(KeySize::Aes192),
            256 => Ok(KeySize::Aes256),
            other => Err(Error::UnsupportedKeySize(other)),
        }
    }

    /// Look up a key size by raw key length
    pub fn from_byte_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            got => Err(Error::InvalidKeyLength { got }),
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        KeySize::from_bits(bits)
    }
}

impl From<KeySize> for u32 {
    fn from(size: KeySize) -> u32 {
        size.bits()
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.bits())
    }
}

/// Raw AES key
///
/// Immutable after construction and zeroized on drop. Cloning is explicit
/// so key copies are visible at the call site.
#[derive(Clone)]
pub struct SymmetricKey {
    size: KeySize,
    key: Zeroizing<Vec<u8>>,
}

impl SymmetricKey {
    /// Generate a new random key
    pub fn generate(size: KeySize) -> Result<Self> {
        let key = random_bytes(size.bytes())
            .map(Zeroizing::new)
            .map_err(|e| Error::EntropyFailure(e.to_string()))?;

        tracing::debug!(size = %size, "generated symmetric key");
        Ok(SymmetricKey { size, key })
    }

    /// Import raw key bytes
    ///
    /// The length must be exactly 16, 24 or 32 bytes. Nothing is truncated or padded.
    pub fn import_from(bytes: &[u8]) -> Result<Self> {
        let size = KeySize::from_byte_len(bytes.len())?;
        Ok(SymmetricKey {
            size,
            key: Zeroizing::new(bytes.to_vec()),
        })
    }

    /// Import a key from base64 text, as written by [`SymmetricKey::to_base64`]
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = Zeroizing::new(Encoding::Base64.decode(text)?);
        SymmetricKey::import_from(&bytes)
    }

    /// Copy of the raw key bytes
    pub fn bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.key.to_vec())
    }

    /// Export the key as base64 text
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(Encoding::Base64.encode(&self.key))
    }

    /// Key size
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Key size in bits
    pub fn size_bits(&self) -> u32 {
        self.size.bits()
    }

    /// Borrow the key material for a backend call
    pub(crate) fn expose(&self) -> &[u8] {
        &self.key
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && bool::from(self.key.as_slice().ct_eq(other.key.as_slice()))
    }
}

impl Eq for SymmetricKey {}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("size", &self.size)
            .field("key", &"<redacted>")
            .finish()
    }
}
