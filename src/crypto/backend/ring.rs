//! `ring` AES-GCM backend
//!
//! ring only offers AES-128-GCM and AES-256-GCM with a 96-bit nonce and a
//! 128-bit tag. Anything else is reported as unsupported rather than
//! silently falling back.

use super::AeadBackend;
use crate::crypto::{KeySize, SymmetricKey, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use ring::aead::{Aad, Algorithm, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM};

/// AES-GCM backend built on `ring`
#[derive(Debug, Clone, Copy, Default)]
pub struct RingGcm;

impl RingGcm {
    fn algorithm(size: KeySize) -> Result<&'static Algorithm> {
        match size {
            KeySize::Aes128 => Ok(&AES_128_GCM),
            KeySize::Aes256 => Ok(&AES_256_GCM),
            KeySize::Aes192 => Err(Error::UnsupportedKeySize(size.bits())),
        }
    }

    fn check_shape(&self, nonce: &[u8], tag_length: usize) -> Result<()> {
        if !self.supports_nonce_length(nonce.len()) {
            return Err(Error::UnsupportedNonceLength(nonce.len()));
        }
        if !self.supports_tag_length(tag_length) {
            return Err(Error::UnsupportedTagLength(tag_length));
        }
        Ok(())
    }
}

impl AeadBackend for RingGcm {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn supports_nonce_length(&self, length: usize) -> bool {
        length == NONCE_SIZE
    }

    fn supports_tag_length(&self, length: usize) -> bool {
        length == TAG_SIZE
    }

    fn seal(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>> {
        self.check_shape(nonce, tag_length)?;

        // Create the key
        let unbound_key = UnboundKey::new(Self::algorithm(key.size())?, key.expose())
            .map_err(|_| Error::EncryptionFailure("Failed to create encryption key".to_string()))?;
        let sealing_key = LessSafeKey::new(unbound_key);

        let nonce = Nonce::try_assume_unique_for_key(nonce)
            .map_err(|_| Error::UnsupportedNonceLength(nonce.len()))?;

        // Prepare buffer: plaintext + space for tag
        let mut in_out = plaintext.to_vec();
        in_out.reserve(TAG_SIZE);

        // Encrypt in place
        sealing_key
            .seal_in_place_append_tag(nonce, Aad::from(aad), &mut in_out)
            .map_err(|_| Error::EncryptionFailure("Encryption failed".to_string()))?;

        Ok(in_out)
    }

    fn open(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext_with_tag: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>> {
        self.check_shape(nonce, tag_length)?;

        if ciphertext_with_tag.len() < TAG_SIZE {
            return Err(Error::AuthenticationFailure);
        }

        let unbound_key = UnboundKey::new(Self::algorithm(key.size())?, key.expose())
            .map_err(|_| Error::AuthenticationFailure)?;
        let opening_key = LessSafeKey::new(unbound_key);

        let nonce = Nonce::try_assume_unique_for_key(nonce)
            .map_err(|_| Error::UnsupportedNonceLength(nonce.len()))?;

        // Decrypt in place
        let mut in_out = ciphertext_with_tag.to_vec();
        let plaintext = opening_key
            .open_in_place(nonce, Aad::from(aad), &mut in_out)
            .map_err(|_| Error::AuthenticationFailure)?;

        Ok(plaintext.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RustCryptoGcm;

    #[test]
    fn test_matches_rustcrypto_output() {
        for size in [KeySize::Aes128, KeySize::Aes256] {
            let key = SymmetricKey::generate(size).unwrap();
            let nonce = [9u8; 12];

            let from_ring = RingGcm.seal(&key, &nonce, b"ctx", b"same bytes", 16).unwrap();
            let from_rust = RustCryptoGcm.seal(&key, &nonce, b"ctx", b"same bytes", 16).unwrap();
            assert_eq!(from_ring, from_rust);

            let opened = RingGcm.open(&key, &nonce, b"ctx", &from_rust, 16).unwrap();
            assert_eq!(opened, b"same bytes");
        }
    }

    #[test]
    fn test_rejects_aes192() {
        let key = SymmetricKey::generate(KeySize::Aes192).unwrap();
        let result = RingGcm.seal(&key, &[0u8; 12], b"", b"x", 16);
        assert!(matches!(result, Err(Error::UnsupportedKeySize(192))));
    }

    #[test]
    fn test_rejects_other_shapes() {
        let key = SymmetricKey::generate(KeySize::Aes256).unwrap();

        let result = RingGcm.seal(&key, &[0u8; 16], b"", b"x", 16);
        assert!(matches!(result, Err(Error::UnsupportedNonceLength(16))));

        let result = RingGcm.seal(&key, &[0u8; 12], b"", b"x", 12);
        assert!(matches!(result, Err(Error::UnsupportedTagLength(12))));

        let result = RingGcm.open(&key, &[0u8; 12], b"", &[0u8; 24], 8);
        assert!(matches!(result, Err(Error::UnsupportedTagLength(8))));

        assert!(RingGcm.supports_nonce_length(12));
        assert!(!RingGcm.supports_nonce_length(13));
        assert!(!RingGcm.supports_tag_length(4));
    }

    #[test]
    fn test_tampered_fails() {
        let key = SymmetricKey::generate(KeySize::Aes128).unwrap();
        let mut sealed = RingGcm.seal(&key, &[1u8; 12], b"", b"secret data", 16).unwrap();
        sealed[0] ^= 0xFF;

        let result = RingGcm.open(&key, &[1u8; 12], b"", &sealed, 16);
        assert!(matches!(result, Err(Error::AuthenticationFailure)));
    }
}
