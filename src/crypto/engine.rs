//! AES-GCM encrypt/decrypt over sealed containers
//!
//! The engine is stateless: every call binds a key, a nonce and optional
//! additional authenticated data (AAD) to one `SealedData`. It provides:
//! - Confidentiality: data is encrypted
//! - Integrity: any tampering with nonce, ciphertext or tag is detected
//! - Authentication: only the key holder can produce a valid tag

use crate::crypto::backend::{AeadBackend, DefaultBackend};
use crate::crypto::{random_bytes, SealedData, SymmetricKey, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Where the nonce for an encryption comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonceSpec {
    /// Draw this many bytes from the OS entropy source
    Random(usize),
    /// Use exactly these bytes.
    ///
    /// The caller must never reuse a nonce with the same key; the engine
    /// cannot detect reuse.
    Fixed(Vec<u8>),
}

impl Default for NonceSpec {
    fn default() -> Self {
        NonceSpec::Random(NONCE_SIZE)
    }
}

/// Options for [`AeadEngine::encrypt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptOptions {
    pub nonce: NonceSpec,
    /// Tag length in bytes
    pub tag_length: usize,
    pub aad: Option<Vec<u8>>,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        EncryptOptions {
            nonce: NonceSpec::default(),
            tag_length: TAG_SIZE,
            aad: None,
        }
    }
}

impl EncryptOptions {
    /// Random nonce of `length` bytes
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce = NonceSpec::Random(length);
        self
    }

    /// Caller-supplied nonce
    pub fn with_fixed_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = NonceSpec::Fixed(nonce.into());
        self
    }

    pub fn with_tag_length(mut self, tag_length: usize) -> Self {
        self.tag_length = tag_length;
        self
    }

    pub fn with_aad(mut self, aad: impl Into<Vec<u8>>) -> Self {
        self.aad = Some(aad.into());
        self
    }
}

/// Options for [`AeadEngine::decrypt`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptOptions {
    pub aad: Option<Vec<u8>>,
}

impl DecryptOptions {
    pub fn with_aad(mut self, aad: impl Into<Vec<u8>>) -> Self {
        self.aad = Some(aad.into());
        self
    }
}

/// Stateless AES-GCM engine over a backend
#[derive(Debug, Clone, Default)]
pub struct AeadEngine<B = DefaultBackend> {
    backend: B,
}

impl AeadEngine<DefaultBackend> {
    /// Engine on the default backend
    pub fn new() -> Self {
        AeadEngine {
            backend: DefaultBackend::default(),
        }
    }
}

impl<B: AeadBackend> AeadEngine<B> {
    /// Engine on a specific backend
    pub fn with_backend(backend: B) -> Self {
        AeadEngine { backend }
    }

    /// The backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Encrypt `plaintext` into a sealed container
    ///
    /// Empty plaintext is allowed; the result then holds only nonce and tag.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &SymmetricKey,
        options: &EncryptOptions,
    ) -> Result<SealedData> {
        // Reject the shape before drawing entropy for the nonce
        let nonce_length = match &options.nonce {
            NonceSpec::Random(length) => *length,
            NonceSpec::Fixed(bytes) => bytes.len(),
        };
        if !self.backend.supports_nonce_length(nonce_length) {
            return Err(Error::UnsupportedNonceLength(nonce_length));
        }
        if !self.backend.supports_tag_length(options.tag_length) {
            return Err(Error::UnsupportedTagLength(options.tag_length));
        }

        let nonce = match &options.nonce {
            NonceSpec::Random(length) => random_bytes(*length)
                .map_err(|e| Error::EncryptionFailure(format!("nonce generation failed: {}", e)))?,
            NonceSpec::Fixed(bytes) => bytes.clone(),
        };

        let aad = options.aad.as_deref().unwrap_or_default();
        let ciphertext_with_tag =
            self.backend
                .seal(key, &nonce, aad, plaintext, options.tag_length)?;

        debug!(
            backend = self.backend.name(),
            key_size = %key.size(),
            nonce_length = nonce.len(),
            tag_length = options.tag_length,
            plaintext_length = plaintext.len(),
            aad = options.aad.is_some(),
            "sealed data"
        );

        SealedData::seal_parts(&nonce, &ciphertext_with_tag, options.tag_length)
    }

    /// Authenticate and decrypt a sealed container
    ///
    /// Any mismatch of key, AAD, nonce, ciphertext or tag is reported as
    /// [`Error::AuthenticationFailure`] and no plaintext is returned.
    pub fn decrypt(
        &self,
        sealed: &SealedData,
        key: &SymmetricKey,
        options: &DecryptOptions,
    ) -> Result<Vec<u8>> {
        let aad = options.aad.as_deref().unwrap_or_default();
        let nonce = sealed.nonce_bytes();
        let ciphertext_with_tag = sealed.ciphertext_with_tag_bytes();

        let result = self
            .backend
            .open(key, &nonce, aad, &ciphertext_with_tag, sealed.tag_size());

        match &result {
            Ok(plaintext) => debug!(
                backend = self.backend.name(),
                plaintext_length = plaintext.len(),
                "opened sealed data"
            ),
            Err(e) => debug!(backend = self.backend.name(), error = %e, "open failed"),
        }
        result
    }

    /// Encrypt UTF-8 text
    pub fn encrypt_str(
        &self,
        plaintext: &str,
        key: &SymmetricKey,
        options: &EncryptOptions,
    ) -> Result<SealedData> {
        self.encrypt(plaintext.as_bytes(), key, options)
    }

    /// Decrypt into UTF-8 text
    pub fn decrypt_to_string(
        &self,
        sealed: &SealedData,
        key: &SymmetricKey,
        options: &DecryptOptions,
    ) -> Result<String> {
        let plaintext = self.decrypt(sealed, key, options)?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::Encoding("plaintext is not valid UTF-8".to_string()))
    }
}

impl<B: AeadBackend + Clone + 'static> AeadEngine<B> {
    /// [`AeadEngine::encrypt`] on the blocking thread pool
    ///
    /// Runs to completion once started; there is no cancellation or timeout.
    pub async fn encrypt_async(
        &self,
        plaintext: Vec<u8>,
        key: Arc<SymmetricKey>,
        options: EncryptOptions,
    ) -> Result<SealedData> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.encrypt(&plaintext, &key, &options))
            .await
            .map_err(|e| Error::Internal(format!("encryption task failed: {}", e)))?
    }

    /// [`AeadEngine::decrypt`] on the blocking thread pool
    pub async fn decrypt_async(
        &self,
        sealed: SealedData,
        key: Arc<SymmetricKey>,
        options: DecryptOptions,
    ) -> Result<Vec<u8>> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.decrypt(&sealed, &key, &options))
            .await
            .map_err(|e| Error::Internal(format!("decryption task failed: {}", e)))?
    }
}
