//! Portable sealed-data container
//!
//! A `SealedData` owns one contiguous buffer partitioned as
//! `nonce || ciphertext || tag`. The nonce and tag lengths are not written
//! into the buffer; producer and consumer agree on a [`Framing`] out of band
//! (the default is a 12-byte nonce and a 16-byte tag), or ship it alongside
//! in an [`Envelope`](crate::crypto::Envelope).

use crate::crypto::{concat, split_tail, Encoding, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nonce and tag lengths of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Framing {
    /// Nonce length in bytes
    pub nonce_length: usize,
    /// Authentication tag length in bytes
    pub tag_length: usize,
}

impl Default for Framing {
    fn default() -> Self {
        Framing {
            nonce_length: NONCE_SIZE,
            tag_length: TAG_SIZE,
        }
    }
}

impl Framing {
    /// Create a framing with explicit lengths
    pub const fn new(nonce_length: usize, tag_length: usize) -> Self {
        Framing {
            nonce_length,
            tag_length,
        }
    }

    /// Bytes taken by nonce and tag together
    pub fn overhead(&self) -> usize {
        self.nonce_length.saturating_add(self.tag_length)
    }

    /// Check a total container length against this framing.
    ///
    /// The container must be strictly longer than `nonce + tag`; with
    /// `allow_empty` a container of exactly `nonce + tag` (empty ciphertext)
    /// is accepted too.
    fn check(&self, len: usize, allow_empty: bool) -> Result<()> {
        let minimum = self.nonce_length.checked_add(self.tag_length);
        let ok = match minimum {
            Some(min) if allow_empty => len >= min,
            Some(min) => len > min,
            None => false,
        };

        if ok {
            Ok(())
        } else {
            Err(Error::InvalidContainerSize {
                len,
                nonce_length: self.nonce_length,
                tag_length: self.tag_length,
            })
        }
    }
}

/// Sealed data: `nonce || ciphertext || tag` in one immutable buffer
///
/// Cloning shares the buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedData {
    content: Bytes,
    framing: Framing,
}

impl SealedData {
    /// Wrap an already combined buffer
    ///
    /// Fails with `InvalidContainerSize` when the buffer is not strictly
    /// longer than `nonce_length + tag_length`.
    pub fn from_combined(buffer: impl Into<Bytes>, framing: Framing) -> Result<Self> {
        Self::wrap(buffer.into(), framing, false)
    }

    /// Like [`SealedData::from_combined`], but accepts a buffer holding only
    /// nonce and tag, as produced by sealing an empty plaintext.
    pub fn from_combined_allow_empty(buffer: impl Into<Bytes>, framing: Framing) -> Result<Self> {
        Self::wrap(buffer.into(), framing, true)
    }

    /// Decode a combined buffer from text
    pub fn from_combined_encoded(text: &str, encoding: Encoding, framing: Framing) -> Result<Self> {
        Self::from_combined(encoding.decode(text)?, framing)
    }

    /// Assemble from separate nonce, ciphertext and tag
    ///
    /// The framing is taken from the component lengths.
    pub fn from_components(nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Self> {
        let framing = Framing::new(nonce.len(), tag.len());
        Self::wrap(concat(&[nonce, ciphertext, tag]), framing, false)
    }

    /// Assemble from a nonce and a ciphertext with the tag appended
    ///
    /// The last `tag_length` bytes of `ciphertext_with_tag` are the tag.
    pub fn from_ciphertext_with_tag(
        nonce: &[u8],
        ciphertext_with_tag: &[u8],
        tag_length: usize,
    ) -> Result<Self> {
        let (ciphertext, tag) = split_tail(ciphertext_with_tag, tag_length).ok_or(
            Error::InvalidContainerSize {
                len: nonce.len() + ciphertext_with_tag.len(),
                nonce_length: nonce.len(),
                tag_length,
            },
        )?;
        Self::from_components(nonce, ciphertext, tag)
    }

    /// Engine-side assembly; the ciphertext may be empty.
    pub(crate) fn seal_parts(
        nonce: &[u8],
        ciphertext_with_tag: &[u8],
        tag_length: usize,
    ) -> Result<Self> {
        let framing = Framing::new(nonce.len(), tag_length);
        Self::wrap(concat(&[nonce, ciphertext_with_tag]), framing, true)
    }

    fn wrap(content: Bytes, framing: Framing, allow_empty: bool) -> Result<Self> {
        framing.check(content.len(), allow_empty)?;
        Ok(SealedData { content, framing })
    }

    fn ciphertext_end(&self) -> usize {
        self.content.len() - self.framing.tag_length
    }

    // Zero-copy views

    /// Nonce view
    pub fn nonce_bytes(&self) -> Bytes {
        self.content.slice(..self.framing.nonce_length)
    }

    /// Ciphertext view, without the tag
    pub fn ciphertext_bytes(&self) -> Bytes {
        self.content
            .slice(self.framing.nonce_length..self.ciphertext_end())
    }

    /// Contiguous `ciphertext || tag` view, the layout AEAD open calls expect
    pub fn ciphertext_with_tag_bytes(&self) -> Bytes {
        self.content.slice(self.framing.nonce_length..)
    }

    /// Tag view
    pub fn tag_bytes(&self) -> Bytes {
        self.content.slice(self.ciphertext_end()..)
    }

    /// The whole backing buffer
    pub fn combined_bytes(&self) -> Bytes {
        self.content.clone()
    }

    // Copies

    /// Copy of the nonce
    pub fn nonce(&self) -> Vec<u8> {
        self.nonce_bytes().to_vec()
    }

    /// Copy of the ciphertext, without the tag
    pub fn ciphertext(&self) -> Vec<u8> {
        self.ciphertext_bytes().to_vec()
    }

    /// Copy of `ciphertext || tag`
    pub fn ciphertext_with_tag(&self) -> Vec<u8> {
        self.ciphertext_with_tag_bytes().to_vec()
    }

    /// Copy of the tag
    pub fn tag(&self) -> Vec<u8> {
        self.tag_bytes().to_vec()
    }

    /// Copy of the full `nonce || ciphertext || tag` buffer
    pub fn combined(&self) -> Vec<u8> {
        self.content.to_vec()
    }

    // Encoded forms

    pub fn nonce_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.nonce_bytes())
    }

    pub fn ciphertext_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.ciphertext_bytes())
    }

    pub fn ciphertext_with_tag_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.ciphertext_with_tag_bytes())
    }

    pub fn tag_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.tag_bytes())
    }

    pub fn combined_encoded(&self, encoding: Encoding) -> String {
        encoding.encode(&self.content)
    }

    // Sizes

    pub fn nonce_size(&self) -> usize {
        self.framing.nonce_length
    }

    pub fn tag_size(&self) -> usize {
        self.framing.tag_length
    }

    pub fn ciphertext_size(&self) -> usize {
        self.content.len() - self.framing.overhead()
    }

    pub fn combined_size(&self) -> usize {
        self.content.len()
    }

    /// Nonce and tag lengths of this container
    pub fn framing(&self) -> Framing {
        self.framing
    }
}

impl fmt::Debug for SealedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedData")
            .field("nonce_size", &self.nonce_size())
            .field("ciphertext_size", &self.ciphertext_size())
            .field("tag_size", &self.tag_size())
            .finish()
    }
}
