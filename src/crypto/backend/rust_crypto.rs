//! Pure-Rust AES-GCM backend (RustCrypto `aes-gcm`)
//!
//! `aes-gcm` fixes the key type and nonce size at compile time, so the
//! runtime parameters are matched onto concrete cipher types here. The
//! cipher always computes the full 16-byte tag; shorter tags are its prefix.

use super::AeadBackend;
use crate::crypto::{
    split_tail, KeySize, SymmetricKey, SUPPORTED_NONCE_LENGTHS, SUPPORTED_TAG_LENGTHS, TAG_SIZE,
};
use crate::error::{Error, Result};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::*;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::AesGcm;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Default AES-GCM backend
///
/// Supports all three key sizes, nonces of 1 to 32 bytes and tags of 16, 15,
/// 14, 13, 12, 8 or 4 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoGcm;

macro_rules! with_nonce {
    ($aes:ty, $nonce_length:expr, $op:ident($($arg:expr),*)) => {
        match $nonce_length {
            12 => $op::<AesGcm<$aes, U12>>($($arg),*),
            1 => $op::<AesGcm<$aes, U1>>($($arg),*),
            2 => $op::<AesGcm<$aes, U2>>($($arg),*),
            3 => $op::<AesGcm<$aes, U3>>($($arg),*),
            4 => $op::<AesGcm<$aes, U4>>($($arg),*),
            5 => $op::<AesGcm<$aes, U5>>($($arg),*),
            6 => $op::<AesGcm<$aes, U6>>($($arg),*),
            7 => $op::<AesGcm<$aes, U7>>($($arg),*),
            8 => $op::<AesGcm<$aes, U8>>($($arg),*),
            9 => $op::<AesGcm<$aes, U9>>($($arg),*),
            10 => $op::<AesGcm<$aes, U10>>($($arg),*),
            11 => $op::<AesGcm<$aes, U11>>($($arg),*),
            13 => $op::<AesGcm<$aes, U13>>($($arg),*),
            14 => $op::<AesGcm<$aes, U14>>($($arg),*),
            15 => $op::<AesGcm<$aes, U15>>($($arg),*),
            16 => $op::<AesGcm<$aes, U16>>($($arg),*),
            17 => $op::<AesGcm<$aes, U17>>($($arg),*),
            18 => $op::<AesGcm<$aes, U18>>($($arg),*),
            19 => $op::<AesGcm<$aes, U19>>($($arg),*),
            20 => $op::<AesGcm<$aes, U20>>($($arg),*),
            21 => $op::<AesGcm<$aes, U21>>($($arg),*),
            22 => $op::<AesGcm<$aes, U22>>($($arg),*),
            23 => $op::<AesGcm<$aes, U23>>($($arg),*),
            24 => $op::<AesGcm<$aes, U24>>($($arg),*),
            25 => $op::<AesGcm<$aes, U25>>($($arg),*),
            26 => $op::<AesGcm<$aes, U26>>($($arg),*),
            27 => $op::<AesGcm<$aes, U27>>($($arg),*),
            28 => $op::<AesGcm<$aes, U28>>($($arg),*),
            29 => $op::<AesGcm<$aes, U29>>($($arg),*),
            30 => $op::<AesGcm<$aes, U30>>($($arg),*),
            31 => $op::<AesGcm<$aes, U31>>($($arg),*),
            32 => $op::<AesGcm<$aes, U32>>($($arg),*),
            other => Err(Error::UnsupportedNonceLength(other)),
        }
    };
}

macro_rules! dispatch {
    ($key:expr, $nonce_length:expr, $op:ident($($arg:expr),*)) => {
        match $key.size() {
            KeySize::Aes128 => with_nonce!(Aes128, $nonce_length, $op($($arg),*)),
            KeySize::Aes192 => with_nonce!(Aes192, $nonce_length, $op($($arg),*)),
            KeySize::Aes256 => with_nonce!(Aes256, $nonce_length, $op($($arg),*)),
        }
    };
}

fn seal_with<C>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_length: usize,
) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace<TagSize = U16>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|_| Error::EncryptionFailure("Failed to create encryption key".to_string()))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| Error::EncryptionFailure("Encryption failed".to_string()))?;

    buffer.extend_from_slice(&tag[..tag_length]);
    Ok(buffer)
}

fn open_with<C>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext_with_tag: &[u8],
    tag_length: usize,
) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace<TagSize = U16>,
{
    let cipher = C::new_from_slice(key).map_err(|_| Error::AuthenticationFailure)?;
    let nonce = GenericArray::from_slice(nonce);

    let (ciphertext, tag) =
        split_tail(ciphertext_with_tag, tag_length).ok_or(Error::AuthenticationFailure)?;
    let mut buffer = ciphertext.to_vec();

    if tag_length == TAG_SIZE {
        cipher
            .decrypt_in_place_detached(nonce, aad, &mut buffer, GenericArray::from_slice(tag))
            .map_err(|_| Error::AuthenticationFailure)?;
        return Ok(buffer);
    }

    // Truncated tag. The keystream is the same in both directions, so
    // encrypting the ciphertext yields the candidate plaintext, and sealing
    // that again recomputes the full tag over the original ciphertext.
    cipher
        .encrypt_in_place_detached(nonce, b"", &mut buffer)
        .map_err(|_| Error::AuthenticationFailure)?;

    let mut resealed = buffer.clone();
    let expected = cipher
        .encrypt_in_place_detached(nonce, aad, &mut resealed)
        .map_err(|_| Error::AuthenticationFailure)?;
    resealed.zeroize();

    if bool::from(expected[..tag_length].ct_eq(tag)) {
        Ok(buffer)
    } else {
        buffer.zeroize();
        Err(Error::AuthenticationFailure)
    }
}

impl RustCryptoGcm {
    fn check_tag_length(&self, tag_length: usize) -> Result<()> {
        if self.supports_tag_length(tag_length) {
            Ok(())
        } else {
            Err(Error::UnsupportedTagLength(tag_length))
        }
    }
}

impl AeadBackend for RustCryptoGcm {
    fn name(&self) -> &'static str {
        "rustcrypto"
    }

    fn supports_nonce_length(&self, length: usize) -> bool {
        SUPPORTED_NONCE_LENGTHS.contains(&length)
    }

    fn supports_tag_length(&self, length: usize) -> bool {
        SUPPORTED_TAG_LENGTHS.contains(&length)
    }

    fn seal(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>> {
        self.check_tag_length(tag_length)?;
        dispatch!(
            key,
            nonce.len(),
            seal_with(key.expose(), nonce, aad, plaintext, tag_length)
        )
    }

    fn open(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext_with_tag: &[u8],
        tag_length: usize,
    ) -> Result<Vec<u8>> {
        self.check_tag_length(tag_length)?;
        dispatch!(
            key,
            nonce.len(),
            open_with(key.expose(), nonce, aad, ciphertext_with_tag, tag_length)
        )
    }
}
