//! Property-based tests for sealkit
//!
//! Uses proptest to check container and AEAD invariants over random keys,
//! framings and payloads.

use proptest::prelude::*;
use sealkit::crypto::{
    AeadEngine, DecryptOptions, EncryptOptions, Framing, KeySize, SealedData, SymmetricKey,
};
use sealkit::Error;

fn key_material() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![Just(16usize), Just(24), Just(32)]
        .prop_flat_map(|len| prop::collection::vec(any::<u8>(), len))
}

fn nonce_lengths() -> impl Strategy<Value = usize> {
    1usize..=32
}

fn tag_lengths() -> impl Strategy<Value = usize> {
    prop::sample::select(vec![16usize, 15, 14, 13, 12, 8, 4])
}

fn seal(
    key: &SymmetricKey,
    plaintext: &[u8],
    aad: &[u8],
    nonce_length: usize,
    tag_length: usize,
) -> SealedData {
    let options = EncryptOptions::default()
        .with_nonce_length(nonce_length)
        .with_tag_length(tag_length)
        .with_aad(aad.to_vec());
    AeadEngine::new()
        .encrypt(plaintext, key, &options)
        .expect("Encryption should succeed")
}

// ============================================================================
// AEAD Properties
// ============================================================================

mod aead_properties {
    use super::*;

    proptest! {
        /// Round trip: decrypt(encrypt(p)) == p for every supported shape
        #[test]
        fn aead_roundtrip(
            key_bytes in key_material(),
            nonce_length in nonce_lengths(),
            tag_length in tag_lengths(),
            plaintext in prop::collection::vec(any::<u8>(), 0..1024),
            aad in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let key = SymmetricKey::import_from(&key_bytes).unwrap();
            let sealed = seal(&key, &plaintext, &aad, nonce_length, tag_length);

            prop_assert_eq!(sealed.nonce_size(), nonce_length);
            prop_assert_eq!(sealed.tag_size(), tag_length);
            prop_assert_eq!(sealed.ciphertext_size(), plaintext.len());
            prop_assert_eq!(sealed.combined_size(), nonce_length + plaintext.len() + tag_length);

            let decrypted = AeadEngine::new()
                .decrypt(&sealed, &key, &DecryptOptions::default().with_aad(aad))
                .expect("Decryption should succeed");
            prop_assert_eq!(decrypted, plaintext);
        }

        /// Decryption under different AAD fails
        #[test]
        fn aad_is_bound(
            key_bytes in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            aad1 in prop::collection::vec(any::<u8>(), 0..32),
            aad2 in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            prop_assume!(aad1 != aad2);

            let key = SymmetricKey::import_from(&key_bytes).unwrap();
            let sealed = seal(&key, &plaintext, &aad1, 12, 16);

            let result = AeadEngine::new()
                .decrypt(&sealed, &key, &DecryptOptions::default().with_aad(aad2));
            prop_assert!(matches!(result, Err(Error::AuthenticationFailure)));
        }

        /// Decryption with wrong key fails
        #[test]
        fn wrong_key_decryption_fails(
            key1_bytes in any::<[u8; 32]>(),
            key2_bytes in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            prop_assume!(key1_bytes != key2_bytes);

            let key1 = SymmetricKey::import_from(&key1_bytes).unwrap();
            let key2 = SymmetricKey::import_from(&key2_bytes).unwrap();
            let sealed = seal(&key1, &plaintext, b"", 12, 16);

            let result = AeadEngine::new().decrypt(&sealed, &key2, &DecryptOptions::default());
            prop_assert!(matches!(result, Err(Error::AuthenticationFailure)));
        }

        /// Flipping any bit of the container is detected
        #[test]
        fn tampering_detected(
            key_bytes in any::<[u8; 16]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..128),
            tag_length in tag_lengths(),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let key = SymmetricKey::import_from(&key_bytes).unwrap();
            let sealed = seal(&key, &plaintext, b"", 12, tag_length);

            let mut combined = sealed.combined();
            let index = position.index(combined.len());
            combined[index] ^= 1 << bit;

            let tampered = SealedData::from_combined_allow_empty(combined, sealed.framing()).unwrap();
            let result = AeadEngine::new().decrypt(&tampered, &key, &DecryptOptions::default());
            prop_assert!(matches!(result, Err(Error::AuthenticationFailure)));
        }
    }
}

// ============================================================================
// Container Properties
// ============================================================================

mod container_properties {
    use super::*;

    proptest! {
        /// Assembling from components and from the combined buffer agree
        #[test]
        fn components_match_combined(
            nonce in prop::collection::vec(any::<u8>(), 1..33),
            ciphertext in prop::collection::vec(any::<u8>(), 1..256),
            tag in prop::collection::vec(any::<u8>(), 1..17),
        ) {
            let from_parts = SealedData::from_components(&nonce, &ciphertext, &tag).unwrap();

            let mut combined = nonce.clone();
            combined.extend_from_slice(&ciphertext);
            combined.extend_from_slice(&tag);
            prop_assert_eq!(from_parts.combined(), combined.clone());

            let framing = Framing::new(nonce.len(), tag.len());
            let from_combined = SealedData::from_combined(combined, framing).unwrap();
            prop_assert_eq!(from_combined.nonce(), nonce);
            prop_assert_eq!(from_combined.ciphertext(), ciphertext);
            prop_assert_eq!(from_combined.tag(), tag);
            prop_assert_eq!(&from_combined, &from_parts);
        }

        /// Buffers no longer than nonce + tag are rejected
        #[test]
        fn minimum_size_enforced(
            nonce_length in nonce_lengths(),
            tag_length in tag_lengths(),
            shortfall in 0usize..8,
        ) {
            let len = (nonce_length + tag_length).saturating_sub(shortfall);
            let result = SealedData::from_combined(vec![0u8; len], Framing::new(nonce_length, tag_length));
            let rejected = matches!(result, Err(Error::InvalidContainerSize { .. }));
            prop_assert!(rejected);

            let accepted = SealedData::from_combined(
                vec![0u8; nonce_length + tag_length + 1],
                Framing::new(nonce_length, tag_length),
            );
            prop_assert!(accepted.is_ok());
        }

        /// Only 16, 24 and 32 byte keys import
        #[test]
        fn key_length_validated(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let result = SymmetricKey::import_from(&bytes);
            match bytes.len() {
                16 => { prop_assert_eq!(result.unwrap().size(), KeySize::Aes128); }
                24 => { prop_assert_eq!(result.unwrap().size(), KeySize::Aes192); }
                32 => { prop_assert_eq!(result.unwrap().size(), KeySize::Aes256); }
                len => {
                    let rejected = matches!(result, Err(Error::InvalidKeyLength { got }) if got == len);
                    prop_assert!(rejected);
                }
            }
        }
    }
}
