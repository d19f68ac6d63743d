//! sealkit - Portable AES-GCM sealed data
//!
//! This library seals data with AES-GCM into a single container,
//! `nonce || ciphertext || tag`, that reads the same on every backend.
//! Containers can be built from and split into their parts with
//! configurable nonce and tag lengths.

pub mod config;
pub mod crypto;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crypto::{
        AeadEngine, DecryptOptions, EncryptOptions, Framing, KeySize, NonceSpec, SealedData,
        SymmetricKey,
    };
    pub use crate::error::{Error, Result};
}
