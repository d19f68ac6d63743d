//! Error types for sealkit

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sealkit
///
/// Messages never carry key or plaintext material.
#[derive(Error, Debug)]
pub enum Error {
    // Key errors
    #[error("Invalid key length: expected 16, 24 or 32 bytes, got {got}")]
    InvalidKeyLength { got: usize },

    #[error("Unsupported key size: {0} bits")]
    UnsupportedKeySize(u32),

    #[error("Entropy source failure: {0}")]
    EntropyFailure(String),

    // Container errors
    #[error(
        "Invalid container size: {len} bytes with {nonce_length}-byte nonce and {tag_length}-byte tag"
    )]
    InvalidContainerSize {
        len: usize,
        nonce_length: usize,
        tag_length: usize,
    },

    // AEAD errors
    #[error("Encryption failed: {0}")]
    EncryptionFailure(String),

    /// Tag verification failed. Deliberately carries no detail.
    #[error("Authentication failed")]
    AuthenticationFailure,

    #[error("Unsupported nonce length: {0} bytes")]
    UnsupportedNonceLength(usize),

    #[error("Unsupported tag length: {0} bytes")]
    UnsupportedTagLength(usize),

    // Encoding errors
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Envelope error: {0}")]
    Envelope(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error came from a failed tag check
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Error::AuthenticationFailure)
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AuthenticationFailure => 2,
            Error::Config(_) | Error::InvalidConfig(_) => 78,
            Error::Io(_) => 74,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
