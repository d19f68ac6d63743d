//! Byte buffer helpers shared by the container and engine
//!
//! Containers keep a single reference-counted [`Bytes`] buffer, so slicing
//! out the nonce, ciphertext or tag never copies.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concatenate byte slices into one contiguous buffer
pub fn concat(parts: &[&[u8]]) -> Bytes {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut buf = BytesMut::with_capacity(total);
    for part in parts {
        buf.extend_from_slice(part);
    }
    buf.freeze()
}

/// Split off the last `tail` bytes of `buf`
///
/// Returns `None` when `buf` is shorter than `tail`.
pub fn split_tail(buf: &[u8], tail: usize) -> Option<(&[u8], &[u8])> {
    let head = buf.len().checked_sub(tail)?;
    Some(buf.split_at(head))
}

/// Text encoding for transporting binary values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Standard padded base64
    #[default]
    Base64,
    /// Lowercase hex
    Hex,
}

impl Encoding {
    /// Encode bytes as text
    pub fn encode(&self, data: &[u8]) -> String {
        match self {
            Encoding::Base64 => STANDARD.encode(data),
            Encoding::Hex => hex::encode(data),
        }
    }

    /// Decode text produced by [`Encoding::encode`]
    ///
    /// Surrounding whitespace is ignored so values read from files decode cleanly.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        match self {
            Encoding::Base64 => STANDARD
                .decode(text)
                .map_err(|e| Error::Encoding(format!("invalid base64: {}", e))),
            Encoding::Hex => {
                hex::decode(text).map_err(|e| Error::Encoding(format!("invalid hex: {}", e)))
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Base64 => f.write_str("base64"),
            Encoding::Hex => f.write_str("hex"),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Encoding::Base64),
            "hex" => Ok(Encoding::Hex),
            other => Err(Error::Encoding(format!("unknown encoding: {}", other))),
        }
    }
}
