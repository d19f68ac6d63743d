//! Self-describing serialized form of a sealed container
//!
//! The raw container does not record its framing. An `Envelope` carries the
//! nonce and tag lengths next to the base64 payload for collaborators that
//! would rather ship the framing than agree on it out of band.

use crate::crypto::{Encoding, Framing, SealedData};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Current envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

/// Serializable sealed container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Format version
    pub version: u8,
    /// Nonce length in bytes
    pub nonce_length: usize,
    /// Tag length in bytes
    pub tag_length: usize,
    /// Base64 of `nonce || ciphertext || tag`
    pub data: String,
}

impl Envelope {
    /// Wrap a sealed container
    pub fn seal(sealed: &SealedData) -> Self {
        let framing = sealed.framing();
        Envelope {
            version: ENVELOPE_VERSION,
            nonce_length: framing.nonce_length,
            tag_length: framing.tag_length,
            data: sealed.combined_encoded(Encoding::Base64),
        }
    }

    /// Recover the sealed container
    ///
    /// An empty ciphertext is accepted since the framing is explicit.
    pub fn open(&self) -> Result<SealedData> {
        if self.version != ENVELOPE_VERSION {
            return Err(Error::Envelope(format!(
                "unsupported envelope version: {}",
                self.version
            )));
        }

        let combined = Encoding::Base64.decode(&self.data)?;
        SealedData::from_combined_allow_empty(
            combined,
            Framing::new(self.nonce_length, self.tag_length),
        )
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Envelope(format!("invalid envelope: {}", e)))
    }
}

impl From<&SealedData> for Envelope {
    fn from(sealed: &SealedData) -> Self {
        Envelope::seal(sealed)
    }
}
