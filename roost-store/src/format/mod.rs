//! Value formats and the versioned envelope around them.
//!
//! Every value written by roost starts with a fixed header:
//!
//! | bytes | content |
//! |-------|---------|
//! | 0..4  | magic `RST\0` |
//! | 4     | envelope version ([`ENVELOPE_VERSION`]) |
//! | 5     | format tag ([`Format::tag`]) |
//! | 6..   | payload encoded by the format |
//!
//! Readers reject anything whose magic or version they do not recognize, so
//! values written by an incompatible release read as a miss instead of
//! decoding into garbage. The format tag travels with the value: a manager
//! configured for JSON still reads bincode values written earlier.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

mod bincode;
mod json;

/// Envelope magic.
pub const MAGIC: [u8; 4] = *b"RST\0";

/// Current envelope version.
pub const ENVELOPE_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),

    #[error("value is not a roost envelope")]
    BadMagic,

    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown format tag {0}")]
    UnknownFormat(u8),
}

/// Payload encoding of stored values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Compact binary encoding, `bincode` standard configuration.
    #[default]
    Bincode,
    /// Human-readable JSON, handy when inspecting a shared store by hand.
    Json,
}

impl Format {
    /// Tag byte written into the envelope.
    pub fn tag(self) -> u8 {
        match self {
            Format::Bincode => 0,
            Format::Json => 1,
        }
    }

    /// Inverse of [`Format::tag`].
    pub fn from_tag(tag: u8) -> Result<Self, FormatError> {
        match tag {
            0 => Ok(Format::Bincode),
            1 => Ok(Format::Json),
            other => Err(FormatError::UnknownFormat(other)),
        }
    }

    /// Encodes `value` and wraps it in an envelope.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Bytes, FormatError> {
        let payload = match self {
            Format::Bincode => bincode::encode(value)?,
            Format::Json => json::encode(value)?,
        };
        let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
        buf.put_slice(&MAGIC);
        buf.put_u8(ENVELOPE_VERSION);
        buf.put_u8(self.tag());
        buf.put_slice(&payload);
        Ok(buf.freeze())
    }

    /// Unwraps an envelope and decodes its payload with the format it was
    /// written in.
    pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, FormatError> {
        if data.len() < HEADER_LEN || data[..MAGIC.len()] != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = data[MAGIC.len()];
        if version != ENVELOPE_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let payload = &data[HEADER_LEN..];
        match Format::from_tag(data[MAGIC.len() + 1])? {
            Format::Bincode => bincode::decode(payload),
            Format::Json => json::decode(payload),
        }
    }
}
