use serde::{Serialize, de::DeserializeOwned};

use super::FormatError;

pub(super) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, FormatError> {
    ::bincode::serde::encode_to_vec(value, ::bincode::config::standard())
        .map_err(|e| FormatError::Serialize(Box::new(e)))
}

pub(super) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, FormatError> {
    let (value, _read) = ::bincode::serde::decode_from_slice(data, ::bincode::config::standard())
        .map_err(|e| FormatError::Deserialize(Box::new(e)))?;
    Ok(value)
}
