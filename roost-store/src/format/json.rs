use serde::{Serialize, de::DeserializeOwned};

use super::FormatError;

pub(super) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, FormatError> {
    serde_json::to_vec(value).map_err(|e| FormatError::Serialize(Box::new(e)))
}

pub(super) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, FormatError> {
    serde_json::from_slice(data).map_err(|e| FormatError::Deserialize(Box::new(e)))
}
