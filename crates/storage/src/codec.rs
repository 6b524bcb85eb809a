//! JSON codec shared by every store.
//!
//! Structured values travel through the stores as the bytes `serde_json`
//! produces; nothing beyond "decode(encode(v)) == v" is promised about them.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::StorageError;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value).map_err(|e| StorageError::Encoding(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Decoding {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn decode_reports_the_key() {
        let bytes = encode(&"not a number").unwrap();
        match decode::<u32>("count", &bytes) {
            Err(StorageError::Decoding { key, .. }) => assert_eq!(key, "count"),
            other => panic!("expected decoding error, got {:?}", other),
        }
    }

    #[test]
    fn encode_rejects_non_string_map_keys() {
        let mut m: HashMap<(u8, u8), u8> = HashMap::new();
        m.insert((1, 2), 3);
        assert!(matches!(encode(&m), Err(StorageError::Encoding(_))));
    }
}
