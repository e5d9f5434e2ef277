use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ValueSerializer;
use crate::errinput;
use crate::error::{Error, Result};

/// The default serializer: values are UTF-8 strings stored verbatim.
///
/// Empty strings are rejected, since they would produce an empty stored
/// value and an empty cell version carries no data.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Serializer;

impl ValueSerializer for Utf8Serializer {
    type Value = String;

    fn serialize(&self, value: &String) -> Result<Vec<u8>> {
        if value.is_empty() {
            return errinput!("empty values are not permitted");
        }
        Ok(value.as_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String> {
        Ok(std::str::from_utf8(bytes)?.to_string())
    }
}

/// Serializes any serde value as JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned + Send + Sync> ValueSerializer for JsonSerializer<T> {
    type Value = T;

    fn serialize(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Serializes any serde value with bincode, a compact binary format.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned + Send + Sync> ValueSerializer for BincodeSerializer<T> {
    type Value = T;

    fn serialize(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = bincode::serialize(value)?;
        // bincode encodes zero-sized types as zero bytes, which would be
        // indistinguishable from a missing value.
        if bytes.is_empty() {
            return Err(Error::Serialization(
                "value serialized to zero bytes".to_string(),
            ));
        }
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
