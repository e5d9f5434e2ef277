pub mod format;
pub mod keycode;
pub mod serializer;

pub use keycode::{LengthPrefixedCodec, SeparatorCodec};
pub use serializer::{BincodeSerializer, JsonSerializer, Utf8Serializer};

use crate::error::Result;

/// A decoded storage key: one version of one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellKey {
    pub row: String,
    pub column: String,
    pub timestamp_ms: u64,
}

/// Trait for encoding (row, column, timestamp) triples into ordered byte keys.
///
/// Encoded keys must maintain a specific total order under lexicographic byte
/// comparison: within a cell, a larger timestamp encodes to a *smaller* key,
/// so a forward scan yields versions newest first; keys of distinct cells
/// never interleave, and every key of a cell starts with that cell's prefix.
/// Timestamps are stored big-endian as `u64::MAX - timestamp_ms` to get the
/// inversion.
pub trait KeyCodec: Send + Sync {
    /// Encode a full version key. Components must have passed
    /// [`validate_component`](KeyCodec::validate_component).
    fn encode(&self, row: &str, column: &str, timestamp_ms: u64) -> Vec<u8>;

    /// Decode a full version key back into its components.
    fn decode(&self, key: &[u8]) -> Result<CellKey>;

    /// Prefix shared by every key of the row and by no other row's keys.
    fn row_prefix(&self, row: &str) -> Vec<u8>;

    /// Prefix shared by every key of the (row, column) cell and by no other
    /// cell's keys.
    fn cell_prefix(&self, row: &str, column: &str) -> Vec<u8>;

    /// Check a row or column string against codec-specific constraints.
    /// Called by the facade before encoding anything.
    fn validate_component(&self, _component: &str) -> Result<()> {
        Ok(())
    }
}

/// Trait for converting application values to and from stored bytes.
///
/// The serializer is fixed at open time and shared by the write and read
/// paths; `deserialize(serialize(v))` must round-trip. A serializer may
/// reject a value outright (e.g. the UTF-8 serializer refuses empty strings,
/// since a cell version must carry data).
pub trait ValueSerializer: Send + Sync {
    /// The application-level value type.
    type Value;

    /// Encode the value to bytes
    fn serialize(&self, value: &Self::Value) -> Result<Vec<u8>>;

    /// Decode bytes back to the original value
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Value>;
}
