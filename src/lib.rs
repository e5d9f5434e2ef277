pub mod clock;
pub mod config;
pub mod datasets;
pub mod db;
pub mod encoding;
pub mod error;
mod read;
mod write;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use datasets::DEFAULT_DATASET;
pub use db::{Database, DeleteRow, GetRow, PutItem, PutRow, RowData, Version};
pub use encoding::{
    BincodeSerializer, CellKey, JsonSerializer, KeyCodec, LengthPrefixedCodec, SeparatorCodec,
    Utf8Serializer, ValueSerializer,
};
pub use error::{Error, Result};
