use byteorder::{BigEndian, ByteOrder};

use super::CellKey;
use crate::error::{Error, Result};
use crate::{errinput, KeyCodec};

/// Separator between key components in the separator codec. Row and column
/// strings must not contain this byte.
pub const KEY_SEPARATOR: u8 = 0x00;

/// Largest accepted timestamp in milliseconds.
pub const MAX_TIMESTAMP_MS: u64 = i64::MAX as u64;

/// Largest row/column byte length accepted by the length-prefixed codec.
pub const MAX_COMPONENT_LEN: usize = i32::MAX as usize;

const INVERTED_TS_LEN: usize = 8;

/// Inverts a timestamp so that ascending byte order is descending time order.
/// Self-inverse: applying it twice returns the original timestamp.
#[inline]
pub fn invert_timestamp(timestamp_ms: u64) -> u64 {
    u64::MAX - timestamp_ms
}

fn append_inverted_timestamp(key: &mut Vec<u8>, timestamp_ms: u64) {
    let mut buf = [0u8; INVERTED_TS_LEN];
    BigEndian::write_u64(&mut buf, invert_timestamp(timestamp_ms));
    key.extend_from_slice(&buf);
}

fn read_inverted_timestamp(bytes: &[u8]) -> Result<u64> {
    if bytes.len() != INVERTED_TS_LEN {
        return Err(Error::Storage(format!(
            "malformed key: expected {INVERTED_TS_LEN} timestamp bytes, found {}",
            bytes.len()
        )));
    }
    Ok(invert_timestamp(BigEndian::read_u64(bytes)))
}

/// The smallest byte string strictly greater than every string with the given
/// prefix, or None when no such string exists (all bytes are 0xff). Used as
/// the exclusive end bound for prefix scans and range deletes.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    prefix.iter().rposition(|b| *b != 0xff).map(|i| {
        let mut end = prefix[..=i].to_vec();
        end[i] += 1;
        end
    })
}

/// Codec that joins UTF-8 components with a 0x00 separator:
/// `row || 0x00 || column || 0x00 || inverted_timestamp_be64`.
///
/// Compact and human-inspectable, but row and column strings must not contain
/// the separator byte; requests violating that are rejected up front.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeparatorCodec;

impl KeyCodec for SeparatorCodec {
    fn encode(&self, row: &str, column: &str, timestamp_ms: u64) -> Vec<u8> {
        let mut key = self.cell_prefix(row, column);
        append_inverted_timestamp(&mut key, timestamp_ms);
        key
    }

    fn decode(&self, key: &[u8]) -> Result<CellKey> {
        let malformed = || Error::Storage(format!("malformed key: {}", super::format::Raw::bytes(key)));

        let row_end = key
            .iter()
            .position(|b| *b == KEY_SEPARATOR)
            .ok_or_else(malformed)?;
        let rest = &key[row_end + 1..];
        let column_end = rest
            .iter()
            .position(|b| *b == KEY_SEPARATOR)
            .ok_or_else(malformed)?;

        let row = std::str::from_utf8(&key[..row_end]).map_err(|_| malformed())?;
        let column = std::str::from_utf8(&rest[..column_end]).map_err(|_| malformed())?;
        let timestamp_ms =
            read_inverted_timestamp(&rest[column_end + 1..]).map_err(|_| malformed())?;

        Ok(CellKey {
            row: row.to_string(),
            column: column.to_string(),
            timestamp_ms,
        })
    }

    fn row_prefix(&self, row: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(row.len() + 1);
        prefix.extend_from_slice(row.as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    fn cell_prefix(&self, row: &str, column: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(row.len() + column.len() + 2);
        prefix.extend_from_slice(row.as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix.extend_from_slice(column.as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    fn validate_component(&self, component: &str) -> Result<()> {
        if component.bytes().any(|b| b == KEY_SEPARATOR) {
            return errinput!("key component {component:?} contains the separator byte 0x00");
        }
        Ok(())
    }
}

/// Codec that prefixes each UTF-8 component with its big-endian u32 length:
/// `len(row) || row || len(column) || column || inverted_timestamp_be64`.
///
/// Places no restriction on component content; component lengths are bound by
/// [`MAX_COMPONENT_LEN`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LengthPrefixedCodec;

impl LengthPrefixedCodec {
    fn append_component(key: &mut Vec<u8>, component: &str) {
        let mut len = [0u8; 4];
        BigEndian::write_u32(&mut len, component.len() as u32);
        key.extend_from_slice(&len);
        key.extend_from_slice(component.as_bytes());
    }

    fn read_component<'a>(key: &'a [u8], offset: &mut usize) -> Option<&'a str> {
        let len_end = offset.checked_add(4)?;
        let len = BigEndian::read_u32(key.get(*offset..len_end)?) as usize;
        let end = len_end.checked_add(len)?;
        let component = std::str::from_utf8(key.get(len_end..end)?).ok()?;
        *offset = end;
        Some(component)
    }
}

impl KeyCodec for LengthPrefixedCodec {
    fn encode(&self, row: &str, column: &str, timestamp_ms: u64) -> Vec<u8> {
        let mut key = self.cell_prefix(row, column);
        append_inverted_timestamp(&mut key, timestamp_ms);
        key
    }

    fn decode(&self, key: &[u8]) -> Result<CellKey> {
        let malformed = || Error::Storage(format!("malformed key: {}", super::format::Raw::bytes(key)));

        let mut offset = 0;
        let row = Self::read_component(key, &mut offset).ok_or_else(malformed)?;
        let column = Self::read_component(key, &mut offset).ok_or_else(malformed)?;
        let timestamp_ms = read_inverted_timestamp(&key[offset..]).map_err(|_| malformed())?;

        Ok(CellKey {
            row: row.to_string(),
            column: column.to_string(),
            timestamp_ms,
        })
    }

    fn row_prefix(&self, row: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(row.len() + 4);
        Self::append_component(&mut prefix, row);
        prefix
    }

    fn cell_prefix(&self, row: &str, column: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(row.len() + column.len() + 8);
        Self::append_component(&mut prefix, row);
        Self::append_component(&mut prefix, column);
        prefix
    }

    fn validate_component(&self, component: &str) -> Result<()> {
        if component.len() > MAX_COMPONENT_LEN {
            return errinput!(
                "key component of {} bytes exceeds the maximum of {MAX_COMPONENT_LEN}",
                component.len()
            );
        }
        Ok(())
    }
}
