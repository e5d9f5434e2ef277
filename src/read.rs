use rocksdb::{ColumnFamily, Direction, IteratorMode, DB};

use crate::db::{RowData, Version};
use crate::encoding::format::Raw;
use crate::encoding::{KeyCodec, ValueSerializer};
use crate::error::Result;

/// Serves row reads with bounded forward scans.
///
/// Keys within a cell are stored newest first, so every read is a single
/// forward iteration per scanned prefix: one over the row prefix when all
/// columns are wanted, otherwise one per named cell. Undecodable keys and
/// values that fail to deserialize are skipped with a warning rather than
/// failing the scan; skipped entries never count toward the version limit.
pub(crate) struct ReadEngine<C, S> {
    codec: C,
    serializer: S,
}

impl<C: KeyCodec, S: ValueSerializer> ReadEngine<C, S> {
    pub fn new(codec: C, serializer: S) -> Self {
        Self { codec, serializer }
    }

    /// Fetch versions for a row, grouped by column, newest first per column.
    /// Columns with no surviving versions are absent from the result.
    pub fn get_row(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        row: &str,
        columns: Option<&[String]>,
        num_versions: usize,
        start_ts_ms: Option<u64>,
        end_ts_ms: Option<u64>,
    ) -> Result<RowData<S::Value>> {
        let mut results = RowData::new();
        match columns {
            None => {
                self.scan_row(db, cf, row, num_versions, start_ts_ms, end_ts_ms, &mut results)?
            }
            Some(columns) => {
                for column in columns {
                    self.scan_cell(
                        db,
                        cf,
                        row,
                        column,
                        num_versions,
                        start_ts_ms,
                        end_ts_ms,
                        &mut results,
                    )?;
                }
            }
        }
        Ok(results)
    }

    /// One forward scan over the whole row, grouping versions by column.
    #[allow(clippy::too_many_arguments)]
    fn scan_row(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        row: &str,
        num_versions: usize,
        start_ts_ms: Option<u64>,
        end_ts_ms: Option<u64>,
        results: &mut RowData<S::Value>,
    ) -> Result<()> {
        let prefix = self.codec.row_prefix(row);
        for item in db.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward)) {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let cell = match self.codec.decode(&key) {
                Ok(cell) => cell,
                Err(err) => {
                    tracing::warn!(key = %Raw::bytes(&key), error = %err, "skipping undecodable key");
                    continue;
                }
            };
            // Versions outside the window are skipped, not terminal: later
            // keys may belong to other columns of this row.
            if start_ts_ms.is_some_and(|start| cell.timestamp_ms < start) {
                continue;
            }
            if end_ts_ms.is_some_and(|end| cell.timestamp_ms > end) {
                continue;
            }
            let have = results.get(&cell.column).map_or(0, Vec::len);
            if have >= num_versions {
                continue;
            }
            if let Some(version) = self.deserialize(&key, &value, cell.timestamp_ms) {
                results.entry(cell.column).or_default().push(version);
            }
        }
        Ok(())
    }

    /// One forward scan over a single cell. With an upper time bound the scan
    /// seeks straight to the first version inside the window, and it stops as
    /// soon as the version limit is reached or a version falls below the
    /// lower bound.
    #[allow(clippy::too_many_arguments)]
    fn scan_cell(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        row: &str,
        column: &str,
        num_versions: usize,
        start_ts_ms: Option<u64>,
        end_ts_ms: Option<u64>,
        results: &mut RowData<S::Value>,
    ) -> Result<()> {
        let prefix = self.codec.cell_prefix(row, column);
        // The key at end_ts is the smallest key of the cell with timestamp
        // <= end_ts, so seeking there skips every too-new version.
        let seek = match end_ts_ms {
            Some(end) => self.codec.encode(row, column, end),
            None => prefix.clone(),
        };

        let mut versions = Vec::new();
        for item in db.iterator_cf(cf, IteratorMode::From(&seek, Direction::Forward)) {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let cell = match self.codec.decode(&key) {
                Ok(cell) => cell,
                Err(err) => {
                    tracing::warn!(key = %Raw::bytes(&key), error = %err, "skipping undecodable key");
                    continue;
                }
            };
            // Keys in a cell are newest first, so everything from here on is
            // older than the lower bound.
            if start_ts_ms.is_some_and(|start| cell.timestamp_ms < start) {
                break;
            }
            if end_ts_ms.is_some_and(|end| cell.timestamp_ms > end) {
                continue;
            }
            if let Some(version) = self.deserialize(&key, &value, cell.timestamp_ms) {
                versions.push(version);
            }
            if versions.len() >= num_versions {
                break;
            }
        }

        if !versions.is_empty() {
            results.insert(column.to_string(), versions);
        }
        Ok(())
    }

    fn deserialize(&self, key: &[u8], value: &[u8], timestamp_ms: u64) -> Option<Version<S::Value>> {
        match self.serializer.deserialize(value) {
            Ok(value) => Some(Version {
                timestamp_ms,
                value,
            }),
            Err(err) => {
                tracing::warn!(key = %Raw::bytes(key), error = %err, "skipping undeserializable value");
                None
            }
        }
    }
}
