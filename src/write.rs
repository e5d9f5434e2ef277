use rocksdb::{ColumnFamily, Direction, IteratorMode, WriteBatch, DB};

use crate::clock::Clock;
use crate::db::PutItem;
use crate::encoding::keycode::prefix_successor;
use crate::encoding::{KeyCodec, ValueSerializer};
use crate::errinput;
use crate::error::Result;

/// Turns row mutations into atomic write batches against a dataset.
///
/// Every `put_row` and `delete_row` call commits at most one batch, so a
/// failed call has no partial effect.
pub(crate) struct WriteEngine<C, S, T> {
    codec: C,
    serializer: S,
    clock: T,
}

impl<C: KeyCodec, S: ValueSerializer, T: Clock> WriteEngine<C, S, T> {
    pub fn new(codec: C, serializer: S, clock: T) -> Self {
        Self {
            codec,
            serializer,
            clock,
        }
    }

    /// Write one versioned value per item. Items without a timestamp share a
    /// single clock reading taken when the batch is assembled.
    pub fn put_row(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        row: &str,
        items: &[PutItem<S::Value>],
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let now_ms = self.clock.now_ms();
        let mut batch = WriteBatch::default();
        for item in items {
            let timestamp_ms = item.timestamp_ms.unwrap_or(now_ms);
            let value = self.serializer.serialize(&item.value)?;
            batch.put_cf(cf, self.codec.encode(row, &item.column, timestamp_ms), value);
        }
        db.write(batch)?;
        Ok(())
    }

    /// Delete the whole row, whole cells, or single versions, depending on
    /// which arguments are present. Deleting keys that do not exist is a
    /// benign no-op.
    pub fn delete_row(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        row: &str,
        columns: Option<&[String]>,
        timestamps_ms: Option<&[u64]>,
    ) -> Result<()> {
        let mut batch = WriteBatch::default();
        match (columns, timestamps_ms) {
            (None, None) => {
                self.delete_prefix(db, cf, &mut batch, self.codec.row_prefix(row))?;
            }
            (Some(columns), None) => {
                for column in columns {
                    self.delete_prefix(db, cf, &mut batch, self.codec.cell_prefix(row, column))?;
                }
            }
            (Some(columns), Some(timestamps_ms)) => {
                for column in columns {
                    for &ts in timestamps_ms {
                        batch.delete_cf(cf, self.codec.encode(row, column, ts));
                    }
                }
            }
            (None, Some(_)) => {
                return errinput!("timestamps without column names are ambiguous");
            }
        }
        if !batch.is_empty() {
            db.write(batch)?;
        }
        Ok(())
    }

    fn delete_prefix(
        &self,
        db: &DB,
        cf: &ColumnFamily,
        batch: &mut WriteBatch,
        prefix: Vec<u8>,
    ) -> Result<()> {
        match prefix_successor(&prefix) {
            Some(end) => batch.delete_range_cf(cf, &prefix, &end),
            None => {
                // No representable end bound; collect the keys instead.
                for item in db.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward)) {
                    let (key, _) = item?;
                    if !key.starts_with(&prefix) {
                        break;
                    }
                    batch.delete_cf(cf, key);
                }
            }
        }
        Ok(())
    }
}
