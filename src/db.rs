use std::collections::HashMap;
use std::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::datasets::DatasetManager;
use crate::encoding::keycode::MAX_TIMESTAMP_MS;
use crate::encoding::{KeyCodec, SeparatorCodec, Utf8Serializer, ValueSerializer};
use crate::errinput;
use crate::error::{Error, Result};
use crate::read::ReadEngine;
use crate::write::WriteEngine;

/// One version of a cell: a timestamped value.
#[derive(Clone, Debug, PartialEq)]
pub struct Version<V> {
    pub timestamp_ms: u64,
    pub value: V,
}

/// Row contents returned by [`Database::get_row`]: versions grouped by
/// column, newest first within each column. Columns without surviving
/// versions are absent.
pub type RowData<V> = HashMap<String, Vec<Version<V>>>;

/// One column write within a [`PutRow`] request.
#[derive(Clone, Debug)]
pub struct PutItem<V> {
    pub column: String,
    pub value: V,
    pub timestamp_ms: Option<u64>,
}

impl<V> PutItem<V> {
    /// A write stamped with the server clock at commit time.
    pub fn new(column: impl Into<String>, value: V) -> Self {
        Self {
            column: column.into(),
            value,
            timestamp_ms: None,
        }
    }

    /// A write at an explicit timestamp.
    pub fn at(column: impl Into<String>, value: V, timestamp_ms: u64) -> Self {
        Self {
            column: column.into(),
            value,
            timestamp_ms: Some(timestamp_ms),
        }
    }
}

/// A row write request: one or more versioned column values, applied as a
/// single atomic batch.
#[derive(Clone, Debug)]
pub struct PutRow<V> {
    row: String,
    dataset: Option<String>,
    items: Vec<PutItem<V>>,
}

impl<V> PutRow<V> {
    pub fn new(row: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            dataset: None,
            items: Vec::new(),
        }
    }

    /// Target a declared dataset instead of the default
    pub fn dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset = Some(name.into());
        self
    }

    /// Add a write stamped with the server clock
    pub fn item(mut self, column: impl Into<String>, value: V) -> Self {
        self.items.push(PutItem::new(column, value));
        self
    }

    /// Add a write at an explicit timestamp
    pub fn item_at(mut self, column: impl Into<String>, value: V, timestamp_ms: u64) -> Self {
        self.items.push(PutItem::at(column, value, timestamp_ms));
        self
    }
}

/// A row read request.
///
/// Without named columns the whole row is read. `num_versions` caps how many
/// versions are returned per column (default 1, the newest). The optional
/// time window is inclusive on both ends and applied before the version cap.
#[derive(Clone, Debug)]
pub struct GetRow {
    row: String,
    dataset: Option<String>,
    columns: Option<Vec<String>>,
    num_versions: usize,
    start_ts_ms: Option<u64>,
    end_ts_ms: Option<u64>,
}

impl GetRow {
    pub fn new(row: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            dataset: None,
            columns: None,
            num_versions: 1,
            start_ts_ms: None,
            end_ts_ms: None,
        }
    }

    /// Read from a declared dataset instead of the default
    pub fn dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset = Some(name.into());
        self
    }

    /// Restrict the read to one more named column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.get_or_insert_with(Vec::new).push(column.into());
        self
    }

    /// Restrict the read to the named columns. An explicitly empty sequence
    /// reads nothing; to read all columns, name none at all.
    pub fn columns<I, N>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Cap the number of versions returned per column
    pub fn num_versions(mut self, limit: usize) -> Self {
        self.num_versions = limit;
        self
    }

    /// Drop versions older than this timestamp (inclusive bound)
    pub fn start_ts_ms(mut self, timestamp_ms: u64) -> Self {
        self.start_ts_ms = Some(timestamp_ms);
        self
    }

    /// Drop versions newer than this timestamp (inclusive bound)
    pub fn end_ts_ms(mut self, timestamp_ms: u64) -> Self {
        self.end_ts_ms = Some(timestamp_ms);
        self
    }
}

/// A row delete request.
///
/// With no columns the whole row is deleted. With columns, those cells are
/// deleted whole; adding timestamps narrows the delete to those exact
/// versions. Timestamps without columns are rejected as ambiguous.
#[derive(Clone, Debug)]
pub struct DeleteRow {
    row: String,
    dataset: Option<String>,
    columns: Option<Vec<String>>,
    timestamps_ms: Option<Vec<u64>>,
}

impl DeleteRow {
    pub fn new(row: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            dataset: None,
            columns: None,
            timestamps_ms: None,
        }
    }

    /// Target a declared dataset instead of the default
    pub fn dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset = Some(name.into());
        self
    }

    /// Restrict the delete to one more named column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.get_or_insert_with(Vec::new).push(column.into());
        self
    }

    /// Restrict the delete to the named columns
    pub fn columns<I, N>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the delete to these exact versions of the named columns
    pub fn timestamps_ms<I>(mut self, timestamps: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.timestamps_ms = Some(timestamps.into_iter().collect());
        self
    }
}

/// A wide-column database: rows addressed by string keys, each row holding
/// many columns, each (row, column) cell holding timestamp-versioned values,
/// isolated per dataset.
///
/// The key codec, value serializer, and clock are fixed at open time and
/// captured in the write and read engines, so no dispatch happens per
/// request. A `Database` is safe to share across threads; `close` waits for
/// in-flight operations and releases the store.
pub struct Database<C = SeparatorCodec, S = Utf8Serializer, T = SystemClock> {
    inner: RwLock<Option<Inner<C, S, T>>>,
}

struct Inner<C, S, T> {
    codec: C,
    datasets: DatasetManager,
    write: WriteEngine<C, S, T>,
    read: ReadEngine<C, S>,
}

impl Database<SeparatorCodec, Utf8Serializer, SystemClock> {
    /// Open a database with the default separator codec, UTF-8 string values,
    /// and the system clock.
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with(config, SeparatorCodec, Utf8Serializer, SystemClock)
    }
}

impl<C, S, T> Database<C, S, T>
where
    C: KeyCodec + Clone,
    S: ValueSerializer + Clone,
    T: Clock,
{
    /// Open a database with an explicit codec, serializer, and clock. The
    /// codec must match the one used by every previous open of this path;
    /// mixing codecs corrupts iteration order.
    pub fn open_with(config: Config, codec: C, serializer: S, clock: T) -> Result<Self> {
        let datasets = DatasetManager::open(&config)?;
        let write = WriteEngine::new(codec.clone(), serializer.clone(), clock);
        let read = ReadEngine::new(codec.clone(), serializer);
        Ok(Self {
            inner: RwLock::new(Some(Inner {
                codec,
                datasets,
                write,
                read,
            })),
        })
    }

    /// Flush and release the store. Data operations after this fail with
    /// [`Error::NotOpen`]; closing an already-closed database is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.write()?;
        match guard.take() {
            Some(inner) => inner.datasets.close(),
            None => Ok(()),
        }
    }

    /// Write the request's items to its row as one atomic batch. Items
    /// without a timestamp share the clock reading taken at commit; writing
    /// at an existing (column, timestamp) replaces that version.
    pub fn put_row(&self, put: PutRow<S::Value>) -> Result<()> {
        let guard = self.inner.read()?;
        let inner = guard.as_ref().ok_or(Error::NotOpen)?;

        validate_row(&inner.codec, &put.row)?;
        for item in &put.items {
            validate_column(&inner.codec, &item.column)?;
            if let Some(ts) = item.timestamp_ms {
                validate_timestamp(ts)?;
            }
        }

        let cf = inner.datasets.resolve(put.dataset.as_deref())?;
        inner.write.put_row(inner.datasets.db(), cf, &put.row, &put.items)
    }

    /// Read versions of a row, grouped by column and newest first within each
    /// column. An inverted time window (start past end) yields an empty
    /// result. A stored version whose value no longer deserializes is skipped
    /// with a warning; other versions of the cell are still returned.
    pub fn get_row(&self, get: GetRow) -> Result<RowData<S::Value>> {
        let guard = self.inner.read()?;
        let inner = guard.as_ref().ok_or(Error::NotOpen)?;

        validate_row(&inner.codec, &get.row)?;
        if get.num_versions == 0 {
            return errinput!("num_versions must be positive");
        }
        if let Some(columns) = &get.columns {
            for column in columns {
                validate_column(&inner.codec, column)?;
            }
        }
        if let Some(ts) = get.start_ts_ms {
            validate_timestamp(ts)?;
        }
        if let Some(ts) = get.end_ts_ms {
            validate_timestamp(ts)?;
        }

        let cf = inner.datasets.resolve(get.dataset.as_deref())?;
        if let (Some(start), Some(end)) = (get.start_ts_ms, get.end_ts_ms) {
            if start > end {
                return Ok(RowData::new());
            }
        }
        inner.read.get_row(
            inner.datasets.db(),
            cf,
            &get.row,
            get.columns.as_deref(),
            get.num_versions,
            get.start_ts_ms,
            get.end_ts_ms,
        )
    }

    /// Delete the request's row, cells, or exact versions as one atomic
    /// batch. Deleting data that does not exist is a benign no-op.
    pub fn delete_row(&self, delete: DeleteRow) -> Result<()> {
        let guard = self.inner.read()?;
        let inner = guard.as_ref().ok_or(Error::NotOpen)?;

        validate_row(&inner.codec, &delete.row)?;
        if delete.columns.is_none() && delete.timestamps_ms.is_some() {
            return errinput!("timestamps without column names are ambiguous");
        }
        if let Some(columns) = &delete.columns {
            for column in columns {
                validate_column(&inner.codec, column)?;
            }
        }
        if let Some(timestamps) = &delete.timestamps_ms {
            for &ts in timestamps {
                validate_timestamp(ts)?;
            }
        }

        let cf = inner.datasets.resolve(delete.dataset.as_deref())?;
        inner.write.delete_row(
            inner.datasets.db(),
            cf,
            &delete.row,
            delete.columns.as_deref(),
            delete.timestamps_ms.as_deref(),
        )
    }
}

fn validate_row<C: KeyCodec>(codec: &C, row: &str) -> Result<()> {
    if row.is_empty() {
        return errinput!("row key is empty");
    }
    codec.validate_component(row)
}

fn validate_column<C: KeyCodec>(codec: &C, column: &str) -> Result<()> {
    if column.is_empty() {
        return errinput!("column name is empty");
    }
    codec.validate_component(column)
}

fn validate_timestamp(timestamp_ms: u64) -> Result<()> {
    if timestamp_ms > MAX_TIMESTAMP_MS {
        return errinput!("timestamp {timestamp_ms} is out of range");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::encoding::{BincodeSerializer, JsonSerializer, LengthPrefixedCodec};
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    const T: u64 = 1_000_000_000_000;

    fn open_db(dir: &TempDir) -> Database {
        Database::open(Config::new(dir.path()).datasets(["A", "B"])).expect("open failed")
    }

    fn versions(rows: &RowData<String>, column: &str) -> Vec<(u64, String)> {
        rows[column]
            .iter()
            .map(|v| (v.timestamp_ms, v.value.clone()))
            .collect()
    }

    #[test]
    fn put_get_latest() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("u:1").item_at("email", "a@x".to_string(), T))?;

        let rows = db.get_row(GetRow::new("u:1"))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(versions(&rows, "email"), vec![(T, "a@x".to_string())]);
        Ok(())
    }

    #[test]
    fn version_history_is_newest_first() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(
            PutRow::new("p:abc")
                .item_at("price", "19".to_string(), T - 1_000)
                .item_at("price", "21".to_string(), T),
        )?;

        let rows = db.get_row(GetRow::new("p:abc").column("price").num_versions(2))?;
        assert_eq!(
            versions(&rows, "price"),
            vec![(T, "21".to_string()), (T - 1_000, "19".to_string())]
        );
        Ok(())
    }

    #[test]
    fn datasets_are_isolated() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("k").item_at("c", "v1".to_string(), T).dataset("A"))?;
        db.put_row(PutRow::new("k").item_at("c", "v2".to_string(), T).dataset("B"))?;

        let a = db.get_row(GetRow::new("k").dataset("A"))?;
        let b = db.get_row(GetRow::new("k").dataset("B"))?;
        assert_eq!(versions(&a, "c"), vec![(T, "v1".to_string())]);
        assert_eq!(versions(&b, "c"), vec![(T, "v2".to_string())]);

        // The default dataset never saw the row.
        assert!(db.get_row(GetRow::new("k"))?.is_empty());
        Ok(())
    }

    #[test]
    fn time_range_filter_is_inclusive() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        let mut put = PutRow::new("log");
        for delta in [20_000, 15_000, 10_000, 5_000] {
            put = put.item_at("event", format!("e{delta}"), T - delta);
        }
        db.put_row(put)?;

        let rows = db.get_row(
            GetRow::new("log")
                .column("event")
                .start_ts_ms(T - 16_000)
                .end_ts_ms(T - 9_000)
                .num_versions(10),
        )?;
        assert_eq!(
            versions(&rows, "event"),
            vec![
                (T - 10_000, "e10000".to_string()),
                (T - 15_000, "e15000".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn point_version_delete_is_precise() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(
            PutRow::new("s")
                .item_at("reading", "r1".to_string(), T - 200)
                .item_at("reading", "r2".to_string(), T - 100)
                .item_at("reading", "r3".to_string(), T),
        )?;

        db.delete_row(DeleteRow::new("s").column("reading").timestamps_ms([T - 100]))?;

        let rows = db.get_row(GetRow::new("s").column("reading").num_versions(3))?;
        assert_eq!(
            versions(&rows, "reading"),
            vec![(T, "r3".to_string()), (T - 200, "r1".to_string())]
        );
        Ok(())
    }

    #[test]
    fn row_delete_is_exhaustive() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(
            PutRow::new("u:1")
                .item_at("email", "a@x".to_string(), T)
                .item_at("email", "b@x".to_string(), T - 1)
                .item_at("name", "ada".to_string(), T),
        )?;

        db.delete_row(DeleteRow::new("u:1"))?;
        assert!(db.get_row(GetRow::new("u:1").num_versions(10))?.is_empty());
        Ok(())
    }

    #[test]
    fn column_delete_leaves_other_columns() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(
            PutRow::new("r")
                .item_at("a", "1".to_string(), T)
                .item_at("b", "2".to_string(), T)
                .item_at("c", "3".to_string(), T),
        )?;

        db.delete_row(DeleteRow::new("r").columns(["a", "c"]))?;

        let rows = db.get_row(GetRow::new("r"))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(versions(&rows, "b"), vec![(T, "2".to_string())]);
        Ok(())
    }

    #[test]
    fn same_timestamp_write_is_last_writer_wins() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("r").item_at("c", "first".to_string(), T))?;
        db.put_row(PutRow::new("r").item_at("c", "second".to_string(), T))?;

        let rows = db.get_row(GetRow::new("r").column("c").num_versions(5))?;
        assert_eq!(versions(&rows, "c"), vec![(T, "second".to_string())]);
        Ok(())
    }

    #[test]
    fn num_versions_caps_each_column_independently() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        let mut put = PutRow::new("r");
        for i in 0..5u64 {
            put = put.item_at("many", format!("m{i}"), T - i);
        }
        put = put.item_at("single", "s".to_string(), T);
        db.put_row(put)?;

        let rows = db.get_row(GetRow::new("r").num_versions(2))?;
        assert_eq!(rows["many"].len(), 2);
        assert_eq!(rows["many"][0].timestamp_ms, T);
        assert_eq!(rows["many"][1].timestamp_ms, T - 1);
        assert_eq!(rows["single"].len(), 1);
        Ok(())
    }

    #[test]
    fn omitted_timestamps_use_the_injected_clock() -> Result<()> {
        let dir = TempDir::new()?;
        let clock = FixedClock::at(T);
        let db = Database::open_with(
            Config::new(dir.path()),
            SeparatorCodec,
            Utf8Serializer,
            clock.clone(),
        )?;

        db.put_row(PutRow::new("r").item("a", "1".to_string()).item("b", "2".to_string()))?;
        clock.advance(10);
        db.put_row(PutRow::new("r").item("a", "3".to_string()))?;

        let rows = db.get_row(GetRow::new("r").num_versions(5))?;
        assert_eq!(
            versions(&rows, "a"),
            vec![(T + 10, "3".to_string()), (T, "1".to_string())]
        );
        assert_eq!(versions(&rows, "b"), vec![(T, "2".to_string())]);
        Ok(())
    }

    #[test]
    fn inverted_time_window_returns_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T))?;

        let rows = db.get_row(GetRow::new("r").start_ts_ms(T).end_ts_ms(T - 1))?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn explicit_empty_column_list_reads_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T))?;

        let rows = db.get_row(GetRow::new("r").columns(Vec::<String>::new()))?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_requests_before_io() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        let invalid = |result: Result<RowData<String>>| {
            assert!(matches!(result, Err(Error::InvalidRequest(_))));
        };

        invalid(db.get_row(GetRow::new("")));
        invalid(db.get_row(GetRow::new("r").column("")));
        invalid(db.get_row(GetRow::new("r").num_versions(0)));
        invalid(db.get_row(GetRow::new("r\0w")));
        invalid(db.get_row(GetRow::new("r").start_ts_ms(u64::MAX)));

        assert!(matches!(
            db.put_row(PutRow::new("r").item_at("c\0c", "v".to_string(), T)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            db.put_row(PutRow::new("r").item_at("c", String::new(), T)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            db.delete_row(DeleteRow::new("r").timestamps_ms([T])),
            Err(Error::InvalidRequest(_))
        ));
        Ok(())
    }

    #[test]
    fn unknown_dataset_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        assert_eq!(
            db.get_row(GetRow::new("r").dataset("nope")).err(),
            Some(Error::UnknownDataset("nope".to_string()))
        );
        assert_eq!(
            db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T).dataset("nope"))
                .err(),
            Some(Error::UnknownDataset("nope".to_string()))
        );
        Ok(())
    }

    #[test]
    fn operations_after_close_fail_with_not_open() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T))?;
        db.close()?;
        // Closing again is a no-op.
        db.close()?;

        assert_eq!(db.get_row(GetRow::new("r")).err(), Some(Error::NotOpen));
        assert_eq!(
            db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T)).err(),
            Some(Error::NotOpen)
        );
        assert_eq!(db.delete_row(DeleteRow::new("r")).err(), Some(Error::NotOpen));
        Ok(())
    }

    #[test]
    fn data_survives_close_and_reopen() -> Result<()> {
        let dir = TempDir::new()?;
        {
            let db = open_db(&dir);
            db.put_row(PutRow::new("r").item_at("c", "v".to_string(), T).dataset("A"))?;
            db.close()?;
        }

        let db = open_db(&dir);
        let rows = db.get_row(GetRow::new("r").dataset("A"))?;
        assert_eq!(versions(&rows, "c"), vec![(T, "v".to_string())]);
        Ok(())
    }

    #[test]
    fn length_prefixed_codec_end_to_end() -> Result<()> {
        let dir = TempDir::new()?;
        let db = Database::open_with(
            Config::new(dir.path()),
            LengthPrefixedCodec,
            Utf8Serializer,
            SystemClock,
        )?;

        // Separator bytes in row and column names are fine with this codec.
        db.put_row(
            PutRow::new("r\0w")
                .item_at("c\u{0}1", "v1".to_string(), T)
                .item_at("c\u{0}1", "v2".to_string(), T - 1),
        )?;

        let rows = db.get_row(GetRow::new("r\0w").num_versions(2))?;
        assert_eq!(
            versions(&rows, "c\u{0}1"),
            vec![(T, "v1".to_string()), (T - 1, "v2".to_string())]
        );

        db.delete_row(DeleteRow::new("r\0w"))?;
        assert!(db.get_row(GetRow::new("r\0w"))?.is_empty());
        Ok(())
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Event {
        kind: String,
        payload: Vec<u8>,
    }

    #[test]
    fn json_serializer_end_to_end() -> Result<()> {
        let dir = TempDir::new()?;
        let db = Database::open_with(
            Config::new(dir.path()),
            SeparatorCodec,
            JsonSerializer::<Event>::new(),
            SystemClock,
        )?;

        let event = Event {
            kind: "login".to_string(),
            payload: vec![1, 2, 3],
        };
        db.put_row(PutRow::new("e:1").item_at("event", event.clone(), T))?;

        let rows = db.get_row(GetRow::new("e:1").column("event"))?;
        assert_eq!(rows["event"][0].value, event);
        Ok(())
    }

    #[test]
    fn bincode_serializer_end_to_end() -> Result<()> {
        let dir = TempDir::new()?;
        let db = Database::open_with(
            Config::new(dir.path()),
            SeparatorCodec,
            BincodeSerializer::<Event>::new(),
            SystemClock,
        )?;

        let event = Event {
            kind: "logout".to_string(),
            payload: vec![9, 9],
        };
        db.put_row(PutRow::new("e:2").item_at("event", event.clone(), T))?;

        let rows = db.get_row(GetRow::new("e:2").column("event"))?;
        assert_eq!(rows["event"][0].value, event);
        Ok(())
    }

    #[test]
    fn concurrent_readers_and_writers() -> Result<()> {
        let dir = TempDir::new()?;
        let db = open_db(&dir);

        std::thread::scope(|scope| {
            for worker in 0..4u64 {
                let db = &db;
                scope.spawn(move || {
                    for i in 0..25u64 {
                        let row = format!("w:{worker}");
                        db.put_row(
                            PutRow::new(row.as_str()).item_at("n", format!("{i}"), T + i),
                        )
                        .expect("put failed");
                        let rows = db
                            .get_row(GetRow::new(row.as_str()).column("n"))
                            .expect("get failed");
                        assert_eq!(rows["n"][0].timestamp_ms, T + i);
                    }
                });
            }
        });

        for worker in 0..4u64 {
            let rows = db.get_row(GetRow::new(format!("w:{worker}")).num_versions(100))?;
            assert_eq!(rows["n"].len(), 25);
        }
        Ok(())
    }
}
