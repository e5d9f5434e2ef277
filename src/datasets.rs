use std::collections::HashSet;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};

use crate::config::Config;
use crate::error::{Error, Result};

/// The dataset used when a request names none.
pub const DEFAULT_DATASET: &str = "default";

/// Owns the underlying store and its column family handles, one per dataset.
///
/// Datasets are declared at open; declared datasets missing from the store
/// are created. Handles live as long as the manager, and requests resolve a
/// dataset name to a borrowed handle that never escapes the database.
pub struct DatasetManager {
    db: DB,
    datasets: HashSet<String>,
}

impl DatasetManager {
    /// Open the store at the configured path with the declared datasets plus
    /// the implicit default.
    pub fn open(config: &Config) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        if let Some(count) = config.max_open_files {
            opts.set_max_open_files(count);
        }
        if let Some(threads) = config.parallelism {
            opts.increase_parallelism(threads);
        }

        let mut datasets: HashSet<String> =
            config.datasets.iter().cloned().collect();
        datasets.insert(DEFAULT_DATASET.to_string());

        // The engine refuses to open a store without listing every family it
        // already contains, so families created by earlier opens must be
        // opened too even when no longer declared. They stay unresolvable.
        let mut to_open = datasets.clone();
        for existing in DB::list_cf(&opts, &config.path).unwrap_or_default() {
            to_open.insert(existing);
        }

        let descriptors: Vec<ColumnFamilyDescriptor> = to_open
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                if let Some(size) = config.write_buffer_size {
                    cf_opts.set_write_buffer_size(size);
                }
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, descriptors)?;
        tracing::debug!(
            path = %config.path.display(),
            datasets = datasets.len(),
            "opened store"
        );
        Ok(Self { db, datasets })
    }

    /// Resolve a request-supplied dataset name to its column family handle.
    /// None resolves to the default dataset; undeclared names are rejected.
    pub fn resolve(&self, dataset: Option<&str>) -> Result<&ColumnFamily> {
        let name = dataset.unwrap_or(DEFAULT_DATASET);
        if !self.datasets.contains(name) {
            return Err(Error::UnknownDataset(name.to_string()));
        }
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::UnknownDataset(name.to_string()))
    }

    /// The underlying store handle.
    pub fn db(&self) -> &DB {
        &self.db
    }

    /// Declared dataset names, including the implicit default. Unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(String::as_str)
    }

    /// Flush every dataset and release the store.
    pub fn close(self) -> Result<()> {
        for name in &self.datasets {
            if let Some(cf) = self.db.cf_handle(name) {
                self.db.flush_cf(cf)?;
            }
        }
        tracing::debug!("closed store");
        Ok(())
    }
}
