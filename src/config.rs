use std::path::PathBuf;

/// Configuration for opening a [`Database`](crate::Database).
///
/// Datasets must be declared here; requests naming an undeclared dataset are
/// rejected. The implicit `default` dataset is always available and does not
/// need to be listed. The remaining fields pass through to the underlying
/// engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory path for the database
    pub path: PathBuf,

    /// Datasets to open or create, in addition to the implicit `default`
    pub datasets: Vec<String>,

    /// Create the database directory if missing (default: true)
    pub create_if_missing: bool,

    /// Maximum number of open files kept by the engine
    pub max_open_files: Option<i32>,

    /// Per-dataset write buffer size in bytes
    pub write_buffer_size: Option<usize>,

    /// Background thread count for the engine
    pub parallelism: Option<i32>,
}

impl Config {
    /// Create a new config with the given directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            datasets: Vec::new(),
            create_if_missing: true,
            max_open_files: None,
            write_buffer_size: None,
            parallelism: None,
        }
    }

    /// Declare the datasets to open or create
    pub fn datasets<I, D>(mut self, datasets: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.datasets = datasets.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a single additional dataset
    pub fn dataset(mut self, name: impl Into<String>) -> Self {
        self.datasets.push(name.into());
        self
    }

    /// Create the database directory if missing
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set the engine's maximum open file count
    pub fn max_open_files(mut self, count: i32) -> Self {
        self.max_open_files = Some(count);
        self
    }

    /// Set the engine's per-dataset write buffer size
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = Some(size);
        self
    }

    /// Set the engine's background thread count
    pub fn parallelism(mut self, threads: i32) -> Self {
        self.parallelism = Some(threads);
        self
    }
}
