use std::fmt::Display;

/// Cellstore errors.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Invalid request parameters, rejected before any storage I/O. Empty row
    /// or column names, a zero version limit, timestamps without columns on a
    /// delete, values rejected by the serializer, and codec constraint
    /// violations all land here.
    InvalidRequest(String),
    /// The request named a dataset that was not declared at open.
    UnknownDataset(String),
    /// The database has been closed; the operation was not attempted.
    NotOpen,
    /// A value failed to serialize on write or deserialize on read.
    Serialization(String),
    /// A failure propagated from the underlying storage engine.
    Storage(String),
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Error::UnknownDataset(name) => write!(f, "unknown dataset: {name}"),
            Error::NotOpen => write!(f, "database is not open"),
            Error::Serialization(msg) => write!(f, "serialization error: {msg}"),
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

/// Constructs an Error::InvalidRequest for the given format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::error::Error::InvalidRequest(format!($($args)*)).into() };
}

/// A cellstore Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
