use chrono::Local;
use std::path::PathBuf;

/// Timestamp layout used for detections, log lines and the seeded data file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Common error type for loading, logging and session actions.
#[derive(thiserror::Error, Debug)]
pub enum FireError {
    #[error("cannot read district data {path}: {source}")]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed district data {path}: {source}")]
    MalformedData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("district data {0} contains no districts")]
    EmptyTable(PathBuf),
    #[error("unknown district: {0}")]
    UnknownDistrict(String),
    #[error("failed to append to {target}: {source}")]
    LogWrite {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {target}: {source}")]
    LogRead {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

pub type FireResult<T> = Result<T, FireError>;

/// Source of the wall-clock stamp written into sessions and logs.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Local time formatted with [`TIMESTAMP_FORMAT`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Clock that always returns the same stamp.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
