pub mod log;
pub mod metrics;

pub use self::log::{FileLog, LogBook, LogSink, LogSnapshot, MemoryLog};
pub use self::metrics::{MetricsRecorder, MetricsSnapshot};
