//! Append-only alert and emergency logs.
//!
//! Lines are plain text and never parsed back; the history viewer shows
//! the raw file contents.

use crate::prelude::{FireError, FireResult};
use crate::scoring::percent;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for newline-terminated log lines.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str) -> FireResult<()>;
    /// Whole contents, or `None` when nothing has ever been written.
    fn read_all(&self) -> FireResult<Option<String>>;
    fn describe(&self) -> String;
}

/// Appends to a file on disk, creating it (and its directory) on first write.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> FireError {
        FireError::LogWrite {
            target: self.describe(),
            source,
        }
    }
}

impl LogSink for FileLog {
    fn append(&self, line: &str) -> FireResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.write_error(e))
    }

    fn read_all(&self) -> FireResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FireError::LogRead {
                target: self.describe(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory sink used by tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryLog {
    name: String,
    contents: Mutex<Option<String>>,
}

impl MemoryLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: Mutex::new(None),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents
            .lock()
            .map(|guard| {
                guard
                    .as_deref()
                    .unwrap_or_default()
                    .lines()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn poisoned(name: &str) -> std::io::Error {
    std::io::Error::new(ErrorKind::Other, format!("memory log {name} is poisoned"))
}

impl LogSink for MemoryLog {
    fn append(&self, line: &str) -> FireResult<()> {
        let mut guard = self.contents.lock().map_err(|_| FireError::LogWrite {
            target: self.describe(),
            source: poisoned(&self.name),
        })?;
        guard.get_or_insert_with(String::new).push_str(line);
        Ok(())
    }

    fn read_all(&self) -> FireResult<Option<String>> {
        let guard = self.contents.lock().map_err(|_| FireError::LogRead {
            target: self.describe(),
            source: poisoned(&self.name),
        })?;
        Ok(guard.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

/// Contents of both logs at one instant, for the history viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSnapshot {
    pub alerts: Option<String>,
    pub emergencies: Option<String>,
}

/// The alert and emergency sinks, with the line formats for each.
pub struct LogBook {
    alerts: Box<dyn LogSink>,
    emergencies: Box<dyn LogSink>,
}

impl LogBook {
    pub fn new(alerts: Box<dyn LogSink>, emergencies: Box<dyn LogSink>) -> Self {
        Self {
            alerts,
            emergencies,
        }
    }

    pub fn files<P: Into<PathBuf>, Q: Into<PathBuf>>(alerts: P, emergencies: Q) -> Self {
        Self::new(
            Box::new(FileLog::new(alerts)),
            Box::new(FileLog::new(emergencies)),
        )
    }

    pub fn alert_line(district: &str, time: &str, confidence: f64) -> String {
        format!(
            "{} - Fire in {} (confidence: {}%)\n",
            time,
            district,
            percent(confidence)
        )
    }

    pub fn emergency_line(district: &str, time: &str, confidence: f64, aqi: u32) -> String {
        format!(
            "{} - EMERGENCY sent for {} | conf={}% | AQI={}\n",
            time,
            district,
            percent(confidence),
            aqi
        )
    }

    pub fn log_alert(&self, district: &str, time: &str, confidence: f64) -> FireResult<()> {
        self.alerts
            .append(&Self::alert_line(district, time, confidence))?;
        info!("alert logged for {} at {}", district, time);
        Ok(())
    }

    pub fn log_emergency(
        &self,
        district: &str,
        time: &str,
        confidence: f64,
        aqi: u32,
    ) -> FireResult<()> {
        self.emergencies
            .append(&Self::emergency_line(district, time, confidence, aqi))?;
        info!("emergency logged for {} (AQI {})", district, aqi);
        Ok(())
    }

    pub fn snapshot(&self) -> FireResult<LogSnapshot> {
        Ok(LogSnapshot {
            alerts: self.alerts.read_all()?,
            emergencies: self.emergencies.read_all()?,
        })
    }

    pub fn describe(&self) -> (String, String) {
        (self.alerts.describe(), self.emergencies.describe())
    }
}
