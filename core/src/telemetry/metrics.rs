use serde::Serialize;
use std::sync::Mutex;

/// Counters for dashboard activity across all sessions.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub scans: usize,
    pub alerts: usize,
    pub emergencies: usize,
    pub log_failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_scan(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.scans += 1;
        }
    }

    pub fn record_alert(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.alerts += 1;
        }
    }

    pub fn record_emergency(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.emergencies += 1;
        }
    }

    pub fn record_log_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.log_failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_scan();
        metrics.record_scan();
        metrics.record_alert();
        metrics.record_log_failure();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.scans, 2);
        assert_eq!(snapshot.alerts, 1);
        assert_eq!(snapshot.emergencies, 0);
        assert_eq!(snapshot.log_failures, 1);
    }
}
