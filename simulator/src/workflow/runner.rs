use crate::workflow::config::DashboardConfig;
use anyhow::Context;
use log::warn;
use rand::Rng;
use stubblecore::district::DistrictTable;
use stubblecore::prelude::{Clock, FireResult, SystemClock};
use stubblecore::session::{
    apply, render, Action, ActionContext, ActionOutcome, AssetCatalog, DashboardView, Notice,
    RenderContext, SessionState,
};
use stubblecore::telemetry::{LogBook, MetricsRecorder, MetricsSnapshot};

/// Shared, read-mostly pieces every session acts against.
pub struct Runner {
    table: DistrictTable,
    logs: LogBook,
    assets: AssetCatalog,
    clock: Box<dyn Clock>,
    metrics: MetricsRecorder,
}

impl Runner {
    pub fn from_config(config: &DashboardConfig) -> anyhow::Result<Self> {
        let table = DistrictTable::load(&config.data_file).with_context(|| {
            format!("loading district data {}", config.data_file.display())
        })?;
        Ok(Self::new(
            table,
            LogBook::files(&config.alert_log, &config.emergency_log),
            AssetCatalog::discover(&config.asset_dir),
            Box::new(SystemClock),
        ))
    }

    pub fn new(
        table: DistrictTable,
        logs: LogBook,
        assets: AssetCatalog,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            table,
            logs,
            assets,
            clock,
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn table(&self) -> &DistrictTable {
        &self.table
    }

    pub fn start_session(&self) -> SessionState {
        SessionState::new(&self.table)
    }

    pub fn execute<R: Rng + ?Sized>(
        &self,
        state: &mut SessionState,
        action: Action,
        rng: &mut R,
    ) -> FireResult<ActionOutcome> {
        let mut ctx = ActionContext {
            table: &self.table,
            logs: &self.logs,
            clock: self.clock.as_ref(),
            rng,
        };
        let outcome = apply(state, action, &mut ctx)?;

        if outcome.rescanned {
            self.metrics.record_scan();
        }
        if outcome.alert_logged {
            self.metrics.record_alert();
        }
        if outcome.emergency_logged {
            self.metrics.record_emergency();
        }
        if outcome.log_failed {
            self.metrics.record_log_failure();
        }
        Ok(outcome)
    }

    /// Renders `state`, reading the logs only when the history viewer is open.
    pub fn view(&self, state: &SessionState, notices: &[Notice]) -> DashboardView {
        let mut notices = notices.to_vec();
        let snapshot = if state.show_history {
            match self.logs.snapshot() {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!("log history unavailable: {}", err);
                    notices.push(Notice::warning(format!("Log history unavailable: {err}")));
                    None
                }
            }
        } else {
            None
        };

        render(
            state,
            &RenderContext {
                table: &self.table,
                assets: &self.assets,
                history: snapshot.as_ref(),
                notices: &notices,
            },
        )
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use stubblecore::prelude::FixedClock;
    use stubblecore::session::view::DetectionPanel;
    use stubblecore::telemetry::MemoryLog;

    pub(crate) const LUDHIANA: &str = r#"{"Ludhiana": {"fire_detected": true, "lat": 30.9, "lon": 75.8, "location": "Ludhiana Rural", "timestamp": "2024-01-01 00:00:00"},
        "Kapurthala": {"fire_detected": false, "lat": 31.38, "lon": 75.38, "location": "Phagwara", "timestamp": "2024-01-01 00:00:00"}}"#;

    pub(crate) fn memory_runner() -> Runner {
        Runner::new(
            DistrictTable::from_json_str(LUDHIANA).unwrap(),
            LogBook::new(
                Box::new(MemoryLog::new("alerts")),
                Box::new(MemoryLog::new("emergencies")),
            ),
            AssetCatalog::default(),
            Box::new(FixedClock::new("2024-11-05 14:30:00")),
        )
    }

    #[test]
    fn ludhiana_scenario_renders_marker_and_logs() {
        let runner = memory_runner();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = runner.start_session();
        runner
            .execute(&mut state, Action::SelectDistrict("Ludhiana".into()), &mut rng)
            .unwrap();
        runner
            .execute(&mut state, Action::CheckFireActivity, &mut rng)
            .unwrap();
        runner
            .execute(&mut state, Action::ViewHistory, &mut rng)
            .unwrap();

        let view = runner.view(&state, &[]);
        let metrics = view.metrics.unwrap();
        assert!((86..=97).contains(&metrics.confidence_pct));
        assert!((180..=350).contains(&metrics.aqi));
        match view.detection.unwrap() {
            DetectionPanel::Fire { marker, .. } => {
                assert_eq!((marker.lat, marker.lon), (30.9, 75.8));
            }
            other => panic!("expected fire panel, got {other:?}"),
        }
        let history = view.history.unwrap();
        assert_eq!(history.alerts.lines().count(), 1);
        assert!(history.alerts.contains("Fire in Ludhiana"));

        let metrics = runner.metrics();
        assert_eq!(metrics.scans, 1);
        assert_eq!(metrics.alerts, 1);
    }

    #[test]
    fn from_config_fails_fast_on_missing_data() {
        let config = DashboardConfig {
            data_file: "missing/punjab_fire_data.json".into(),
            ..Default::default()
        };
        let err = Runner::from_config(&config).err().unwrap();
        assert!(format!("{err:#}").contains("missing/punjab_fire_data.json"));
    }
}
