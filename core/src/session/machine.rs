//! Button and picker handling for one dashboard session.

use crate::district::DistrictTable;
use crate::prelude::{Clock, FireError, FireResult};
use crate::scoring::{ai_confidence, estimate_aqi, DEFAULT_AQI, DEFAULT_CONFIDENCE};
use crate::session::state::SessionState;
use crate::telemetry::LogBook;
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SelectDistrict(String),
    CheckFireActivity,
    ViewHistory,
    HideHistory,
    NotifyAuthorities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// One-shot message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// What an action did, beyond the state mutation itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub notices: Vec<Notice>,
    pub ignored: bool,
    pub rescanned: bool,
    pub alert_logged: bool,
    pub emergency_logged: bool,
    pub log_failed: bool,
}

impl ActionOutcome {
    fn ignored() -> Self {
        Self {
            ignored: true,
            ..Default::default()
        }
    }
}

/// Everything an action may read or write besides the session itself.
pub struct ActionContext<'a, R: Rng + ?Sized> {
    pub table: &'a DistrictTable,
    pub logs: &'a LogBook,
    pub clock: &'a dyn Clock,
    pub rng: &'a mut R,
}

/// Applies `action` to `state`. Unknown districts are rejected without
/// touching the state; log write failures become warnings.
pub fn apply<R: Rng + ?Sized>(
    state: &mut SessionState,
    action: Action,
    ctx: &mut ActionContext<'_, R>,
) -> FireResult<ActionOutcome> {
    match action {
        Action::SelectDistrict(district) => select_district(state, district, ctx),
        Action::CheckFireActivity => Ok(check_fire_activity(state, ctx)),
        Action::ViewHistory => {
            state.show_history = true;
            Ok(ActionOutcome::default())
        }
        Action::HideHistory => {
            state.show_history = false;
            Ok(ActionOutcome::default())
        }
        Action::NotifyAuthorities => Ok(notify_authorities(state, ctx)),
    }
}

fn select_district<R: Rng + ?Sized>(
    state: &mut SessionState,
    district: String,
    ctx: &mut ActionContext<'_, R>,
) -> FireResult<ActionOutcome> {
    if !ctx.table.contains(&district) {
        return Err(FireError::UnknownDistrict(district));
    }
    if state.selected_district == district {
        return Ok(ActionOutcome::ignored());
    }

    state.selected_district = district;
    if !state.has_detected_once {
        return Ok(ActionOutcome::default());
    }

    rescan(state, ctx)?;
    Ok(ActionOutcome {
        rescanned: true,
        ..Default::default()
    })
}

fn check_fire_activity<R: Rng + ?Sized>(
    state: &mut SessionState,
    ctx: &mut ActionContext<'_, R>,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();

    let (time, confidence) = match rescan(state, ctx) {
        Ok(scan) => scan,
        // The selection is validated on every change, so this only happens
        // if the session was built against a different table.
        Err(err) => {
            outcome.notices.push(Notice::warning(err.to_string()));
            return outcome;
        }
    };
    state.has_detected_once = true;
    outcome.rescanned = true;

    match ctx
        .logs
        .log_alert(&state.selected_district, &time, confidence)
    {
        Ok(()) => outcome.alert_logged = true,
        Err(err) => {
            warn!("alert log write failed: {}", err);
            outcome.log_failed = true;
            outcome
                .notices
                .push(Notice::warning(format!("Alert could not be logged: {err}")));
        }
    }
    outcome
}

fn notify_authorities<R: Rng + ?Sized>(
    state: &mut SessionState,
    ctx: &mut ActionContext<'_, R>,
) -> ActionOutcome {
    if !state.can_notify() {
        return ActionOutcome::ignored();
    }

    let confidence = state.last_confidence.unwrap_or(DEFAULT_CONFIDENCE);
    let aqi = state.last_aqi.unwrap_or(DEFAULT_AQI);
    let time = ctx.clock.now();

    let mut outcome = ActionOutcome::default();
    match ctx
        .logs
        .log_emergency(&state.selected_district, &time, confidence, aqi)
    {
        Ok(()) => {
            outcome.emergency_logged = true;
            outcome.notices.push(Notice::success(
                "Emergency notification sent to authorities (demo)",
            ));
        }
        Err(err) => {
            warn!("emergency log write failed: {}", err);
            outcome.log_failed = true;
            outcome.notices.push(Notice::warning(format!(
                "Emergency notification could not be logged: {err}"
            )));
        }
    }
    outcome
}

/// Stamps the current time and draws fresh scores for the selected district.
fn rescan<R: Rng + ?Sized>(
    state: &mut SessionState,
    ctx: &mut ActionContext<'_, R>,
) -> FireResult<(String, f64)> {
    let record = ctx
        .table
        .get(&state.selected_district)
        .ok_or_else(|| FireError::UnknownDistrict(state.selected_district.clone()))?;
    let is_fire = record.fire_detected;
    let time = ctx.clock.now();
    let confidence = ai_confidence(&mut *ctx.rng, is_fire);
    let aqi = estimate_aqi(&mut *ctx.rng, is_fire);

    state.last_timestamp = Some(time.clone());
    state.last_confidence = Some(confidence);
    state.last_aqi = Some(aqi);
    state.last_fire_flag = Some(is_fire);

    info!(
        "scan {} -> fire={} confidence={:.2} aqi={}",
        state.selected_district, is_fire, confidence, aqi
    );
    Ok((time, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::FixedClock;
    use crate::scoring::aqi::FIRE_AQI;
    use crate::scoring::confidence::{CLEAR_CONFIDENCE, FIRE_CONFIDENCE};
    use crate::session::state::Phase;
    use crate::telemetry::{FileLog, LogSink, MemoryLog};
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;

    const DATA: &str = r#"{
        "Ludhiana": {"fire_detected": true, "lat": 30.9, "lon": 75.8, "location": "Ludhiana Rural", "timestamp": "2024-01-01 00:00:00"},
        "Hoshiarpur": {"fire_detected": false, "lat": 31.53, "lon": 75.91, "location": "Dasuya", "timestamp": "2024-01-01 00:00:00"},
        "Bathinda": {"fire_detected": true, "lat": 30.21, "lon": 74.95, "location": "Talwandi Sabo", "timestamp": "2024-01-01 00:00:00"}
    }"#;

    /// Shares a memory log between the book and the test.
    struct Shared(Arc<MemoryLog>);

    impl LogSink for Shared {
        fn append(&self, line: &str) -> FireResult<()> {
            self.0.append(line)
        }
        fn read_all(&self) -> FireResult<Option<String>> {
            self.0.read_all()
        }
        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    struct Harness {
        table: DistrictTable,
        logs: LogBook,
        alerts: Arc<MemoryLog>,
        emergencies: Arc<MemoryLog>,
        clock: FixedClock,
        rng: StdRng,
    }

    impl Harness {
        fn new() -> Self {
            let alerts = Arc::new(MemoryLog::new("alerts"));
            let emergencies = Arc::new(MemoryLog::new("emergencies"));
            Self {
                table: DistrictTable::from_json_str(DATA).unwrap(),
                logs: LogBook::new(
                    Box::new(Shared(alerts.clone())),
                    Box::new(Shared(emergencies.clone())),
                ),
                alerts,
                emergencies,
                clock: FixedClock::new("2024-11-05 14:30:00"),
                rng: StdRng::seed_from_u64(99),
            }
        }

        fn run(&mut self, state: &mut SessionState, action: Action) -> FireResult<ActionOutcome> {
            let mut ctx = ActionContext {
                table: &self.table,
                logs: &self.logs,
                clock: &self.clock,
                rng: &mut self.rng,
            };
            apply(state, action, &mut ctx)
        }
    }

    #[test]
    fn check_fire_activity_scores_and_logs_once() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        let outcome = harness
            .run(&mut state, Action::CheckFireActivity)
            .unwrap();

        assert!(outcome.alert_logged);
        assert_eq!(state.phase(), Phase::Detected);
        let confidence = state.last_confidence.unwrap();
        assert!(FIRE_CONFIDENCE.contains(&confidence));
        assert!(FIRE_AQI.contains(&state.last_aqi.unwrap()));
        assert_eq!(state.last_timestamp.as_deref(), Some("2024-11-05 14:30:00"));
        assert_eq!(state.last_fire_flag, Some(true));

        let lines = harness.alerts.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Fire in Ludhiana"));
        assert_eq!(
            lines[0],
            format!(
                "2024-11-05 14:30:00 - Fire in Ludhiana (confidence: {}%)",
                crate::scoring::percent(confidence)
            )
        );
    }

    #[test]
    fn every_district_appends_one_alert_line() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        for (index, district) in harness.table.names().into_iter().enumerate() {
            harness
                .run(&mut state, Action::SelectDistrict(district.clone()))
                .unwrap();
            harness
                .run(&mut state, Action::CheckFireActivity)
                .unwrap();
            let lines = harness.alerts.lines();
            assert_eq!(lines.len(), index + 1);
            assert!(lines[index].contains(&format!("Fire in {district} (confidence: ")));
        }
    }

    #[test]
    fn switching_districts_while_idle_writes_nothing() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        harness
            .run(&mut state, Action::SelectDistrict("Hoshiarpur".into()))
            .unwrap();
        harness
            .run(&mut state, Action::SelectDistrict("Bathinda".into()))
            .unwrap();

        assert_eq!(state.selected_district, "Bathinda");
        assert!(state.last_confidence.is_none());
        assert!(harness.alerts.lines().is_empty());
        assert!(harness.emergencies.lines().is_empty());
    }

    #[test]
    fn switching_districts_after_detection_rescans_without_logging() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        harness
            .run(&mut state, Action::CheckFireActivity)
            .unwrap();

        let outcome = harness
            .run(&mut state, Action::SelectDistrict("Hoshiarpur".into()))
            .unwrap();
        assert!(outcome.rescanned);
        assert_eq!(state.last_fire_flag, Some(false));
        assert!(CLEAR_CONFIDENCE.contains(&state.last_confidence.unwrap()));
        assert!((40..=120).contains(&state.last_aqi.unwrap()));

        harness
            .run(&mut state, Action::SelectDistrict("Bathinda".into()))
            .unwrap();
        assert_eq!(harness.alerts.lines().len(), 1);
        assert!(harness.emergencies.lines().is_empty());
    }

    #[test]
    fn reselecting_the_same_district_is_ignored() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        harness
            .run(&mut state, Action::CheckFireActivity)
            .unwrap();
        let before = state.clone();
        let outcome = harness
            .run(&mut state, Action::SelectDistrict("Ludhiana".into()))
            .unwrap();
        assert!(outcome.ignored);
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_district_is_rejected() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        let err = harness
            .run(&mut state, Action::SelectDistrict("Atlantis".into()))
            .unwrap_err();
        assert!(matches!(err, FireError::UnknownDistrict(name) if name == "Atlantis"));
        assert_eq!(state.selected_district, "Ludhiana");
    }

    #[test]
    fn notify_before_detection_is_a_no_op() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        let outcome = harness
            .run(&mut state, Action::NotifyAuthorities)
            .unwrap();
        assert!(outcome.ignored);
        assert!(outcome.notices.is_empty());
        assert!(harness.emergencies.lines().is_empty());
    }

    #[test]
    fn notify_after_detection_uses_latest_scores() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        harness
            .run(&mut state, Action::CheckFireActivity)
            .unwrap();
        let outcome = harness
            .run(&mut state, Action::NotifyAuthorities)
            .unwrap();

        assert!(outcome.emergency_logged);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Success);
        let lines = harness.emergencies.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            format!(
                "2024-11-05 14:30:00 - EMERGENCY sent for Ludhiana | conf={}% | AQI={}",
                crate::scoring::percent(state.last_confidence.unwrap()),
                state.last_aqi.unwrap()
            )
        );
    }

    #[test]
    fn notify_falls_back_to_default_scores() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        state.has_detected_once = true;
        harness
            .run(&mut state, Action::NotifyAuthorities)
            .unwrap();
        assert!(harness.emergencies.lines()[0].ends_with("| conf=90% | AQI=260"));
    }

    #[test]
    fn history_toggle_is_independent_of_detection() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        harness.run(&mut state, Action::ViewHistory).unwrap();
        assert!(state.show_history);
        assert_eq!(state.phase(), Phase::Idle);
        harness.run(&mut state, Action::HideHistory).unwrap();
        assert!(!state.show_history);
    }

    #[test]
    fn failed_scan_leaves_session_idle() {
        let mut harness = Harness::new();
        let mut state = SessionState::new(&harness.table);
        state.selected_district = "Atlantis".into();

        let outcome = harness
            .run(&mut state, Action::CheckFireActivity)
            .unwrap();
        assert!(!outcome.rescanned);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Warning);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.last_confidence.is_none());
        assert!(harness.alerts.lines().is_empty());
    }

    #[test]
    fn log_failure_keeps_session_usable() {
        let dir = tempfile::tempdir().unwrap();
        let table = DistrictTable::from_json_str(DATA).unwrap();
        let logs = LogBook::new(
            Box::new(FileLog::new(dir.path())),
            Box::new(MemoryLog::new("emergencies")),
        );
        let clock = FixedClock::new("2024-11-05 14:30:00");
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = ActionContext {
            table: &table,
            logs: &logs,
            clock: &clock,
            rng: &mut rng,
        };
        let mut state = SessionState::new(&table);

        let outcome = apply(&mut state, Action::CheckFireActivity, &mut ctx).unwrap();
        assert!(outcome.log_failed);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Warning);
        assert_eq!(state.phase(), Phase::Detected);

        let outcome = apply(&mut state, Action::NotifyAuthorities, &mut ctx).unwrap();
        assert!(outcome.emergency_logged);
    }

    #[test]
    fn actions_round_trip_through_json() {
        let action: Action = serde_json::from_str(r#"{"select_district":"Moga"}"#).unwrap();
        assert_eq!(action, Action::SelectDistrict("Moga".into()));
        let action: Action = serde_json::from_str(r#""notify_authorities""#).unwrap();
        assert_eq!(action, Action::NotifyAuthorities);
    }
}
