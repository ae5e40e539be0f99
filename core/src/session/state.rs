use crate::district::DistrictTable;
use serde::{Deserialize, Serialize};

/// Whether a detection has been run in this session yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Detected,
}

/// Per-session dashboard state. The `last_*` fields stay `None` until the
/// first "Check Fire Activity" runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_district: String,
    pub has_detected_once: bool,
    pub last_confidence: Option<f64>,
    pub last_aqi: Option<u32>,
    pub last_timestamp: Option<String>,
    pub last_fire_flag: Option<bool>,
    pub show_history: bool,
}

impl SessionState {
    pub fn new(table: &DistrictTable) -> Self {
        Self {
            selected_district: table.first().to_string(),
            has_detected_once: false,
            last_confidence: None,
            last_aqi: None,
            last_timestamp: None,
            last_fire_flag: None,
            show_history: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.has_detected_once {
            Phase::Detected
        } else {
            Phase::Idle
        }
    }

    pub fn can_notify(&self) -> bool {
        self.phase() == Phase::Detected
    }
}
