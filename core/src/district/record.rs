use serde::{Deserialize, Serialize};

/// Static satellite snapshot for one district, as stored in the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    pub fire_detected: bool,
    pub lat: f64,
    pub lon: f64,
    pub location: String,
    pub timestamp: String,
}

impl FireRecord {
    pub fn new(
        fire_detected: bool,
        lat: f64,
        lon: f64,
        location: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            fire_detected,
            lat,
            lon,
            location: location.into(),
            timestamp: timestamp.into(),
        }
    }
}
