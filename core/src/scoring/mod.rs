//! Stand-ins for the absent detection model: random confidence and AQI
//! draws, plus the deterministic AQI category ladder.

pub mod aqi;
pub mod confidence;

pub use aqi::{estimate_aqi, AqiCategory};
pub use confidence::{ai_confidence, percent};

/// Used when an emergency is raised before any scores exist.
pub const DEFAULT_CONFIDENCE: f64 = 0.90;
pub const DEFAULT_AQI: u32 = 260;
