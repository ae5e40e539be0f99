//! Pure rendering of a session into the fragments the dashboard displays.

use crate::district::DistrictTable;
use crate::scoring::{percent, AqiCategory, DEFAULT_AQI, DEFAULT_CONFIDENCE};
use crate::session::machine::Notice;
use crate::session::state::SessionState;
use crate::telemetry::LogSnapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TITLE: &str = "Satellite-based Stubble Fire Detection System";
pub const CAPTION: &str = "A GIS + AI prototype for monitoring crop residue burning in Punjab";
pub const FIRE_IMAGE: &str = "demo_fire.jpg";
pub const MAP_IMAGE: &str = "punjab_map.jpg";
const IMAGE_WIDTH: u32 = 420;
const MAP_ZOOM: u8 = 8;

/// Optional demo images, checked once at startup.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    pub fire_image: Option<PathBuf>,
    pub map_image: Option<PathBuf>,
}

impl AssetCatalog {
    pub fn discover<P: AsRef<Path>>(dir: P) -> Self {
        let existing = |name: &str| {
            let path = dir.as_ref().join(name);
            if path.is_file() {
                Some(path)
            } else {
                log::debug!("optional image {} not present", path.display());
                None
            }
        };
        Self {
            fire_image: existing(FIRE_IMAGE),
            map_image: existing(MAP_IMAGE),
        }
    }
}

/// Inputs to [`render`] besides the session itself.
pub struct RenderContext<'a> {
    pub table: &'a DistrictTable,
    pub assets: &'a AssetCatalog,
    /// Only consulted while the history viewer is open.
    pub history: Option<&'a LogSnapshot>,
    pub notices: &'a [Notice],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub title: String,
    pub caption: String,
    pub districts: Vec<String>,
    pub selected: String,
    pub notify_enabled: bool,
    pub metrics: Option<MetricsPanel>,
    pub detection: Option<DetectionPanel>,
    pub history: Option<HistoryPanel>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPanel {
    pub confidence_pct: u32,
    pub aqi: u32,
    pub aqi_category: AqiCategory,
}

impl MetricsPanel {
    pub fn aqi_summary(&self) -> String {
        format!("Estimated AQI: {} - {}", self.aqi, self.aqi_category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePanel {
    pub path: PathBuf,
    pub caption: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionPanel {
    Fire {
        headline: String,
        time: String,
        location: String,
        progress: u32,
        marker: MapMarker,
        image: Option<ImagePanel>,
        status: String,
    },
    Clear {
        headline: String,
        last_scan: String,
        image: Option<ImagePanel>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPanel {
    pub alerts: String,
    pub emergencies: String,
}

impl HistoryPanel {
    fn from_snapshot(snapshot: &LogSnapshot) -> Self {
        let alerts = match snapshot.alerts.as_deref().map(str::trim) {
            Some("") => "No alerts logged yet.".to_string(),
            Some(text) => text.to_string(),
            None => "No alert log yet. Run a detection first.".to_string(),
        };
        let emergencies = match snapshot.emergencies.as_deref().map(str::trim) {
            Some("") | None => "No emergency notifications sent yet.".to_string(),
            Some(text) => text.to_string(),
        };
        Self {
            alerts,
            emergencies,
        }
    }
}

/// Builds the view for `state`. Metrics and the detection panel appear only
/// after the first detection; the history panel only while it is open.
pub fn render(state: &SessionState, ctx: &RenderContext<'_>) -> DashboardView {
    let detected = state.has_detected_once;
    let record = ctx.table.get(&state.selected_district);

    let metrics = detected.then(|| {
        let aqi = state.last_aqi.unwrap_or(DEFAULT_AQI);
        MetricsPanel {
            confidence_pct: percent(state.last_confidence.unwrap_or(DEFAULT_CONFIDENCE)),
            aqi,
            aqi_category: AqiCategory::classify(aqi),
        }
    });

    let detection = match (detected, record) {
        (true, Some(record)) => {
            let district = &state.selected_district;
            let time = state
                .last_timestamp
                .clone()
                .unwrap_or_else(|| record.timestamp.clone());
            if state.last_fire_flag.unwrap_or(record.fire_detected) {
                Some(DetectionPanel::Fire {
                    headline: format!("Fire detected in {district}"),
                    time,
                    location: record.location.clone(),
                    progress: metrics.as_ref().map_or(0, |m| m.confidence_pct.min(100)),
                    marker: MapMarker {
                        lat: record.lat,
                        lon: record.lon,
                        zoom: MAP_ZOOM,
                        popup: format!("Fire in {district}"),
                    },
                    image: ctx.assets.fire_image.as_ref().map(|path| ImagePanel {
                        path: path.clone(),
                        caption: "Hotspot Detected (Demo)".into(),
                        width: IMAGE_WIDTH,
                    }),
                    status: "Alert queued to authority dashboard (demo)".into(),
                })
            } else {
                Some(DetectionPanel::Clear {
                    headline: format!("No fire detected in {district}"),
                    last_scan: time,
                    image: ctx.assets.map_image.as_ref().map(|path| ImagePanel {
                        path: path.clone(),
                        caption: "No active hotspots (Demo)".into(),
                        width: IMAGE_WIDTH,
                    }),
                })
            }
        }
        _ => None,
    };

    let history = if state.show_history {
        Some(HistoryPanel::from_snapshot(
            ctx.history.unwrap_or(&LogSnapshot::default()),
        ))
    } else {
        None
    };

    DashboardView {
        title: TITLE.into(),
        caption: CAPTION.into(),
        districts: ctx.table.names(),
        selected: state.selected_district.clone(),
        notify_enabled: state.can_notify(),
        metrics,
        detection,
        history,
        notices: ctx.notices.to_vec(),
    }
}
