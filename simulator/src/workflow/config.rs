use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Where the dashboard reads its data and writes its logs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_file: PathBuf,
    pub alert_log: PathBuf,
    pub emergency_log: PathBuf,
    pub asset_dir: PathBuf,
    pub bind: SocketAddr,
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/punjab_fire_data.json"),
            alert_log: PathBuf::from("alerts_log.txt"),
            emergency_log: PathBuf::from("emergency_log.txt"),
            asset_dir: PathBuf::from("data"),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            seed: None,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Applies command-line overrides on top of file or default values.
    pub fn with_overrides(
        mut self,
        data_file: Option<PathBuf>,
        asset_dir: Option<PathBuf>,
        bind: Option<SocketAddr>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(data_file) = data_file {
            self.data_file = data_file;
        }
        if let Some(asset_dir) = asset_dir {
            self.asset_dir = asset_dir;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}
