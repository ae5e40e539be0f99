use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use stubblecore::district::FireRecord;

/// District centroid and a representative block name.
struct DistrictSite {
    name: &'static str,
    lat: f64,
    lon: f64,
    location: &'static str,
}

const PUNJAB_SITES: &[DistrictSite] = &[
    DistrictSite { name: "Amritsar", lat: 31.634, lon: 74.872, location: "Ajnala" },
    DistrictSite { name: "Bathinda", lat: 30.211, lon: 74.945, location: "Talwandi Sabo" },
    DistrictSite { name: "Faridkot", lat: 30.674, lon: 74.756, location: "Jaitu" },
    DistrictSite { name: "Fatehgarh Sahib", lat: 30.649, lon: 76.392, location: "Sirhind" },
    DistrictSite { name: "Ferozepur", lat: 30.925, lon: 74.613, location: "Zira" },
    DistrictSite { name: "Gurdaspur", lat: 32.040, lon: 75.403, location: "Batala" },
    DistrictSite { name: "Hoshiarpur", lat: 31.532, lon: 75.917, location: "Dasuya" },
    DistrictSite { name: "Jalandhar", lat: 31.326, lon: 75.576, location: "Nakodar" },
    DistrictSite { name: "Kapurthala", lat: 31.380, lon: 75.380, location: "Sultanpur Lodhi" },
    DistrictSite { name: "Ludhiana", lat: 30.901, lon: 75.857, location: "Ludhiana Rural" },
    DistrictSite { name: "Mansa", lat: 29.998, lon: 75.393, location: "Budhlada" },
    DistrictSite { name: "Moga", lat: 30.817, lon: 75.172, location: "Baghapurana" },
    DistrictSite { name: "Muktsar", lat: 30.475, lon: 74.516, location: "Malout" },
    DistrictSite { name: "Patiala", lat: 30.340, lon: 76.386, location: "Rajpura" },
    DistrictSite { name: "Rupnagar", lat: 30.966, lon: 76.533, location: "Anandpur Sahib" },
    DistrictSite { name: "Sangrur", lat: 30.245, lon: 75.844, location: "Sunam" },
    DistrictSite { name: "Tarn Taran", lat: 31.451, lon: 74.927, location: "Patti" },
];

/// Controls for writing a demo district data file.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Probability that a district carries an active fire.
    pub fire_ratio: f64,
    /// Jitter, in degrees, applied around each district centroid.
    pub jitter_deg: f64,
    pub timestamp: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            fire_ratio: 0.5,
            jitter_deg: 0.05,
            timestamp: "2024-11-01 10:30:00".into(),
        }
    }
}

pub fn build_district_records(config: &GeneratorConfig) -> Vec<(String, FireRecord)> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let ratio = if config.fire_ratio.is_nan() {
        0.0
    } else {
        config.fire_ratio.clamp(0.0, 1.0)
    };
    let jitter = config.jitter_deg.abs();

    PUNJAB_SITES
        .iter()
        .map(|site| {
            let (dlat, dlon) = if jitter > 0.0 {
                (
                    rng.gen_range(-jitter..jitter),
                    rng.gen_range(-jitter..jitter),
                )
            } else {
                (0.0, 0.0)
            };
            let record = FireRecord::new(
                rng.gen_bool(ratio),
                round4(site.lat + dlat),
                round4(site.lon + dlon),
                site.location,
                config.timestamp.clone(),
            );
            (site.name.to_string(), record)
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Writes the generated table as a JSON object keyed by district name.
pub fn write_district_file<P: AsRef<Path>>(path: P, config: &GeneratorConfig) -> anyhow::Result<usize> {
    let path_ref = path.as_ref();
    let mut object = Map::new();
    for (name, record) in build_district_records(config) {
        object.insert(
            name,
            serde_json::to_value(&record).context("encoding district record")?,
        );
    }
    let count = object.len();
    let contents = serde_json::to_string_pretty(&Value::Object(object))
        .context("encoding district table")?;

    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path_ref, contents)
        .with_context(|| format!("writing district data {}", path_ref.display()))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubblecore::district::DistrictTable;
    use tempfile::tempdir;

    #[test]
    fn generator_covers_every_site() {
        let records = build_district_records(&GeneratorConfig::default());
        assert_eq!(records.len(), PUNJAB_SITES.len());
        assert_eq!(records[0].0, "Amritsar");
    }

    #[test]
    fn generator_respects_fire_ratio_extremes() {
        let all_fire = GeneratorConfig {
            fire_ratio: 1.0,
            ..Default::default()
        };
        assert!(build_district_records(&all_fire)
            .iter()
            .all(|(_, r)| r.fire_detected));

        let none = GeneratorConfig {
            fire_ratio: 0.0,
            ..Default::default()
        };
        assert!(build_district_records(&none)
            .iter()
            .all(|(_, r)| !r.fire_detected));
    }

    #[test]
    fn nan_fire_ratio_yields_no_fires() {
        let config = GeneratorConfig {
            fire_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(build_district_records(&config)
            .iter()
            .all(|(_, r)| !r.fire_detected));
    }

    #[test]
    fn same_seed_same_table() {
        let config = GeneratorConfig {
            seed: 21,
            ..Default::default()
        };
        assert_eq!(build_district_records(&config), build_district_records(&config));
    }

    #[test]
    fn written_file_loads_as_district_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("punjab_fire_data.json");
        let count = write_district_file(&path, &GeneratorConfig::default()).unwrap();
        let table = DistrictTable::load(&path).unwrap();
        assert_eq!(table.len(), count);
        assert_eq!(table.first(), "Amritsar");
        let ludhiana = table.get("Ludhiana").unwrap();
        assert!((ludhiana.lat - 30.901).abs() <= 0.05 + 1e-9);
    }
}
