use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

pub const FIRE_AQI: RangeInclusive<u32> = 180..=350;
pub const CLEAR_AQI: RangeInclusive<u32> = 40..=120;

/// Fake air-quality estimate drawn uniformly from the fire or clear band.
pub fn estimate_aqi<R: Rng + ?Sized>(rng: &mut R, is_fire: bool) -> u32 {
    if is_fire {
        rng.gen_range(FIRE_AQI)
    } else {
        rng.gen_range(CLEAR_AQI)
    }
}

/// Five-step AQI ladder; each threshold is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Healthy,
    UnhealthySensitive,
    Moderate,
    Hazardous,
    Severe,
}

impl AqiCategory {
    pub fn classify(value: u32) -> Self {
        match value {
            v if v > 300 => AqiCategory::Severe,
            v if v > 250 => AqiCategory::Hazardous,
            v if v > 150 => AqiCategory::Moderate,
            v if v > 100 => AqiCategory::UnhealthySensitive,
            _ => AqiCategory::Healthy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Healthy => "Healthy",
            AqiCategory::UnhealthySensitive => "Unhealthy (Sensitive)",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Hazardous => "Hazardous",
            AqiCategory::Severe => "Severe",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn aqi_draws_respect_bands() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2_000 {
            assert!(FIRE_AQI.contains(&estimate_aqi(&mut rng, true)));
            assert!(CLEAR_AQI.contains(&estimate_aqi(&mut rng, false)));
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(AqiCategory::classify(100), AqiCategory::Healthy);
        assert_eq!(AqiCategory::classify(101), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::classify(150), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::classify(151), AqiCategory::Moderate);
        assert_eq!(AqiCategory::classify(250), AqiCategory::Moderate);
        assert_eq!(AqiCategory::classify(251), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::classify(300), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::classify(301), AqiCategory::Severe);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(AqiCategory::classify(0).to_string(), "Healthy");
        assert_eq!(
            AqiCategory::UnhealthySensitive.to_string(),
            "Unhealthy (Sensitive)"
        );
        assert_eq!(AqiCategory::Severe.label(), "Severe");
    }
}
