use rand::Rng;
use std::ops::RangeInclusive;

pub const FIRE_CONFIDENCE: RangeInclusive<f64> = 0.86..=0.97;
pub const CLEAR_CONFIDENCE: RangeInclusive<f64> = 0.15..=0.35;

/// Fake model confidence, rounded to two decimals.
pub fn ai_confidence<R: Rng + ?Sized>(rng: &mut R, is_fire: bool) -> f64 {
    let range = if is_fire {
        FIRE_CONFIDENCE
    } else {
        CLEAR_CONFIDENCE
    };
    let raw = rng.gen_range(range);
    (raw * 100.0).round() / 100.0
}

/// Whole-number percentage shown on screen and written into the logs.
pub fn percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().max(0.0) as u32
}
