use std::f64::consts::{FRAC_PI_3, TAU};

use chrono::{DateTime, Utc};

use crate::network::{Segment, StreetCategory};

/// Predicted speed multiplier never drops below this, however long the
/// horizon.
pub const FORECAST_SPEED_FLOOR: f64 = 0.7;

/// Congestion wave period. Two segments with different phase seeds peak at
/// different points of this cycle.
const PHASE_PERIOD_SECS: f64 = 900.0;

const CONGESTION_PER_HORIZON_MIN: f64 = 0.012;
const RISK_PER_HORIZON_MIN: f64 = 0.35;

const ARTERIAL_LIGHTING_PENALTY: f64 = 8.0;
const COLLECTOR_LIGHTING_PENALTY: f64 = 3.0;

/// Expected segment conditions `horizon` minutes ahead of `now`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub speed_factor: f64,
    pub safety_adjustment: f64,
}

/// Forecast conditions for a segment, independent of the live store.
///
/// A smooth periodic phase is derived from the wall clock and a per-segment
/// seed, so two calls with the same `(segment, horizon, now)` agree exactly.
/// Longer horizons amplify both the predicted congestion (speed factor drops
/// toward the floor) and the predicted risk (safety penalty grows). Streets
/// classified as arterial or collector carry an additional fixed lighting
/// penalty, independent of horizon.
pub fn predict(segment: &Segment, horizon_minutes: u32, now: DateTime<Utc>) -> Forecast {
    let phase = (now.timestamp() as f64 / PHASE_PERIOD_SECS) * TAU + phase_seed(&segment.id);
    let congestion_wave = 0.5 * (1.0 + phase.sin());
    let risk_wave = 0.5 * (1.0 + (phase + FRAC_PI_3).cos());
    let horizon = f64::from(horizon_minutes);

    let speed_factor =
        (1.0 - congestion_wave * CONGESTION_PER_HORIZON_MIN * horizon).max(FORECAST_SPEED_FLOOR);
    let safety_adjustment =
        -(risk_wave * RISK_PER_HORIZON_MIN * horizon) - lighting_penalty(segment.category);

    Forecast {
        speed_factor,
        safety_adjustment,
    }
}

fn lighting_penalty(category: StreetCategory) -> f64 {
    match category {
        StreetCategory::Arterial => ARTERIAL_LIGHTING_PENALTY,
        StreetCategory::Collector => COLLECTOR_LIGHTING_PENALTY,
        StreetCategory::Local => 0.0,
    }
}

/// Stable per-segment phase offset in [0, 2π).
fn phase_seed(segment_id: &str) -> f64 {
    let hash = segment_id
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    (hash % 6_283) as f64 / 1_000.0
}
