use chrono::{DateTime, Utc};
use shared::{Coordinate, Preferences, RouteProfile, RouteStep, SafetyBand, SegmentPolyline};

use crate::{
    conditions::ConditionStore,
    forecast::predict,
    geometry::{assemble_path, path_length_m},
    network::RoadNetwork,
};

/// Floor on the effective segment speed, so a fully congested forecast can
/// never zero out (or invert) a travel time.
pub const MIN_EFFECTIVE_SPEED_KMH: f64 = 5.0;

/// Baseline weight each score criterion keeps when its preference is zero.
pub const BASE_CRITERION_WEIGHT: f64 = 0.5;
/// Scale of the crowding penalty at `avoid_busy = 1`.
pub const CROWD_PENALTY_SCALE: f64 = 0.8;
/// Travel time is scored relative to this many minutes.
pub const ETA_NORMALIZATION_MIN: f64 = 30.0;

/// Guard divisor for distance-weighted means on degenerate paths.
const MIN_WEIGHT_DENOMINATOR_M: f64 = 1.0;

const WELL_LIT_SAFETY: f64 = 75.0;
const LOW_VISIBILITY_SAFETY: f64 = 45.0;

/// A candidate route scored at one instant. Purely derived: recomputed from
/// the network, the condition snapshot, the forecast and the preferences on
/// every relevant change, never stored across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedRoute {
    pub profile: RouteProfile,
    pub path: Vec<Coordinate>,
    /// Start index of each segment within `path`; boundaries between
    /// consecutive segments are the maneuver anchors.
    pub segment_starts: Vec<usize>,
    pub steps: Vec<RouteStep>,
    pub polylines: Vec<SegmentPolyline>,
    pub distance_m: f64,
    pub eta_minutes: f64,
    pub avg_safety: f64,
    pub avg_crowd: f64,
    pub score: f64,
}

/// Score a candidate against the current conditions and preferences.
///
/// Per segment, in travel order:
/// - effective speed = base speed × live speed factor × forecast speed
///   factor, floored at [`MIN_EFFECTIVE_SPEED_KMH`]
/// - effective safety = base safety + live adjustment + forecast adjustment,
///   clamped to [0, 100]
/// - effective crowd = live crowd level
///
/// Aggregates are distance-weighted means, and the scalar score is a linear
/// utility: safety rewarded (more when `prefer_lit` is high), travel time
/// penalized (more when `comfort` is low), crowding penalized in proportion
/// to `avoid_busy`. `now` is sampled once per evaluation so every segment
/// sees the same forecast phase.
pub fn evaluate(
    network: &RoadNetwork,
    profile: RouteProfile,
    conditions: &ConditionStore,
    preferences: &Preferences,
    now: DateTime<Utc>,
) -> EvaluatedRoute {
    let segments = network.candidate_segments(profile);
    let assembled = assemble_path(segments.iter().map(|s| s.coords.as_slice()));

    let mut distance_m = 0.0;
    let mut total_hours = 0.0;
    let mut weighted_safety = 0.0;
    let mut weighted_crowd = 0.0;
    let mut steps = Vec::with_capacity(segments.len());
    let mut polylines = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let length_m = path_length_m(&segment.coords);
        let condition = conditions.get(&segment.id);
        let forecast = predict(segment, preferences.horizon_minutes, now);

        let effective_speed = (segment.base_speed_kmh
            * condition.speed_factor
            * forecast.speed_factor)
            .max(MIN_EFFECTIVE_SPEED_KMH);
        let effective_safety = (segment.base_safety
            + condition.safety_adjustment
            + forecast.safety_adjustment)
            .clamp(0.0, 100.0);
        let effective_crowd = condition.crowd;

        distance_m += length_m;
        total_hours += (length_m / 1000.0) / effective_speed;
        weighted_safety += effective_safety * length_m;
        weighted_crowd += effective_crowd * length_m;

        let instruction = if index == 0 {
            format!("Head onto {}", segment.street)
        } else {
            format!("Continue along {}", segment.street)
        };
        steps.push(RouteStep {
            instruction,
            street: segment.street.clone(),
            distance_m: length_m,
            safety: effective_safety,
            hazard_note: hazard_note(effective_safety),
        });
        polylines.push(SegmentPolyline {
            segment_id: segment.id.clone(),
            street: segment.street.clone(),
            band: SafetyBand::classify(effective_safety),
            coords: segment.coords.clone(),
        });
    }

    let weight = distance_m.max(MIN_WEIGHT_DENOMINATOR_M);
    let avg_safety = weighted_safety / weight;
    let avg_crowd = weighted_crowd / weight;
    let eta_minutes = total_hours * 60.0;
    let score = desirability(avg_safety, eta_minutes, avg_crowd, preferences);

    tracing::debug!(
        "evaluated {profile}: {distance_m:.0} m, {eta_minutes:.1} min, score {score:.3}"
    );

    EvaluatedRoute {
        profile,
        path: assembled.points,
        segment_starts: assembled.segment_starts,
        steps,
        polylines,
        distance_m,
        eta_minutes,
        avg_safety,
        avg_crowd,
        score,
    }
}

/// Linear desirability, higher is better.
pub fn desirability(
    avg_safety: f64,
    eta_minutes: f64,
    avg_crowd: f64,
    preferences: &Preferences,
) -> f64 {
    let safety_weight = BASE_CRITERION_WEIGHT + BASE_CRITERION_WEIGHT * preferences.prefer_lit;
    let time_weight = BASE_CRITERION_WEIGHT + BASE_CRITERION_WEIGHT * (1.0 - preferences.comfort);
    (avg_safety / 100.0) * safety_weight
        - (eta_minutes / ETA_NORMALIZATION_MIN) * time_weight
        - avg_crowd * preferences.avoid_busy * CROWD_PENALTY_SCALE
}

fn hazard_note(effective_safety: f64) -> Option<String> {
    if effective_safety >= WELL_LIT_SAFETY {
        Some("Well-lit area with cameras".to_string())
    } else if effective_safety <= LOW_VISIBILITY_SAFETY {
        Some("Low visibility, avoid late hours".to_string())
    } else {
        None
    }
}
