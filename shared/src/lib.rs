use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Named route profiles. Declaration order is the tie-break order used when
/// two evaluated routes score identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProfile {
    Fastest,
    Safest,
    Balanced,
    Night,
    Female,
}

impl RouteProfile {
    pub const ALL: [RouteProfile; 5] = [
        RouteProfile::Fastest,
        RouteProfile::Safest,
        RouteProfile::Balanced,
        RouteProfile::Night,
        RouteProfile::Female,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RouteProfile::Fastest => "fastest",
            RouteProfile::Safest => "safest",
            RouteProfile::Balanced => "balanced",
            RouteProfile::Night => "night",
            RouteProfile::Female => "female",
        }
    }
}

impl std::fmt::Display for RouteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// User-set evaluation weights. Weights live in [0,1] and the forecast
/// horizon is at least one minute; `clamped` pulls any out-of-range control
/// input back to the nearest valid bound instead of rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_weight")]
    pub avoid_busy: f64,
    #[serde(default = "default_weight")]
    pub prefer_lit: f64,
    #[serde(default = "default_weight")]
    pub comfort: f64,
    #[serde(default = "default_horizon")]
    pub horizon_minutes: u32,
}

impl Preferences {
    pub fn clamped(self) -> Self {
        Self {
            avoid_busy: self.avoid_busy.clamp(0.0, 1.0),
            prefer_lit: self.prefer_lit.clamp(0.0, 1.0),
            comfort: self.comfort.clamp(0.0, 1.0),
            horizon_minutes: self.horizon_minutes.max(1),
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            avoid_busy: default_weight(),
            prefer_lit: default_weight(),
            comfort: default_weight(),
            horizon_minutes: default_horizon(),
        }
    }
}

pub fn default_weight() -> f64 {
    0.5
}

pub fn default_horizon() -> u32 {
    10
}

/// Display color band for a segment's effective safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyBand {
    High,
    Good,
    Medium,
    Low,
    Critical,
}

impl SafetyBand {
    pub fn classify(safety: f64) -> Self {
        if safety >= 80.0 {
            SafetyBand::High
        } else if safety >= 60.0 {
            SafetyBand::Good
        } else if safety >= 40.0 {
            SafetyBand::Medium
        } else if safety >= 20.0 {
            SafetyBand::Low
        } else {
            SafetyBand::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub street: String,
    pub distance_m: f64,
    pub safety: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPolyline {
    pub segment_id: String,
    pub street: String,
    pub band: SafetyBand,
    pub coords: Vec<Coordinate>,
}

/// Pending recommendation to switch away from the active profile. Both
/// deltas are non-negative: only the improving dimensions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub profile: RouteProfile,
    pub time_saved_min: f64,
    pub safety_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub anchor: Coordinate,
    pub instruction: String,
}

/// Everything the map surface needs to draw the active route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteView {
    pub profile: RouteProfile,
    pub path: Vec<Coordinate>,
    pub polylines: Vec<SegmentPolyline>,
    pub position: Coordinate,
    pub steps: Vec<RouteStep>,
    pub distance_m: f64,
    pub eta_minutes: f64,
    pub avg_safety: f64,
    pub avg_crowd: f64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maneuver: Option<Maneuver>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionMarker {
    pub id: String,
    pub coord: Coordinate,
}

/// Static overlay data: intersections and signal positions. Display only,
/// never consumed by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkView {
    pub intersections: Vec<IntersectionMarker>,
    pub signals: Vec<Coordinate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_weights_into_unit_interval() {
        let prefs = Preferences {
            avoid_busy: -0.4,
            prefer_lit: 1.7,
            comfort: 0.5,
            horizon_minutes: 0,
        }
        .clamped();
        assert_eq!(prefs.avoid_busy, 0.0);
        assert_eq!(prefs.prefer_lit, 1.0);
        assert_eq!(prefs.comfort, 0.5);
        assert_eq!(prefs.horizon_minutes, 1);
    }

    #[test]
    fn safety_bands_cover_five_ordered_ranges() {
        assert_eq!(SafetyBand::classify(92.0), SafetyBand::High);
        assert_eq!(SafetyBand::classify(80.0), SafetyBand::High);
        assert_eq!(SafetyBand::classify(79.9), SafetyBand::Good);
        assert_eq!(SafetyBand::classify(60.0), SafetyBand::Good);
        assert_eq!(SafetyBand::classify(45.0), SafetyBand::Medium);
        assert_eq!(SafetyBand::classify(20.0), SafetyBand::Low);
        assert_eq!(SafetyBand::classify(5.0), SafetyBand::Critical);
    }

    #[test]
    fn profile_keys_round_trip_through_json() {
        for profile in RouteProfile::ALL {
            let json = serde_json::to_string(&profile).unwrap();
            assert_eq!(json, format!("\"{profile}\""));
            let back: RouteProfile = serde_json::from_str(&json).unwrap();
            assert_eq!(back, profile);
        }
    }
}
