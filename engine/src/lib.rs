pub mod conditions;
pub mod error;
pub mod evaluator;
pub mod forecast;
pub mod geometry;
pub mod network;
pub mod progress;
pub mod suggestion;

use std::path::Path;

use chrono::{DateTime, Utc};
use shared::{
    Coordinate, NetworkView, Preferences, RouteProfile, RouteView, Suggestion,
};

use crate::conditions::ConditionStore;
use crate::error::EngineError;
use crate::evaluator::{evaluate, EvaluatedRoute};
use crate::network::RoadNetwork;
use crate::progress::{Announcer, ProgressSimulator};

/// Long-lived simulation context: owns the sole mutable state (conditions,
/// progress, suggestion) and re-derives every evaluated route synchronously
/// whenever an input changes. An external scheduler drives the two `tick_*`
/// methods; nothing in here blocks.
pub struct Navigator {
    network: RoadNetwork,
    conditions: ConditionStore,
    preferences: Preferences,
    active: RouteProfile,
    evaluated: Vec<EvaluatedRoute>,
    suggestion: Option<Suggestion>,
    progress: ProgressSimulator,
    announcer: Option<Box<dyn Announcer>>,
}

impl Navigator {
    pub fn new(network: RoadNetwork, condition_seed: u64, now: DateTime<Utc>) -> Self {
        let conditions = ConditionStore::new(&network, condition_seed);
        let mut navigator = Self {
            network,
            conditions,
            preferences: Preferences::default(),
            active: RouteProfile::Balanced,
            evaluated: Vec::new(),
            suggestion: None,
            progress: ProgressSimulator::new(),
            announcer: None,
        };
        navigator.refresh(now);
        navigator
    }

    /// Build a navigator straight from a network definition file.
    pub fn from_file(
        path: impl AsRef<Path>,
        condition_seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let network = RoadNetwork::from_file(path)?;
        Ok(Self::new(network, condition_seed, now))
    }

    pub fn with_announcer(mut self, announcer: Box<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    pub fn active_profile(&self) -> RouteProfile {
        self.active
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn suggestion(&self) -> Option<Suggestion> {
        self.suggestion
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn evaluated_routes(&self) -> &[EvaluatedRoute] {
        &self.evaluated
    }

    /// Advance the live-condition walk one step and re-score everything.
    pub fn tick_conditions(&mut self, now: DateTime<Utc>) {
        self.conditions.tick();
        self.refresh(now);
    }

    /// Advance the simulated position along the active route. Fires at most
    /// one voice callout, and never fails: an absent or broken announcer is
    /// skipped.
    pub fn tick_progress(&mut self, now: DateTime<Utc>) {
        let route = &self.evaluated[active_slot(self.active)];
        if let Some(maneuver) = self.progress.tick(route, now) {
            match &self.announcer {
                Some(announcer) => {
                    if let Err(err) = announcer.announce(&maneuver.instruction) {
                        tracing::warn!(%err, "announcement dropped");
                    }
                }
                None => tracing::debug!(
                    instruction = %maneuver.instruction,
                    "no announcer attached, callout skipped"
                ),
            }
        }
    }

    /// Replace the preference weights (clamped into their domains) and
    /// re-score everything.
    pub fn set_preferences(&mut self, preferences: Preferences, now: DateTime<Utc>) {
        self.preferences = preferences.clamped();
        self.refresh(now);
    }

    pub fn set_horizon(&mut self, horizon_minutes: u32, now: DateTime<Utc>) {
        let preferences = Preferences {
            horizon_minutes,
            ..self.preferences
        };
        self.set_preferences(preferences, now);
    }

    /// Make `profile` the active candidate. Progress restarts from the top
    /// of the new route and all maneuver announcements re-arm.
    pub fn switch_profile(&mut self, profile: RouteProfile, now: DateTime<Utc>) {
        if profile == self.active {
            return;
        }
        tracing::info!(from = %self.active, to = %profile, "active route switched");
        self.active = profile;
        self.progress.reset();
        self.refresh(now);
    }

    /// Accept the pending suggestion, if any. Returns whether a switch
    /// happened.
    pub fn accept_suggestion(&mut self, now: DateTime<Utc>) -> bool {
        match self.suggestion {
            Some(suggestion) => {
                self.switch_profile(suggestion.profile, now);
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self, now: DateTime<Utc>) {
        self.evaluated = RouteProfile::ALL
            .iter()
            .map(|profile| {
                evaluate(
                    &self.network,
                    *profile,
                    &self.conditions,
                    &self.preferences,
                    now,
                )
            })
            .collect();

        let previous = self.suggestion;
        self.suggestion = suggestion::derive(&self.evaluated, self.active);
        match (previous, self.suggestion) {
            (None, Some(raised)) => tracing::info!(
                "better route available: {} (saves {:.1} min, +{:.1} safety)",
                raised.profile,
                raised.time_saved_min,
                raised.safety_gain
            ),
            (Some(_), None) => tracing::info!("route suggestion cleared"),
            _ => {}
        }
    }

    /// Rendering payload for the active route.
    pub fn active_view(&self) -> RouteView {
        let route = &self.evaluated[active_slot(self.active)];
        let position = simulated_position(route, self.progress.index());
        RouteView {
            profile: route.profile,
            path: route.path.clone(),
            polylines: route.polylines.clone(),
            position,
            steps: route.steps.clone(),
            distance_m: route.distance_m,
            eta_minutes: route.eta_minutes,
            avg_safety: route.avg_safety,
            avg_crowd: route.avg_crowd,
            score: route.score,
            suggestion: self.suggestion,
            next_maneuver: self.progress.next_maneuver(route),
        }
    }

    /// Static overlay payload: intersection markers and signal positions.
    pub fn network_view(&self) -> NetworkView {
        NetworkView {
            intersections: self
                .network
                .intersections()
                .iter()
                .map(|intersection| shared::IntersectionMarker {
                    id: intersection.id.clone(),
                    coord: intersection.coord,
                })
                .collect(),
            signals: self
                .network
                .segments()
                .flat_map(|segment| segment.signals.iter().copied())
                .collect(),
        }
    }
}

fn active_slot(profile: RouteProfile) -> usize {
    RouteProfile::ALL
        .iter()
        .position(|p| *p == profile)
        .expect("profile is part of the fixed enumeration")
}

fn simulated_position(route: &EvaluatedRoute, index: usize) -> Coordinate {
    route
        .path
        .get(index.min(route.path.len().saturating_sub(1)))
        .copied()
        .unwrap_or(Coordinate { lat: 0.0, lon: 0.0 })
}
