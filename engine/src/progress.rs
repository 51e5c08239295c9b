use std::{collections::HashSet, time::Duration};

use chrono::{DateTime, Utc};
use shared::Maneuver;

use crate::{evaluator::EvaluatedRoute, geometry::path_length_m};

/// Reference advancement period for the simulated position.
pub const PROGRESS_TICK: Duration = Duration::from_millis(250);

/// A maneuver announces once its boundary is closer than this along the path.
pub const MANEUVER_PROXIMITY_M: f64 = 80.0;

#[derive(Debug, thiserror::Error)]
#[error("voice announcer unavailable: {0}")]
pub struct AnnounceError(pub String);

/// Fire-and-forget voice/notification collaborator. The engine tolerates it
/// being absent or failing; a failed callout is logged and dropped.
pub trait Announcer: Send + Sync {
    fn announce(&self, message: &str) -> Result<(), AnnounceError>;
}

/// Advances a simulated position along the active route and detects
/// approaching segment boundaries. Each boundary announces at most once;
/// switching the active route re-arms everything via [`reset`].
///
/// [`reset`]: ProgressSimulator::reset
#[derive(Debug, Default)]
pub struct ProgressSimulator {
    index: usize,
    last_update: Option<DateTime<Utc>>,
    announced: HashSet<usize>,
}

impl ProgressSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.last_update = None;
        self.announced.clear();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Advance one tick along `route` and return a maneuver callout if one
    /// just became due. The step size is chosen so the whole path is
    /// traversed in roughly the route's own estimated travel time.
    pub fn tick(&mut self, route: &EvaluatedRoute, now: DateTime<Utc>) -> Option<Maneuver> {
        let count = route.path.len();
        if count == 0 {
            return None;
        }

        let eta_ms = route.eta_minutes * 60_000.0;
        let ticks = (eta_ms / PROGRESS_TICK.as_millis() as f64).max(1.0);
        let step = ((count as f64 / ticks).round() as usize).max(1);
        self.index = (self.index + step).min(count - 1);
        self.last_update = Some(now);

        let (boundary, maneuver) = self.boundary_ahead(route)?;
        let remaining_m = path_length_m(&route.path[self.index..=boundary]);
        if remaining_m < MANEUVER_PROXIMITY_M && self.announced.insert(boundary) {
            tracing::info!(
                "maneuver due in {remaining_m:.0} m: {}",
                maneuver.instruction
            );
            return Some(maneuver);
        }
        None
    }

    /// The nearest segment boundary strictly ahead of the current position,
    /// for the on-map callout. Independent of announcement state.
    pub fn next_maneuver(&self, route: &EvaluatedRoute) -> Option<Maneuver> {
        self.boundary_ahead(route).map(|(_, maneuver)| maneuver)
    }

    fn boundary_ahead(&self, route: &EvaluatedRoute) -> Option<(usize, Maneuver)> {
        for (step_index, &start) in route.segment_starts.iter().enumerate().skip(1) {
            if start > self.index {
                let maneuver = Maneuver {
                    anchor: route.path[start],
                    instruction: route.steps[step_index].instruction.clone(),
                };
                return Some((start, maneuver));
            }
        }
        None
    }
}
