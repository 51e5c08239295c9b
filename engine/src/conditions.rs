use std::{collections::BTreeMap, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::network::RoadNetwork;

/// Reference refresh period for live conditions.
pub const CONDITION_TICK: Duration = Duration::from_secs(6);

pub const SPEED_FACTOR_MIN: f64 = 0.7;
pub const SPEED_FACTOR_MAX: f64 = 1.3;
pub const CROWD_MIN: f64 = 0.0;
pub const CROWD_MAX: f64 = 1.0;
pub const SAFETY_ADJUSTMENT_MIN: f64 = -20.0;
pub const SAFETY_ADJUSTMENT_MAX: f64 = 20.0;

const SPEED_FACTOR_STEP: f64 = 0.08;
const CROWD_STEP: f64 = 0.12;
const SAFETY_ADJUSTMENT_STEP: f64 = 4.0;

const NEUTRAL_CROWD: f64 = 0.3;

/// Live per-segment state. The store's tick is the only writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub speed_factor: f64,
    pub crowd: f64,
    pub safety_adjustment: f64,
}

impl Condition {
    pub const NEUTRAL: Condition = Condition {
        speed_factor: 1.0,
        crowd: NEUTRAL_CROWD,
        safety_adjustment: 0.0,
    };
}

/// One condition record per segment, nudged by a bounded random walk on each
/// tick. The walk is seeded, so a given seed replays the same weather.
#[derive(Debug, Clone)]
pub struct ConditionStore {
    conditions: BTreeMap<String, Condition>,
    rng: StdRng,
}

impl ConditionStore {
    pub fn new(network: &RoadNetwork, seed: u64) -> Self {
        let conditions = network
            .segments()
            .map(|segment| (segment.id.clone(), Condition::NEUTRAL))
            .collect();
        Self {
            conditions,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Perturb every segment's condition once. Each nudge builds on the
    /// previous value, clamped into its documented range.
    pub fn tick(&mut self) {
        for condition in self.conditions.values_mut() {
            condition.speed_factor = (condition.speed_factor
                + self.rng.gen_range(-SPEED_FACTOR_STEP..=SPEED_FACTOR_STEP))
            .clamp(SPEED_FACTOR_MIN, SPEED_FACTOR_MAX);
            condition.crowd = (condition.crowd + self.rng.gen_range(-CROWD_STEP..=CROWD_STEP))
                .clamp(CROWD_MIN, CROWD_MAX);
            condition.safety_adjustment = (condition.safety_adjustment
                + self
                    .rng
                    .gen_range(-SAFETY_ADJUSTMENT_STEP..=SAFETY_ADJUSTMENT_STEP))
            .clamp(SAFETY_ADJUSTMENT_MIN, SAFETY_ADJUSTMENT_MAX);
        }
        tracing::debug!(segments = self.conditions.len(), "conditions refreshed");
    }

    pub fn get(&self, segment_id: &str) -> Condition {
        self.conditions
            .get(segment_id)
            .copied()
            .unwrap_or(Condition::NEUTRAL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Condition)> {
        self.conditions.iter().map(|(id, c)| (id.as_str(), *c))
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, segment_id: &str, condition: Condition) {
        self.conditions.insert(segment_id.to_string(), condition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RoadNetwork;

    const SAMPLE: &str = include_str!("../data/network.json");

    fn store(seed: u64) -> ConditionStore {
        let network = RoadNetwork::from_reader(SAMPLE.as_bytes()).expect("sample network");
        ConditionStore::new(&network, seed)
    }

    #[test]
    fn starts_neutral_for_every_segment() {
        let store = store(1);
        for (_, condition) in store.iter() {
            assert_eq!(condition, Condition::NEUTRAL);
        }
    }

    #[test]
    fn stays_in_bounds_over_many_ticks() {
        let mut store = store(7);
        for _ in 0..500 {
            store.tick();
            for (id, condition) in store.iter() {
                assert!(
                    (SPEED_FACTOR_MIN..=SPEED_FACTOR_MAX).contains(&condition.speed_factor),
                    "{id}: speed factor {}",
                    condition.speed_factor
                );
                assert!(
                    (CROWD_MIN..=CROWD_MAX).contains(&condition.crowd),
                    "{id}: crowd {}",
                    condition.crowd
                );
                assert!(
                    (SAFETY_ADJUSTMENT_MIN..=SAFETY_ADJUSTMENT_MAX)
                        .contains(&condition.safety_adjustment),
                    "{id}: safety adjustment {}",
                    condition.safety_adjustment
                );
            }
        }
    }

    #[test]
    fn same_seed_replays_the_same_walk() {
        let mut a = store(42);
        let mut b = store(42);
        for _ in 0..25 {
            a.tick();
            b.tick();
        }
        let left: Vec<_> = a.iter().map(|(_, c)| c).collect();
        let right: Vec<_> = b.iter().map(|(_, c)| c).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn ticks_build_on_previous_values() {
        let mut store = store(3);
        store.tick();
        let after_one = store.get("B1");
        store.tick();
        let after_two = store.get("B1");
        // A walk, not a reset: the second value stays within one step of the first.
        assert!((after_two.speed_factor - after_one.speed_factor).abs() <= SPEED_FACTOR_STEP + 1e-12);
        assert!((after_two.crowd - after_one.crowd).abs() <= CROWD_STEP + 1e-12);
        assert!(
            (after_two.safety_adjustment - after_one.safety_adjustment).abs()
                <= SAFETY_ADJUSTMENT_STEP + 1e-12
        );
    }

    #[test]
    fn unknown_segment_reads_as_neutral() {
        let store = store(5);
        assert_eq!(store.get("Z9"), Condition::NEUTRAL);
    }
}
