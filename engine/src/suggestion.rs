use shared::{RouteProfile, Suggestion};

use crate::evaluator::EvaluatedRoute;

/// The best-scoring route, ties broken by position in the fixed enumeration
/// order (the slice is expected in `RouteProfile::ALL` order).
pub fn best_route(evaluated: &[EvaluatedRoute]) -> Option<&EvaluatedRoute> {
    let mut best: Option<&EvaluatedRoute> = None;
    for route in evaluated {
        match best {
            Some(current) if route.score <= current.score => {}
            _ => best = Some(route),
        }
    }
    best
}

/// Raise a switch recommendation when some non-active route strictly beats
/// the active one; clear it (return None) when the active route is already
/// the best. Only the improving dimensions are reported, so both deltas are
/// clamped to zero from below.
pub fn derive(evaluated: &[EvaluatedRoute], active: RouteProfile) -> Option<Suggestion> {
    let best = best_route(evaluated)?;
    if best.profile == active {
        return None;
    }
    let current = evaluated.iter().find(|route| route.profile == active)?;
    Some(Suggestion {
        profile: best.profile,
        time_saved_min: (current.eta_minutes - best.eta_minutes).max(0.0),
        safety_gain: (best.avg_safety - current.avg_safety).max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Coordinate;

    fn route(profile: RouteProfile, score: f64, eta_minutes: f64, avg_safety: f64) -> EvaluatedRoute {
        EvaluatedRoute {
            profile,
            path: vec![
                Coordinate { lat: 45.0, lon: 5.0 },
                Coordinate { lat: 45.01, lon: 5.01 },
            ],
            segment_starts: vec![0],
            steps: vec![],
            polylines: vec![],
            distance_m: 1000.0,
            eta_minutes,
            avg_safety,
            avg_crowd: 0.3,
            score,
        }
    }

    #[test]
    fn no_suggestion_when_active_is_best() {
        let evaluated = vec![
            route(RouteProfile::Fastest, 0.4, 5.0, 60.0),
            route(RouteProfile::Safest, 0.9, 8.0, 80.0),
        ];
        assert!(derive(&evaluated, RouteProfile::Safest).is_none());
    }

    #[test]
    fn suggests_the_strictly_better_route() {
        let evaluated = vec![
            route(RouteProfile::Fastest, 0.4, 5.0, 60.0),
            route(RouteProfile::Safest, 0.9, 8.0, 80.0),
        ];
        let suggestion = derive(&evaluated, RouteProfile::Fastest).expect("suggestion");
        assert_eq!(suggestion.profile, RouteProfile::Safest);
        // The better route is slower here: only the safety gain is reported.
        assert_eq!(suggestion.time_saved_min, 0.0);
        assert!((suggestion.safety_gain - 20.0).abs() < 1e-12);
    }

    #[test]
    fn deltas_are_never_negative() {
        let evaluated = vec![
            route(RouteProfile::Fastest, 0.8, 5.0, 90.0),
            route(RouteProfile::Safest, 0.9, 8.0, 70.0),
        ];
        let suggestion = derive(&evaluated, RouteProfile::Fastest).expect("suggestion");
        assert!(suggestion.time_saved_min >= 0.0);
        assert!(suggestion.safety_gain >= 0.0);
    }

    #[test]
    fn ties_go_to_the_first_declared_route() {
        let evaluated = vec![
            route(RouteProfile::Fastest, 0.5, 5.0, 60.0),
            route(RouteProfile::Safest, 0.5, 8.0, 80.0),
        ];
        let best = best_route(&evaluated).expect("best");
        assert_eq!(best.profile, RouteProfile::Fastest);
        // The tied active route is not asked to switch to itself.
        assert!(derive(&evaluated, RouteProfile::Fastest).is_none());
    }

    #[test]
    fn empty_evaluation_set_yields_nothing() {
        assert!(best_route(&[]).is_none());
        assert!(derive(&[], RouteProfile::Fastest).is_none());
    }
}
