use shared::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates (haversine).
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Sum of consecutive-pair distances; 0 for fewer than two points.
pub fn path_length_m(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| distance_m(w[0], w[1])).sum()
}

/// Candidate path concatenated from segment polylines, with the start index
/// of each segment recorded for maneuver lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPath {
    pub points: Vec<Coordinate>,
    pub segment_starts: Vec<usize>,
}

/// Concatenate segment polylines in travel order. When a segment starts on
/// the exact point the previous one ended on, the duplicate is dropped so
/// junctions are not double-counted. Segments that do not share an endpoint
/// are joined by a straight synthetic edge rather than rejected.
pub fn assemble_path<'a>(pieces: impl IntoIterator<Item = &'a [Coordinate]>) -> AssembledPath {
    let mut points: Vec<Coordinate> = Vec::new();
    let mut segment_starts = Vec::new();

    for piece in pieces {
        let joined = matches!(
            (points.last(), piece.first()),
            (Some(last), Some(first)) if last == first
        );
        let start = if joined {
            points.len() - 1
        } else {
            points.len()
        };
        segment_starts.push(start);
        let skip = usize::from(joined);
        points.extend_from_slice(&piece[skip.min(piece.len())..]);
    }

    AssembledPath {
        points,
        segment_starts,
    }
}
