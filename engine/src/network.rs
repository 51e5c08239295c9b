use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{self, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};
use shared::{Coordinate, RouteProfile};

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to read network file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid network definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("network has no streets")]
    EmptyNetwork,
    #[error("segment {0} needs at least two coordinates")]
    DegenerateSegment(String),
    #[error("segment id {0} appears more than once")]
    DuplicateSegment(String),
    #[error("segment {id} is invalid: {reason}")]
    InvalidSegment { id: String, reason: String },
    #[error("candidate {profile} references unknown segment {id}")]
    UnknownSegment { profile: RouteProfile, id: String },
    #[error("no candidate defined for profile {0}")]
    MissingCandidate(RouteProfile),
}

/// Street classification used by the predictive model's lighting penalty.
/// An explicit attribute: segment ids carry no meaning beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreetCategory {
    Arterial,
    Collector,
    Local,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub id: String,
    pub street: String,
    pub category: StreetCategory,
    pub coords: Vec<Coordinate>,
    pub base_speed_kmh: f64,
    pub base_safety: f64,
    pub lanes: u32,
    pub signals: Vec<Coordinate>,
}

#[derive(Debug, Clone)]
pub struct Street {
    pub id: String,
    pub name: String,
    pub category: StreetCategory,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub struct Intersection {
    pub id: String,
    pub coord: Coordinate,
}

/// Serde records for the on-disk network definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkFile {
    pub streets: Vec<StreetRecord>,
    #[serde(default)]
    pub intersections: Vec<IntersectionRecord>,
    pub candidates: BTreeMap<RouteProfile, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetRecord {
    pub id: String,
    pub name: String,
    pub category: StreetCategory,
    pub segments: Vec<SegmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: String,
    pub coords: Vec<Coordinate>,
    pub base_speed_kmh: f64,
    pub base_safety: f64,
    pub lanes: u32,
    #[serde(default)]
    pub signals: Vec<Coordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionRecord {
    pub id: String,
    pub coord: Coordinate,
}

/// Index of a segment inside the network (street position, segment position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentRef(usize, usize);

/// Immutable road network plus the fixed candidate table. Built once at
/// startup, shared read-only by every other component.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    streets: Vec<Street>,
    intersections: Vec<Intersection>,
    candidates: Vec<Vec<SegmentRef>>,
}

impl RoadNetwork {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, NetworkError> {
        let network_file: NetworkFile = serde_json::from_reader(reader)?;
        Self::from_network_file(network_file)
    }

    pub fn from_network_file(file: NetworkFile) -> Result<Self, NetworkError> {
        if file.streets.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }

        let mut streets = Vec::with_capacity(file.streets.len());
        let mut index: HashMap<String, SegmentRef> = HashMap::new();

        for (street_idx, record) in file.streets.into_iter().enumerate() {
            let mut segments = Vec::with_capacity(record.segments.len());
            for (segment_idx, seg) in record.segments.into_iter().enumerate() {
                validate_segment(&seg)?;
                if index
                    .insert(seg.id.clone(), SegmentRef(street_idx, segment_idx))
                    .is_some()
                {
                    return Err(NetworkError::DuplicateSegment(seg.id));
                }
                segments.push(Segment {
                    id: seg.id,
                    street: record.name.clone(),
                    category: record.category,
                    coords: seg.coords,
                    base_speed_kmh: seg.base_speed_kmh,
                    base_safety: seg.base_safety,
                    lanes: seg.lanes,
                    signals: seg.signals,
                });
            }
            streets.push(Street {
                id: record.id,
                name: record.name,
                category: record.category,
                segments,
            });
        }

        let mut candidates = Vec::with_capacity(RouteProfile::ALL.len());
        for profile in RouteProfile::ALL {
            let ids = file
                .candidates
                .get(&profile)
                .ok_or(NetworkError::MissingCandidate(profile))?;
            let mut refs = Vec::with_capacity(ids.len());
            for id in ids {
                let segment_ref =
                    *index
                        .get(id)
                        .ok_or_else(|| NetworkError::UnknownSegment {
                            profile,
                            id: id.clone(),
                        })?;
                refs.push(segment_ref);
            }
            candidates.push(refs);
        }

        let intersections = file
            .intersections
            .into_iter()
            .map(|record| Intersection {
                id: record.id,
                coord: record.coord,
            })
            .collect();

        Ok(Self {
            streets,
            intersections,
            candidates,
        })
    }

    /// Segments of a candidate in travel order.
    pub fn candidate_segments(&self, profile: RouteProfile) -> Vec<&Segment> {
        let slot = RouteProfile::ALL
            .iter()
            .position(|p| *p == profile)
            .expect("profile is part of the fixed enumeration");
        self.candidates[slot]
            .iter()
            .map(|SegmentRef(street, segment)| &self.streets[*street].segments[*segment])
            .collect()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.streets.iter().flat_map(|street| street.segments.iter())
    }

    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }
}

fn validate_segment(seg: &SegmentRecord) -> Result<(), NetworkError> {
    if seg.coords.len() < 2 {
        return Err(NetworkError::DegenerateSegment(seg.id.clone()));
    }
    if !(seg.base_speed_kmh > 0.0) {
        return Err(NetworkError::InvalidSegment {
            id: seg.id.clone(),
            reason: format!("base speed must be positive, got {}", seg.base_speed_kmh),
        });
    }
    if !(0.0..=100.0).contains(&seg.base_safety) {
        return Err(NetworkError::InvalidSegment {
            id: seg.id.clone(),
            reason: format!("base safety must be in [0,100], got {}", seg.base_safety),
        });
    }
    if seg.lanes < 1 {
        return Err(NetworkError::InvalidSegment {
            id: seg.id.clone(),
            reason: "segment needs at least one lane".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../data/network.json");

    fn network() -> RoadNetwork {
        RoadNetwork::from_reader(SAMPLE.as_bytes()).expect("sample network")
    }

    #[test]
    fn loads_the_bundled_network() {
        let network = network();
        assert!(network.streets().len() >= 3);
        assert!(network.segments().count() >= 6);
        assert!(!network.intersections().is_empty());
    }

    #[test]
    fn every_profile_resolves_to_segments() {
        let network = network();
        for profile in RouteProfile::ALL {
            let segments = network.candidate_segments(profile);
            assert!(!segments.is_empty(), "{profile} has no segments");
            for segment in segments {
                assert!(segment.coords.len() >= 2);
            }
        }
    }

    #[test]
    fn rejects_an_empty_street_set() {
        let file = NetworkFile {
            streets: vec![],
            intersections: vec![],
            candidates: BTreeMap::new(),
        };
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::EmptyNetwork)
        ));
    }

    #[test]
    fn rejects_a_single_point_segment() {
        let mut file: NetworkFile = serde_json::from_str(SAMPLE).unwrap();
        file.streets[0].segments[0].coords.truncate(1);
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::DegenerateSegment(_))
        ));
    }

    #[test]
    fn rejects_duplicate_segment_ids() {
        let mut file: NetworkFile = serde_json::from_str(SAMPLE).unwrap();
        let clone = file.streets[0].segments[0].clone();
        file.streets[0].segments.push(clone);
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::DuplicateSegment(_))
        ));
    }

    #[test]
    fn rejects_candidates_with_unknown_segments() {
        let mut file: NetworkFile = serde_json::from_str(SAMPLE).unwrap();
        file.candidates
            .get_mut(&RouteProfile::Fastest)
            .unwrap()
            .push("Z9".into());
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::UnknownSegment { .. })
        ));
    }

    #[test]
    fn rejects_a_missing_candidate_table_entry() {
        let mut file: NetworkFile = serde_json::from_str(SAMPLE).unwrap();
        file.candidates.remove(&RouteProfile::Night);
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::MissingCandidate(RouteProfile::Night))
        ));
    }

    #[test]
    fn rejects_non_positive_base_speed() {
        let mut file: NetworkFile = serde_json::from_str(SAMPLE).unwrap();
        file.streets[0].segments[0].base_speed_kmh = 0.0;
        assert!(matches!(
            RoadNetwork::from_network_file(file),
            Err(NetworkError::InvalidSegment { .. })
        ));
    }
}
