use serde::{Deserialize, Serialize};

/// Travel distance and duration between one unordered pair of cities.
///
/// Exactly one record exists per pair. A pair of identical cities is
/// synthesized with zero cost downstream and never fetched from the
/// remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelInfo {
    pub city_pair: [String; 2],
    pub distance_meters: u64,
    pub duration_seconds: u64,
}
