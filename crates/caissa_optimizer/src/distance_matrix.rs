use caissa_matrix_providers::travel_info::TravelInfo;
use fxhash::FxHashMap;
use thiserror::Error;

use crate::define_id_newtype;

define_id_newtype!(CityId, City);

/// City ids are 8 bits wide.
pub const MAX_CITIES: usize = 256;

#[derive(Debug, Clone)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TravelCost {
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl TravelCost {
    pub const ZERO: TravelCost = TravelCost {
        distance_meters: 0,
        duration_seconds: 0,
    };
}

#[derive(Debug, Error)]
#[error("city registry full: the id space holds at most {MAX_CITIES} cities")]
pub struct CapacityError;

/// Rejected cache content. Same-city pairs are never fetched, so one in
/// a cache file means the file is corrupt.
#[derive(Debug, Error)]
pub enum DistanceMatrixError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("malformed travel entry: both endpoints are {0:?}")]
    SameCityPair(String),
}

/// Canonical rank of an unordered id pair in a dense triangular layout:
/// `rank(a, b) == rank(b, a)`, injective over all pairs of distinct ids,
/// and contiguous in `0..n*(n-1)/2` for ids below `n`.
pub fn pair_rank(a: usize, b: usize) -> usize {
    debug_assert_ne!(a, b);
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };

    hi * (hi - 1) / 2 + lo
}

/// Owns all cities and one travel entry per unordered city pair.
///
/// Ids are dense and assigned in first-seen order; pair storage is a flat
/// triangular array indexed by [`pair_rank`], so the total pair count is
/// a static function of the city count rather than a map size.
#[derive(Debug, Default)]
pub struct DistanceMatrix {
    cities: Vec<City>,
    city_index: FxHashMap<String, CityId>,
    costs: Vec<Option<TravelCost>>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        DistanceMatrix::default()
    }

    pub fn from_travel_info(entries: &[TravelInfo]) -> Result<Self, DistanceMatrixError> {
        let mut matrix = DistanceMatrix::new();

        for entry in entries {
            let [from, to] = &entry.city_pair;
            if from == to {
                return Err(DistanceMatrixError::SameCityPair(from.clone()));
            }

            let from = matrix.get_or_create_city(from)?;
            let to = matrix.get_or_create_city(to)?;

            matrix.record(
                from,
                to,
                TravelCost {
                    distance_meters: entry.distance_meters,
                    duration_seconds: entry.duration_seconds,
                },
            );
        }

        Ok(matrix)
    }

    /// Idempotent: a known name returns its existing id.
    pub fn get_or_create_city(&mut self, name: &str) -> Result<CityId, CapacityError> {
        if let Some(&id) = self.city_index.get(name) {
            return Ok(id);
        }

        if self.cities.len() == MAX_CITIES {
            return Err(CapacityError);
        }

        let id = CityId::new(self.cities.len() as u8);
        self.cities.push(City {
            id,
            name: name.to_string(),
        });
        self.city_index.insert(name.to_string(), id);

        let n = self.cities.len();
        self.costs.resize(n * (n - 1) / 2, None);

        Ok(id)
    }

    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id]
    }

    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.city_index.get(name).copied()
    }

    pub fn record(&mut self, a: CityId, b: CityId, cost: TravelCost) {
        debug_assert_ne!(a, b);
        self.costs[pair_rank(a.get(), b.get())] = Some(cost);
    }

    /// Canonical: `lookup(a, b) == lookup(b, a)`. A same-city pair is
    /// always zero cost.
    pub fn lookup(&self, a: CityId, b: CityId) -> Option<TravelCost> {
        if a == b {
            return Some(TravelCost::ZERO);
        }

        self.costs[pair_rank(a.get(), b.get())]
    }

    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.costs.iter().filter(|cost| cost.is_some()).count()
    }
}
