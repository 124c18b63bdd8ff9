use fxhash::FxHashMap;
use thiserror::Error;

use crate::{
    define_id_newtype,
    distance_matrix::{DistanceMatrix, TravelCost, pair_rank},
    league::{League, MAX_TEAMS, Team},
};

define_id_newtype!(TeamCostId, TeamCostInfo);

/// A team together with its dense cost id and resolved club city.
#[derive(Debug, Clone)]
pub struct TeamCostInfo {
    pub cost_id: TeamCostId,
    pub team: Team,
    pub city: String,
}

#[derive(Debug, Error)]
pub enum TeamCostError {
    #[error("unknown team id {0}")]
    UnknownTeam(String),

    #[error("no city {city:?} in the distance matrix (club {club})")]
    UnknownCity { club: String, city: String },

    #[error("no travel information for city pair ({0}, {1})")]
    MissingPair(String, String),

    #[error("cost id space exhausted: the id space holds at most {MAX_TEAMS} teams")]
    Capacity,
}

/// Projects the distance matrix into a per-team-pair cost lookup.
///
/// Cost ids are dense, assigned in first-seen order while walking team
/// pairs in lexical team-id order, and bijective with the teams' natural
/// string ids. Built once and read-only afterwards; the triangular pair
/// storage is total, so evaluation-time lookups cannot miss.
#[derive(Debug)]
pub struct TeamCostMatrix {
    teams: Vec<TeamCostInfo>,
    cost_index: FxHashMap<String, TeamCostId>,
    costs: Vec<TravelCost>,
}

impl TeamCostMatrix {
    pub fn build(league: &League, distances: &DistanceMatrix) -> Result<Self, TeamCostError> {
        let mut ordered: Vec<&Team> = league.teams().iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let n = ordered.len();
        if n > MAX_TEAMS {
            return Err(TeamCostError::Capacity);
        }

        let mut matrix = TeamCostMatrix {
            teams: Vec::with_capacity(n),
            cost_index: FxHashMap::default(),
            costs: vec![TravelCost::ZERO; n * n.saturating_sub(1) / 2],
        };

        for team in &ordered {
            let city = league.club_of(team).city.clone();
            let cost_id = TeamCostId::new(matrix.teams.len() as u8);
            matrix.cost_index.insert(team.id.clone(), cost_id);
            matrix.teams.push(TeamCostInfo {
                cost_id,
                team: (*team).clone(),
                city,
            });
        }

        for from in 0..n {
            for to in from + 1..n {
                let from_info = &matrix.teams[from];
                let to_info = &matrix.teams[to];

                let from_city = distances.city_id(&from_info.city).ok_or_else(|| {
                    TeamCostError::UnknownCity {
                        club: from_info.team.club_id.clone(),
                        city: from_info.city.clone(),
                    }
                })?;
                let to_city = distances.city_id(&to_info.city).ok_or_else(|| {
                    TeamCostError::UnknownCity {
                        club: to_info.team.club_id.clone(),
                        city: to_info.city.clone(),
                    }
                })?;

                // Same city means zero cost by design; any other absent
                // pair is an acquisition invariant violation.
                let cost = distances.lookup(from_city, to_city).ok_or_else(|| {
                    TeamCostError::MissingPair(from_info.city.clone(), to_info.city.clone())
                })?;

                matrix.costs[pair_rank(from, to)] = cost;
            }
        }

        Ok(matrix)
    }

    /// Canonical and total: `travel_cost(a, b) == travel_cost(b, a)` for
    /// every pair of ids issued by this matrix.
    pub fn travel_cost(&self, a: TeamCostId, b: TeamCostId) -> TravelCost {
        if a == b {
            return TravelCost::ZERO;
        }

        self.costs[pair_rank(a.get(), b.get())]
    }

    pub fn cost_id(&self, team_id: &str) -> Option<TeamCostId> {
        self.cost_index.get(team_id).copied()
    }

    pub fn info(&self, id: TeamCostId) -> &TeamCostInfo {
        &self.teams[id]
    }

    pub fn team(&self, id: TeamCostId) -> &Team {
        &self.teams[id].team
    }

    pub fn cost_ids(&self) -> impl Iterator<Item = TeamCostId> {
        self.teams.iter().map(|info| info.cost_id)
    }

    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }

    /// Resolves natural team ids supplied by external callers.
    pub fn translate_team_ids<S: AsRef<str>>(
        &self,
        team_ids: &[S],
    ) -> Result<Vec<TeamCostId>, TeamCostError> {
        team_ids
            .iter()
            .map(|id| {
                self.cost_id(id.as_ref())
                    .ok_or_else(|| TeamCostError::UnknownTeam(id.as_ref().to_string()))
            })
            .collect()
    }
}
