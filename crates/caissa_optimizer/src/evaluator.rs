use std::ops::{Add, AddAssign};
use std::sync::Arc;

use fxhash::FxHashSet;

use crate::{
    genome::Genome,
    league::Gradation,
    schedule::{LOTS, ROUNDS, Schedule, Venue},
    team_cost_matrix::{TeamCostId, TeamCostMatrix},
};

/// Multiplier when a sub-group's gradation mix is off: the promoted plus
/// champion count must be exactly 2 and the relegated count exactly 1.
pub const GRADATION_PENALTY: f64 = 1.9;

/// Multiplier when two teams of the same club land in one sub-group.
pub const CLUB_PENALTY: f64 = 2.5;

/// Fixed mean denominator: rounds played per slot in one season.
const MEAN_ROUNDS: f64 = ROUNDS as f64 - 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TravelCosts {
    pub total_distance: f64,
    pub total_duration: f64,
    pub total_cost: f64,
}

impl Add for TravelCosts {
    type Output = TravelCosts;

    fn add(self, rhs: TravelCosts) -> TravelCosts {
        TravelCosts {
            total_distance: self.total_distance + rhs.total_distance,
            total_duration: self.total_duration + rhs.total_duration,
            total_cost: self.total_cost + rhs.total_cost,
        }
    }
}

impl AddAssign for TravelCosts {
    fn add_assign(&mut self, rhs: TravelCosts) {
        *self = *self + rhs;
    }
}

/// Sample standard deviation; fewer than two samples yields 0.0 so a
/// degenerate schedule shape cannot divide by zero.
fn sample_sd(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples
        .iter()
        .map(|sample| {
            let diff = sample - mean;
            diff * diff
        })
        .sum::<f64>()
        / (samples.len() - 1) as f64;

    variance.sqrt()
}

/// Scores genomes against the shared matrices and schedule template.
///
/// Holds only immutable shared state, so one evaluator can score many
/// genomes concurrently.
#[derive(Debug, Clone)]
pub struct Evaluator {
    matrix: Arc<TeamCostMatrix>,
    schedule: Arc<Schedule>,
}

impl Evaluator {
    pub fn new(matrix: Arc<TeamCostMatrix>, schedule: Arc<Schedule>) -> Self {
        Evaluator { matrix, schedule }
    }

    /// Scores one sub-group of [`LOTS`] teams as one application of the
    /// schedule template.
    ///
    /// Each slot accumulates the travel to its away opponents. A slot's
    /// contribution is `mean * sd` for distance and duration, where the
    /// mean spreads the slot's away travel over the season's rounds and
    /// the sd is taken over the individual away trips. Short and evenly
    /// spread away seasons score lowest.
    pub fn evaluate_group(&self, group: &[TeamCostId]) -> TravelCosts {
        assert_eq!(group.len(), LOTS, "a sub-group holds exactly {LOTS} teams");

        let mut costs = TravelCosts::default();

        for (lot, &team) in group.iter().enumerate() {
            let mut away_distances = Vec::with_capacity(ROUNDS);
            let mut away_durations = Vec::with_capacity(ROUNDS);

            for round in 0..ROUNDS {
                let fixture = self.schedule.fixture(lot, round);
                if fixture.venue != Venue::Away {
                    continue;
                }

                let cost = self.matrix.travel_cost(team, group[fixture.opponent]);
                away_distances.push(cost.distance_meters as f64);
                away_durations.push(cost.duration_seconds as f64);
            }

            let total_distance: f64 = away_distances.iter().sum();
            let total_duration: f64 = away_durations.iter().sum();

            let mean_distance = total_distance / MEAN_ROUNDS;
            let mean_duration = total_duration / MEAN_ROUNDS;

            costs.total_distance += total_distance;
            costs.total_duration += total_duration;
            costs.total_cost += mean_distance * sample_sd(&away_distances)
                + mean_duration * sample_sd(&away_durations);
        }

        let mut promoted_or_champion = 0;
        let mut relegated = 0;
        let mut clubs = FxHashSet::default();

        for &team in group {
            let info = self.matrix.info(team);
            match info.team.gradation {
                Gradation::Promoted | Gradation::Champion => promoted_or_champion += 1,
                Gradation::Relegated => relegated += 1,
                Gradation::Unchanged => {}
            }
            clubs.insert(info.team.club_id.as_str());
        }

        if promoted_or_champion != 2 || relegated != 1 {
            costs.total_cost *= GRADATION_PENALTY;
        }

        if clubs.len() != group.len() {
            costs.total_cost *= CLUB_PENALTY;
        }

        costs
    }

    /// Scores a full genome: the sum over its sub-groups of [`LOTS`]
    /// positions.
    pub fn evaluate(&self, genome: &Genome) -> TravelCosts {
        genome
            .values()
            .chunks_exact(LOTS)
            .map(|group| self.evaluate_group(group))
            .fold(TravelCosts::default(), |acc, group| acc + group)
    }
}
