use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::{
    evaluator::{Evaluator, TravelCosts},
    genome::{ClassGroups, Genome},
    league::League,
    schedule::{LOTS, Schedule},
    team_cost_matrix::{TeamCostId, TeamCostMatrix},
};

/// Binds the team cost matrix, the schedule template and the league's
/// class layout into one context for genome generation, variation and
/// scoring.
///
/// All held state is immutable after construction; a shared reference
/// can serve concurrent evaluations.
#[derive(Debug)]
pub struct Optimizer {
    matrix: Arc<TeamCostMatrix>,
    groups: ClassGroups,
    evaluator: Evaluator,
}

impl Optimizer {
    pub fn new(matrix: Arc<TeamCostMatrix>, schedule: Arc<Schedule>, league: &League) -> Self {
        let groups = ClassGroups::from_league(league, &matrix);
        let evaluator = Evaluator::new(Arc::clone(&matrix), schedule);

        Optimizer {
            matrix,
            groups,
            evaluator,
        }
    }

    pub fn groups(&self) -> &ClassGroups {
        &self.groups
    }

    pub fn matrix(&self) -> &TeamCostMatrix {
        &self.matrix
    }

    pub fn random_genome(&self, rng: &mut impl Rng) -> Genome {
        Genome::random(&self.groups, rng)
    }

    pub fn mutate(&self, genome: &mut Genome, rng: &mut impl Rng) {
        genome.mutate(&self.groups, rng);
    }

    pub fn crossover(&self, x: &Genome, y: &Genome, rng: &mut impl Rng) -> (Genome, Genome) {
        x.crossover(y, rng)
    }

    pub fn evaluate(&self, genome: &Genome) -> TravelCosts {
        self.evaluator.evaluate(genome)
    }

    pub fn evaluate_group(&self, group: &[TeamCostId]) -> TravelCosts {
        self.evaluator.evaluate_group(group)
    }

    /// The minimization objective.
    pub fn fitness(&self, genome: &Genome) -> f64 {
        self.evaluator.evaluate(genome).total_cost
    }

    /// Logs each position's team metadata, one sub-group per block.
    pub fn describe(&self, genome: &Genome) {
        for (position, &id) in genome.values().iter().enumerate() {
            if position % LOTS == 0 {
                info!("");
            }

            let info = self.matrix.info(id);
            info!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                info.cost_id,
                info.team.class,
                info.team.gradation,
                info.team.id,
                pad(&info.city, 18),
                pad(&info.team.name, 18),
                info.team.club_id,
            );
        }
    }
}

/// Truncates or right-pads to exactly `width` characters.
fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}
