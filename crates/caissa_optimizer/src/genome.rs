use fixedbitset::FixedBitSet;
use rand::{Rng, seq::SliceRandom};

use crate::{
    league::{Class, League},
    schedule::LOTS,
    team_cost_matrix::{TeamCostId, TeamCostMatrix},
};

/// One class's contiguous range of genome positions and its member
/// teams.
#[derive(Debug, Clone)]
pub struct ClassGroup {
    pub class: Class,
    pub begin: usize,
    pub members: Vec<TeamCostId>,
}

impl ClassGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The class layout of the genome: contiguous per-class ranges in class
/// order, each further divided into sub-groups of [`LOTS`] positions.
#[derive(Debug, Clone)]
pub struct ClassGroups {
    groups: Vec<ClassGroup>,
    total: usize,
}

impl ClassGroups {
    pub fn from_league(league: &League, matrix: &TeamCostMatrix) -> Self {
        let mut groups = Vec::new();
        let mut position = 0;

        for class in Class::ALL {
            let members: Vec<TeamCostId> = league
                .class_teams(class)
                .map(|team| {
                    matrix
                        .cost_id(&team.id)
                        .expect("every league team has a cost id")
                })
                .collect();

            if members.is_empty() {
                continue;
            }

            let begin = position;
            position += members.len();
            groups.push(ClassGroup {
                class,
                begin,
                members,
            });
        }

        ClassGroups {
            groups,
            total: position,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassGroup> {
        self.groups.iter()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn group_of(&self, position: usize) -> &ClassGroup {
        debug_assert!(position < self.total);
        let ix = self
            .groups
            .partition_point(|group| group.begin <= position);

        &self.groups[ix - 1]
    }

    /// The half-open position range of the sub-group enclosing
    /// `position`: its class range divided into blocks of [`LOTS`].
    pub fn subgroup_bounds(&self, position: usize) -> (usize, usize) {
        let group = self.group_of(position);
        let block = (position - group.begin) / LOTS;
        let start = group.begin + block * LOTS;
        let end = (start + LOTS).min(group.begin + group.len());

        (start, end)
    }
}

/// One candidate season assignment: a permutation of all team cost ids.
///
/// Positions are segmented first by class (contiguous ranges in class
/// order) and then into sub-groups of [`LOTS`]; each sub-group is one
/// application of the round-robin schedule template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome(Vec<TeamCostId>);

impl Genome {
    pub fn from_values(values: Vec<TeamCostId>) -> Self {
        Genome(values)
    }

    /// Independently permutes every class's teams inside that class's
    /// reserved range.
    pub fn random(groups: &ClassGroups, rng: &mut impl Rng) -> Self {
        let mut values = Vec::with_capacity(groups.total());

        for group in groups.iter() {
            let mut members = group.members.clone();
            members.shuffle(rng);
            values.extend(members);
        }

        Genome(values)
    }

    pub fn values(&self) -> &[TeamCostId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One or two swaps, each confined to the sub-group enclosing a
    /// randomly picked position. Confinement keeps both the permutation
    /// and the per-class range invariants intact by construction.
    pub fn mutate(&mut self, groups: &ClassGroups, rng: &mut impl Rng) {
        debug_assert_eq!(self.0.len(), groups.total());

        let swaps = rng.random_range(1..=2);

        for _ in 0..swaps {
            let position = rng.random_range(0..self.0.len());
            let (start, end) = groups.subgroup_bounds(position);

            if end - start < 2 {
                continue;
            }

            let mut other = position;
            while other == position {
                other = rng.random_range(start..end);
            }

            self.0.swap(position, other);
        }
    }

    /// Order crossover (OX1) over the full vector.
    ///
    /// Two distinct cut positions are drawn, with the cut range wrapping
    /// around the end of the vector when the second falls before the
    /// first. Each child keeps its own parent's values outside the cut
    /// range and fills the inside positions, in index order, with the
    /// next unused value scanned from the other parent's start.
    ///
    /// This guarantees the permutation invariant but not the per-class
    /// range invariant; offspring rely on group-confined mutation and on
    /// selection pressure to restore class-pure sub-groups.
    pub fn crossover(&self, other: &Genome, rng: &mut impl Rng) -> (Genome, Genome) {
        debug_assert_eq!(self.0.len(), other.0.len());
        let len = self.0.len();

        let start = rng.random_range(0..len);
        let mut stop = rng.random_range(0..len);
        if stop == start {
            stop = (stop + 1) % len;
        }

        let inside = |ix: usize| {
            if start < stop {
                ix >= start && ix <= stop
            } else {
                ix >= start || ix <= stop
            }
        };

        (
            ox1_child(&self.0, &other.0, inside),
            ox1_child(&other.0, &self.0, inside),
        )
    }
}

fn ox1_child(
    keep: &[TeamCostId],
    donor: &[TeamCostId],
    inside: impl Fn(usize) -> bool,
) -> Genome {
    let mut child = keep.to_vec();

    let mut used = FixedBitSet::with_capacity(keep.len());
    for (ix, value) in keep.iter().enumerate() {
        if !inside(ix) {
            used.insert(value.get());
        }
    }

    let mut cursor = 0;
    for ix in 0..child.len() {
        if inside(ix) {
            while used.contains(donor[cursor].get()) {
                cursor += 1;
            }
            child[ix] = donor[cursor];
            used.insert(donor[cursor].get());
        }
    }

    Genome(child)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::test_support::two_class_league;

    fn assert_permutation(genome: &Genome, total: usize) {
        let mut seen = vec![false; total];
        for value in genome.values() {
            assert!(!seen[value.get()], "value {value} appears twice");
            seen[value.get()] = true;
        }
        assert_eq!(genome.len(), total);
    }

    #[test]
    fn random_genomes_are_class_segmented_permutations() {
        let (league, optimizer) = two_class_league(10, 10);
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..20 {
            let genome = optimizer.random_genome(&mut rng);
            assert_permutation(&genome, league.num_teams());

            for (position, &value) in genome.values().iter().enumerate() {
                let group = optimizer.groups().group_of(position);
                assert!(
                    group.members.contains(&value),
                    "position {position} holds a team outside its class"
                );
            }
        }
    }

    #[test]
    fn mutation_preserves_the_permutation() {
        let (league, optimizer) = two_class_league(10, 20);
        let mut rng = SmallRng::seed_from_u64(11);

        let mut genome = optimizer.random_genome(&mut rng);
        for _ in 0..500 {
            genome.mutate(optimizer.groups(), &mut rng);
        }

        assert_permutation(&genome, league.num_teams());
    }

    #[test]
    fn mutation_is_confined_to_sub_groups() {
        let (_, optimizer) = two_class_league(10, 20);
        let mut rng = SmallRng::seed_from_u64(13);

        let mut genome = optimizer.random_genome(&mut rng);

        // Remember the enclosing sub-group of every value.
        let block_of = |genome: &Genome| -> Vec<(TeamCostId, usize)> {
            genome
                .values()
                .iter()
                .enumerate()
                .map(|(position, &value)| {
                    (value, optimizer.groups().subgroup_bounds(position).0)
                })
                .collect()
        };

        let mut before = block_of(&genome);
        before.sort();

        for _ in 0..500 {
            genome.mutate(optimizer.groups(), &mut rng);
        }

        let mut after = block_of(&genome);
        after.sort();

        assert_eq!(before, after);
    }

    #[test]
    fn crossover_children_are_permutations() {
        let (league, optimizer) = two_class_league(10, 20);
        let mut rng = SmallRng::seed_from_u64(17);

        for _ in 0..50 {
            let x = optimizer.random_genome(&mut rng);
            let y = optimizer.random_genome(&mut rng);

            let (a, b) = x.crossover(&y, &mut rng);
            assert_permutation(&a, league.num_teams());
            assert_permutation(&b, league.num_teams());
        }
    }

    #[test]
    fn crossover_of_identical_parents_is_the_identity() {
        let (_, optimizer) = two_class_league(10, 0);
        let mut rng = SmallRng::seed_from_u64(19);

        for _ in 0..20 {
            let x = optimizer.random_genome(&mut rng);
            let (a, b) = x.crossover(&x, &mut rng);

            assert_eq!(a, x);
            assert_eq!(b, x);
        }
    }

    #[test]
    fn subgroup_bounds_follow_class_ranges() {
        let (_, optimizer) = two_class_league(10, 20);
        let groups = optimizer.groups();

        assert_eq!(groups.subgroup_bounds(0), (0, 10));
        assert_eq!(groups.subgroup_bounds(9), (0, 10));
        assert_eq!(groups.subgroup_bounds(10), (10, 20));
        assert_eq!(groups.subgroup_bounds(25), (20, 30));
    }
}
