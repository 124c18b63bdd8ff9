//! Shared fixtures for the crate's unit tests.

use std::sync::Arc;

use crate::{
    distance_matrix::{DistanceMatrix, TravelCost},
    evaluator::Evaluator,
    league::{Class, Club, Gradation, League, Team},
    optimizer::Optimizer,
    schedule::{LOTS, ROUNDS, Schedule},
    team_cost_matrix::TeamCostMatrix,
};

/// A valid signed round-robin table, built with the circle method: lot
/// 10 stays fixed while lots 1..=9 rotate. The lexically-first lot of
/// each pairing hosts.
pub fn round_robin_table() -> [[i8; ROUNDS]; LOTS] {
    let mut table = [[0i8; ROUNDS]; LOTS];

    let mut set = |round: usize, home: usize, away: usize| {
        table[home][round] = (away + 1) as i8;
        table[away][round] = -((home + 1) as i8);
    };

    for round in 0..ROUNDS {
        set(round, round % (LOTS - 1), LOTS - 1);
        for k in 1..LOTS / 2 {
            let a = (round + k) % (LOTS - 1);
            let b = (round + LOTS - 1 - k) % (LOTS - 1);
            set(round, a.min(b), a.max(b));
        }
    }

    table
}

pub fn schedule() -> Schedule {
    match Schedule::from_table(&round_robin_table()) {
        Ok(schedule) => schedule,
        Err(err) => panic!("fixture table must be valid: {err}"),
    }
}

/// Builds a Master-class league from `(team_id, club_id, city,
/// gradation)` rows. Club and team names are derived from the ids.
pub fn league_of(rows: &[(&str, &str, &str, Gradation)]) -> League {
    let mut league = League::new();

    for &(team_id, club_id, city, gradation) in rows {
        league.add_club(Club {
            id: club_id.to_string(),
            name: format!("Club {club_id}"),
            city: city.to_string(),
        });
        let added = league.add_team(Team {
            id: team_id.to_string(),
            name: format!("Team {team_id}"),
            class: Class::Master,
            gradation,
            club_id: club_id.to_string(),
        });
        if let Err(err) = added {
            panic!("fixture roster must be valid: {err}");
        }
    }

    league
}

/// A synthetic distance matrix covering every city of the league:
/// cities sorted by name, pair cost proportional to the rank gap.
pub fn distances_for(league: &League) -> DistanceMatrix {
    let cities = league.unique_cities();
    let mut matrix = DistanceMatrix::new();

    let ids: Vec<_> = cities
        .iter()
        .map(|city| match matrix.get_or_create_city(city) {
            Ok(id) => id,
            Err(err) => panic!("fixture city set must fit: {err}"),
        })
        .collect();

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let gap = (j - i) as u64;
            matrix.record(
                ids[i],
                ids[j],
                TravelCost {
                    distance_meters: gap * 1000,
                    duration_seconds: gap * 60,
                },
            );
        }
    }

    matrix
}

pub fn evaluator_for(league: &League) -> (Arc<TeamCostMatrix>, Evaluator) {
    let distances = distances_for(league);
    let matrix = match TeamCostMatrix::build(league, &distances) {
        Ok(matrix) => Arc::new(matrix),
        Err(err) => panic!("fixture matrix must build: {err}"),
    };
    let evaluator = Evaluator::new(Arc::clone(&matrix), Arc::new(schedule()));

    (matrix, evaluator)
}

/// A league with `masters` Master-class teams and `firsts` First-class
/// teams, each team its own club in its own city, wrapped in a ready
/// optimizer.
pub fn two_class_league(masters: usize, firsts: usize) -> (League, Optimizer) {
    let mut league = League::new();

    for ix in 0..masters + firsts {
        let class = if ix < masters {
            Class::Master
        } else {
            Class::First
        };
        let team_id = format!("t{ix:03}");
        let club_id = format!("c{ix:03}");

        league.add_club(Club {
            id: club_id.clone(),
            name: format!("Club {club_id}"),
            city: format!("city{ix:03}"),
        });
        let added = league.add_team(Team {
            id: team_id.clone(),
            name: format!("Team {team_id}"),
            class,
            gradation: Gradation::Unchanged,
            club_id,
        });
        if let Err(err) = added {
            panic!("fixture roster must be valid: {err}");
        }
    }

    let distances = distances_for(&league);
    let matrix = match TeamCostMatrix::build(&league, &distances) {
        Ok(matrix) => Arc::new(matrix),
        Err(err) => panic!("fixture matrix must build: {err}"),
    };
    let optimizer = Optimizer::new(matrix, Arc::new(schedule()), &league);

    (league, optimizer)
}
