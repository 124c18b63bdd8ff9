use std::collections::BTreeSet;

use fxhash::FxHashMap;
use thiserror::Error;

/// Competitive tier. Classes partition the league into independent
/// round-robin pools laid out contiguously in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Class {
    Master,
    First,
    Second,
    Third,
}

impl Class {
    pub const ALL: [Class; 4] = [Class::Master, Class::First, Class::Second, Class::Third];

    pub fn from_code(code: &str) -> Option<Class> {
        match code {
            "M" => Some(Class::Master),
            "1" => Some(Class::First),
            "2" => Some(Class::Second),
            "3" => Some(Class::Third),
            _ => None,
        }
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Class::Master => "M",
            Class::First => "1",
            Class::Second => "2",
            Class::Third => "3",
        };
        write!(f, "{label}")
    }
}

/// A team's standing change for the season, fed into the fitness
/// penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gradation {
    #[default]
    Unchanged,
    Promoted,
    Relegated,
    Champion,
}

impl Gradation {
    pub fn from_code(code: &str) -> Option<Gradation> {
        match code {
            "" => Some(Gradation::Unchanged),
            "P" => Some(Gradation::Promoted),
            "D" => Some(Gradation::Relegated),
            "K" => Some(Gradation::Champion),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Gradation::Unchanged => "-",
            Gradation::Promoted => "P",
            Gradation::Relegated => "D",
            Gradation::Champion => "K",
        };
        write!(f, "{label}")
    }
}

/// An organization fielding one or more teams, located in one city.
#[derive(Debug, Clone)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub class: Class,
    pub gradation: Gradation,
    pub club_id: String,
}

/// Team and city ids are 8 bits wide.
pub const MAX_TEAMS: usize = 256;

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("team {team}: unknown club {club}")]
    UnknownClub { team: String, club: String },

    #[error("team {team} registered twice")]
    DuplicateTeam { team: String },

    #[error("too many teams: the id space holds at most {MAX_TEAMS}")]
    Capacity,
}

/// The season roster: all clubs and teams, immutable once loaded.
#[derive(Debug, Default)]
pub struct League {
    clubs: FxHashMap<String, Club>,
    teams: Vec<Team>,
    team_index: FxHashMap<String, usize>,
}

impl League {
    pub fn new() -> Self {
        League::default()
    }

    /// Registers a club; a club seen before keeps its first record.
    pub fn add_club(&mut self, club: Club) {
        self.clubs.entry(club.id.clone()).or_insert(club);
    }

    pub fn add_team(&mut self, team: Team) -> Result<(), LeagueError> {
        if !self.clubs.contains_key(&team.club_id) {
            return Err(LeagueError::UnknownClub {
                team: team.id,
                club: team.club_id,
            });
        }

        if self.team_index.contains_key(&team.id) {
            return Err(LeagueError::DuplicateTeam { team: team.id });
        }

        if self.teams.len() == MAX_TEAMS {
            return Err(LeagueError::Capacity);
        }

        self.team_index.insert(team.id.clone(), self.teams.len());
        self.teams.push(team);

        Ok(())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.team_index.get(id).map(|&ix| &self.teams[ix])
    }

    pub fn club(&self, id: &str) -> Option<&Club> {
        self.clubs.get(id)
    }

    /// The club a registered team belongs to. Membership is validated at
    /// insertion, so this cannot fail for teams taken from this league.
    pub fn club_of(&self, team: &Team) -> &Club {
        self.clubs
            .get(&team.club_id)
            .expect("club registered for team")
    }

    pub fn class_teams(&self, class: Class) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(move |team| team.class == class)
    }

    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }

    pub fn num_clubs(&self) -> usize {
        self.clubs.len()
    }

    /// The sorted, deduplicated list of cities of all clubs that field a
    /// team, which is exactly the input the travel acquisition needs.
    pub fn unique_cities(&self) -> Vec<String> {
        let cities: BTreeSet<&str> = self
            .teams
            .iter()
            .map(|team| self.club_of(team).city.as_str())
            .collect();

        cities.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn club(id: &str, city: &str) -> Club {
        Club {
            id: id.to_string(),
            name: format!("Club {id}"),
            city: city.to_string(),
        }
    }

    fn team(id: &str, club_id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            class: Class::Master,
            gradation: Gradation::Unchanged,
            club_id: club_id.to_string(),
        }
    }

    #[test]
    fn class_and_gradation_codes() {
        assert_eq!(Class::from_code("M"), Some(Class::Master));
        assert_eq!(Class::from_code("3"), Some(Class::Third));
        assert_eq!(Class::from_code("4"), None);

        assert_eq!(Gradation::from_code(""), Some(Gradation::Unchanged));
        assert_eq!(Gradation::from_code("K"), Some(Gradation::Champion));
        assert_eq!(Gradation::from_code("X"), None);
    }

    #[test]
    fn rejects_team_with_unknown_club() {
        let mut league = League::new();

        let result = league.add_team(team("T1", "C1"));
        assert!(matches!(result, Err(LeagueError::UnknownClub { .. })));
    }

    #[test]
    fn rejects_duplicate_team_ids() {
        let mut league = League::new();
        league.add_club(club("C1", "Utrecht"));
        league.add_team(team("T1", "C1")).unwrap();

        let result = league.add_team(team("T1", "C1"));
        assert!(matches!(result, Err(LeagueError::DuplicateTeam { .. })));
    }

    #[test]
    fn unique_cities_are_sorted_and_deduplicated() {
        let mut league = League::new();
        league.add_club(club("C1", "Utrecht"));
        league.add_club(club("C2", "Amsterdam"));
        league.add_club(club("C3", "Utrecht"));
        league.add_team(team("T1", "C1")).unwrap();
        league.add_team(team("T2", "C2")).unwrap();
        league.add_team(team("T3", "C3")).unwrap();

        assert_eq!(league.unique_cities(), vec!["Amsterdam", "Utrecht"]);
    }

    #[test]
    fn clubs_keep_their_first_record() {
        let mut league = League::new();
        league.add_club(club("C1", "Utrecht"));
        league.add_club(club("C1", "Venray"));

        assert_eq!(league.club("C1").unwrap().city, "Utrecht");
    }
}
