//! File parsers for the league roster and the round-robin schedule
//! template.

mod roster;
mod schedule;

pub use roster::load_roster;
pub use schedule::load_schedule;

use thiserror::Error;

use crate::{league::LeagueError, schedule::ScheduleError};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: team {team} has unknown class code {code:?}")]
    UnknownClass {
        line: usize,
        team: String,
        code: String,
    },

    #[error("line {line}: team {team} has unknown gradation code {code:?}")]
    UnknownGradation {
        line: usize,
        team: String,
        code: String,
    },

    #[error(transparent)]
    League(#[from] LeagueError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
