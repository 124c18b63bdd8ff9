use thiserror::Error;

/// Slots of one round-robin sub-group.
pub const LOTS: usize = 10;

pub const ROUNDS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    /// 0-based opponent lot.
    pub opponent: usize,
    pub venue: Venue,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("lot {lot}, round {round}: opponent {opponent} out of range")]
    OpponentOutOfRange {
        lot: usize,
        round: usize,
        opponent: i8,
    },

    #[error("lot {lot}, round {round}: fixture against lot {opponent} is not mirrored")]
    Asymmetric {
        lot: usize,
        round: usize,
        opponent: usize,
    },

    #[error("lot {lot} does not meet every other lot exactly once")]
    IncompleteRoundRobin { lot: usize },
}

/// The fixed round-robin template: for every lot and round, the opponent
/// lot and the venue. Immutable after construction; every sub-group of a
/// genome is one application of this template.
#[derive(Debug)]
pub struct Schedule {
    fixtures: [[Fixture; ROUNDS]; LOTS],
}

impl Schedule {
    /// Builds the schedule from a table of signed 1-based opponent lots:
    /// positive means the row's lot plays at home, negative away.
    ///
    /// Validates the symmetry invariant (if lot A visits lot B in round
    /// r, lot B hosts lot A in round r) and that every lot meets all
    /// other lots exactly once.
    pub fn from_table(table: &[[i8; ROUNDS]; LOTS]) -> Result<Schedule, ScheduleError> {
        let mut fixtures = [[Fixture {
            opponent: 0,
            venue: Venue::Home,
        }; ROUNDS]; LOTS];

        for (lot, row) in table.iter().enumerate() {
            let mut met = [false; LOTS];

            for (round, &cell) in row.iter().enumerate() {
                let opponent = cell.unsigned_abs() as usize;
                if opponent < 1 || opponent > LOTS || opponent - 1 == lot {
                    return Err(ScheduleError::OpponentOutOfRange {
                        lot,
                        round,
                        opponent: cell,
                    });
                }
                let opponent = opponent - 1;

                let mirrored = table[opponent][round];
                if mirrored.unsigned_abs() as usize != lot + 1 || (mirrored > 0) == (cell > 0) {
                    return Err(ScheduleError::Asymmetric {
                        lot,
                        round,
                        opponent,
                    });
                }

                met[opponent] = true;
                fixtures[lot][round] = Fixture {
                    opponent,
                    venue: if cell > 0 { Venue::Home } else { Venue::Away },
                };
            }

            let met_all = met
                .iter()
                .enumerate()
                .all(|(other, &seen)| seen || other == lot);
            if !met_all {
                return Err(ScheduleError::IncompleteRoundRobin { lot });
            }
        }

        Ok(Schedule { fixtures })
    }

    pub fn fixture(&self, lot: usize, round: usize) -> Fixture {
        self.fixtures[lot][round]
    }
}
