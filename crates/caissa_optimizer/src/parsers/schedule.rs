use std::{fs, path::Path};

use crate::schedule::{LOTS, ROUNDS, Schedule};

use super::ParseError;

/// Loads the round-robin template from a whitespace-separated table:
/// one line per lot, [`ROUNDS`] signed 1-based opponent lots per line.
/// Positive means the lot hosts that round, negative means it travels.
/// Blank lines and `#` comments are skipped.
pub fn load_schedule(path: &Path) -> Result<Schedule, ParseError> {
    let text = fs::read_to_string(path)?;
    let mut table = [[0i8; ROUNDS]; LOTS];
    let mut lot = 0;

    for (ix, raw) in text.lines().enumerate() {
        let line = ix + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if lot == LOTS {
            return Err(ParseError::Malformed {
                line,
                reason: format!("more than {LOTS} lot rows"),
            });
        }

        let cells: Vec<&str> = trimmed.split_whitespace().collect();
        if cells.len() != ROUNDS {
            return Err(ParseError::Malformed {
                line,
                reason: format!("expected {ROUNDS} rounds, got {}", cells.len()),
            });
        }

        for (round, cell) in cells.iter().enumerate() {
            table[lot][round] = cell.parse().map_err(|_| ParseError::Malformed {
                line,
                reason: format!("round {}: {cell:?} is not a signed lot", round + 1),
            })?;
        }

        lot += 1;
    }

    if lot != LOTS {
        return Err(ParseError::Malformed {
            line: text.lines().count(),
            reason: format!("expected {LOTS} lot rows, got {lot}"),
        });
    }

    Ok(Schedule::from_table(&table)?)
}
