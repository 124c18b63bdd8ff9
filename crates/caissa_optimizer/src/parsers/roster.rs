use std::{fs, path::Path};

use tracing::debug;

use crate::league::{Class, Club, Gradation, League, Team};

use super::ParseError;

/// Loads a league roster from a semicolon-separated file.
///
/// Each record line reads
/// `team_id;class;team_name;club_id;club_name;city;gradation`, where
/// the gradation field may be empty or missing entirely for unchanged
/// teams. Blank lines, `#` comments and a repeated header line are
/// skipped.
pub fn load_roster(path: &Path) -> Result<League, ParseError> {
    let text = fs::read_to_string(path)?;
    let mut league = League::new();

    for (ix, raw) in text.lines().enumerate() {
        let line = ix + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with("team_id;") {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(';').map(str::trim).collect();
        if fields.len() < 6 || fields.len() > 7 {
            return Err(ParseError::Malformed {
                line,
                reason: format!("expected 6 or 7 fields, got {}", fields.len()),
            });
        }

        let team_id = fields[0];
        if team_id.is_empty() {
            return Err(ParseError::Malformed {
                line,
                reason: "empty team id".to_string(),
            });
        }

        let class = Class::from_code(fields[1]).ok_or_else(|| ParseError::UnknownClass {
            line,
            team: team_id.to_string(),
            code: fields[1].to_string(),
        })?;

        let gradation_code = fields.get(6).copied().unwrap_or("");
        let gradation =
            Gradation::from_code(gradation_code).ok_or_else(|| ParseError::UnknownGradation {
                line,
                team: team_id.to_string(),
                code: gradation_code.to_string(),
            })?;

        league.add_club(Club {
            id: fields[3].to_string(),
            name: fields[4].to_string(),
            city: fields[5].to_string(),
        });
        league.add_team(Team {
            id: team_id.to_string(),
            name: fields[2].to_string(),
            class,
            gradation,
            club_id: fields[3].to_string(),
        })?;
    }

    debug!(
        teams = league.num_teams(),
        clubs = league.num_clubs(),
        "loaded roster"
    );

    Ok(league)
}
