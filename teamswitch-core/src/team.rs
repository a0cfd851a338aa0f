//! Team identifiers and detection of the two tracked teams.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::host::PlayerRegistry;

/// Team token as understood by the hosting server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    Rogue,
    Red,
    Green,
    Blue,
    Purple,
    #[serde(rename = "observer")]
    Observers,
    #[serde(rename = "none")]
    NoTeam,
}

impl TeamId {
    /// Colour teams that may be tracked, in detection order.
    pub const COLOR_TEAMS: [Self; 4] = [Self::Red, Self::Green, Self::Blue, Self::Purple];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rogue => "rogue",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Observers => "observer",
            Self::NoTeam => "none",
        }
    }

    /// Whether the team is one of the four colour teams.
    #[must_use]
    pub const fn is_color_team(self) -> bool {
        matches!(self, Self::Red | Self::Green | Self::Blue | Self::Purple)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the team names accepted by `/switch`.
impl FromStr for TeamId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rogue" => Ok(Self::Rogue),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "purple" => Ok(Self::Purple),
            "observer" => Ok(Self::Observers),
            _ => Err(()),
        }
    }
}

/// Which of the two tracked teams a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSlot {
    One,
    Two,
}

impl TeamSlot {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TeamDetectionError {
    #[error("at least two colour teams need capacity, found {found}")]
    InsufficientTeams { found: usize },
    #[error("tracked teams must be two distinct colour teams (got {one} and {two})")]
    InvalidPair { one: TeamId, two: TeamId },
}

/// The two teams whose populations are kept fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTeams {
    one: TeamId,
    two: TeamId,
}

impl TrackedTeams {
    /// Build an explicit pair.
    ///
    /// # Errors
    ///
    /// Returns an error when the teams are equal or not colour teams.
    pub fn new(one: TeamId, two: TeamId) -> Result<Self, TeamDetectionError> {
        if one == two || !one.is_color_team() || !two.is_color_team() {
            return Err(TeamDetectionError::InvalidPair { one, two });
        }
        Ok(Self { one, two })
    }

    /// Pick the first two colour teams with a non-zero player limit on the current map.
    ///
    /// # Errors
    ///
    /// Returns an error when fewer than two colour teams have capacity.
    pub fn detect<R: PlayerRegistry + ?Sized>(registry: &R) -> Result<Self, TeamDetectionError> {
        let found: Vec<TeamId> = TeamId::COLOR_TEAMS
            .into_iter()
            .filter(|team| registry.capacity_of(*team) > 0)
            .collect();
        let &[one, two, ..] = found.as_slice() else {
            return Err(TeamDetectionError::InsufficientTeams { found: found.len() });
        };
        log::debug!(
            "teams detected -> {} vs {}",
            two.as_str().to_uppercase(),
            one.as_str().to_uppercase()
        );
        Ok(Self { one, two })
    }

    #[must_use]
    pub const fn team(&self, slot: TeamSlot) -> TeamId {
        match slot {
            TeamSlot::One => self.one,
            TeamSlot::Two => self.two,
        }
    }

    #[must_use]
    pub const fn one(&self) -> TeamId {
        self.one
    }

    #[must_use]
    pub const fn two(&self) -> TeamId {
        self.two
    }

    /// Slot occupied by `team`, if it is tracked.
    #[must_use]
    pub fn slot_of(&self, team: TeamId) -> Option<TeamSlot> {
        if team == self.one {
            Some(TeamSlot::One)
        } else if team == self.two {
            Some(TeamSlot::Two)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryServer;

    #[test]
    fn team_names_parse_and_display() {
        for name in ["rogue", "red", "green", "blue", "purple", "observer"] {
            let team: TeamId = name.parse().unwrap();
            assert_eq!(team.to_string(), name);
        }
        assert!("yellow".parse::<TeamId>().is_err());
        assert!("Red".parse::<TeamId>().is_err());
    }

    #[test]
    fn detection_prefers_colour_order() {
        let server = MemoryServer::new()
            .with_capacity(TeamId::Blue, 10)
            .with_capacity(TeamId::Purple, 10)
            .with_capacity(TeamId::Red, 0);
        let teams = TrackedTeams::detect(&server).unwrap();
        assert_eq!(teams.one(), TeamId::Blue);
        assert_eq!(teams.two(), TeamId::Purple);
        assert_eq!(teams.slot_of(TeamId::Purple), Some(TeamSlot::Two));
        assert_eq!(teams.slot_of(TeamId::Red), None);
    }

    #[test]
    fn detection_fails_with_single_team() {
        let server = MemoryServer::new().with_capacity(TeamId::Green, 8);
        assert_eq!(
            TrackedTeams::detect(&server),
            Err(TeamDetectionError::InsufficientTeams { found: 1 })
        );
    }

    #[test]
    fn explicit_pair_rejects_duplicates_and_non_colour() {
        assert!(TrackedTeams::new(TeamId::Red, TeamId::Red).is_err());
        assert!(TrackedTeams::new(TeamId::Red, TeamId::Rogue).is_err());
        let teams = TrackedTeams::new(TeamId::Red, TeamId::Blue).unwrap();
        assert_eq!(teams.team(TeamSlot::Two), TeamId::Blue);
        assert_eq!(TeamSlot::One.other(), TeamSlot::Two);
    }
}
