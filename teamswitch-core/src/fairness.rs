//! Fairness metric over the two tracked team populations.
use serde::{Deserialize, Serialize};

use crate::constants::{BONUS_GAP_WEIGHT, BONUS_WEAK_WEIGHT, DEAD_ZONE_PAIRS};
use crate::host::PlayerRegistry;
use crate::team::{TeamSlot, TrackedTeams};

/// Capture bonus for the weak team.
///
/// Negative values mean the teams are unfair.
#[must_use]
pub const fn bonus(strong_count: u32, weak_count: u32) -> i64 {
    let strong = strong_count as i64;
    let weak = weak_count as i64;
    BONUS_GAP_WEIGHT * (weak - strong) + BONUS_WEAK_WEIGHT * weak
}

/// Populations of the two tracked teams, read fresh for every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamPopulationSnapshot {
    pub one: u32,
    pub two: u32,
}

/// Outcome of evaluating the fairness metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fairness {
    /// One team is empty or populations are equal; the metric was not evaluated.
    NotEvaluated,
    Fair { bonus: i64 },
    Unfair { bonus: i64, strong: TeamSlot },
}

impl Fairness {
    #[must_use]
    pub const fn is_unfair(self) -> bool {
        matches!(self, Self::Unfair { .. })
    }

    #[must_use]
    pub const fn strong(self) -> Option<TeamSlot> {
        match self {
            Self::Unfair { strong, .. } => Some(strong),
            Self::NotEvaluated | Self::Fair { .. } => None,
        }
    }
}

impl TeamPopulationSnapshot {
    #[must_use]
    pub const fn new(one: u32, two: u32) -> Self {
        Self { one, two }
    }

    /// Read both tracked populations from the registry.
    #[must_use]
    pub fn read<R: PlayerRegistry + ?Sized>(registry: &R, teams: &TrackedTeams) -> Self {
        Self {
            one: registry.population_of(teams.one()),
            two: registry.population_of(teams.two()),
        }
    }

    #[must_use]
    pub const fn count(&self, slot: TeamSlot) -> u32 {
        match slot {
            TeamSlot::One => self.one,
            TeamSlot::Two => self.two,
        }
    }

    pub fn count_mut(&mut self, slot: TeamSlot) -> &mut u32 {
        match slot {
            TeamSlot::One => &mut self.one,
            TeamSlot::Two => &mut self.two,
        }
    }

    /// Team with more players; team two on ties.
    #[must_use]
    pub const fn strong(&self) -> TeamSlot {
        if self.one > self.two {
            TeamSlot::One
        } else {
            TeamSlot::Two
        }
    }

    #[must_use]
    pub const fn difference(&self) -> u32 {
        self.one.abs_diff(self.two)
    }

    #[must_use]
    pub const fn has_empty_team(&self) -> bool {
        self.one == 0 || self.two == 0
    }

    /// Whether the line-up is one of the exempt near-even configurations.
    #[must_use]
    pub fn in_dead_zone(&self) -> bool {
        DEAD_ZONE_PAIRS
            .iter()
            .any(|&(a, b)| (self.one, self.two) == (a, b) || (self.one, self.two) == (b, a))
    }

    /// Evaluate the fairness metric for this line-up.
    #[must_use]
    pub const fn fairness(&self) -> Fairness {
        if self.has_empty_team() || self.one == self.two {
            return Fairness::NotEvaluated;
        }
        let strong = self.strong();
        let weak_count = self.count(strong.other());
        let value = bonus(self.count(strong), weak_count);
        if value < 0 {
            Fairness::Unfair {
                bonus: value,
                strong,
            }
        } else {
            Fairness::Fair { bonus: value }
        }
    }

    /// Record one player moving between the tracked teams.
    pub fn record_move(&mut self, from: TeamSlot) {
        let source = self.count_mut(from);
        *source = source.saturating_sub(1);
        let target = self.count_mut(from.other());
        *target = target.saturating_add(1);
    }
}
