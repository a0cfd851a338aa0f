//! Chooses which players leave the strong team during a balance pass.
use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::action::{MoveReason, PlayerMoveIntent};
use crate::fairness::TeamPopulationSnapshot;
use crate::host::{PlayerId, PlayerRegistry};
use crate::rng::CountingRng;
use crate::team::{TeamSlot, TrackedTeams};

/// Populations and rosters of the tracked teams as seen by one decision.
///
/// Planned moves are recorded here so later steps of the same decision see
/// the line-up the host will have once the moves are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamLineup {
    populations: TeamPopulationSnapshot,
    one: Vec<PlayerId>,
    two: Vec<PlayerId>,
}

impl TeamLineup {
    #[must_use]
    pub fn read<R: PlayerRegistry + ?Sized>(registry: &R, teams: &TrackedTeams) -> Self {
        Self {
            populations: TeamPopulationSnapshot::read(registry, teams),
            one: registry.roster_of(teams.one()),
            two: registry.roster_of(teams.two()),
        }
    }

    #[must_use]
    pub const fn populations(&self) -> TeamPopulationSnapshot {
        self.populations
    }

    #[must_use]
    pub fn roster(&self, slot: TeamSlot) -> &[PlayerId] {
        match slot {
            TeamSlot::One => &self.one,
            TeamSlot::Two => &self.two,
        }
    }

    fn roster_mut(&mut self, slot: TeamSlot) -> &mut Vec<PlayerId> {
        match slot {
            TeamSlot::One => &mut self.one,
            TeamSlot::Two => &mut self.two,
        }
    }

    /// Record `player` leaving `from` for the other tracked team.
    pub fn move_player(&mut self, player: PlayerId, from: TeamSlot) {
        let source = self.roster_mut(from);
        if let Some(index) = source.iter().position(|id| *id == player) {
            source.swap_remove(index);
        }
        self.roster_mut(from.other()).push(player);
        self.populations.record_move(from);
    }
}

/// Why a balance pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    EmptyTeam,
    DeadZone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Declined(DeclineReason),
    /// The pass ran; may hold no moves when the teams differ by one.
    Planned(Vec<PlayerMoveIntent>),
}

/// Picks players uniformly at random from the strong team.
#[derive(Debug, Clone)]
pub struct PlayerSelector {
    rng: CountingRng<SmallRng>,
}

impl PlayerSelector {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: CountingRng::selection(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: CountingRng::from_entropy(),
        }
    }

    /// Draws consumed so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Number of players a pass moves for `populations`.
    #[must_use]
    pub const fn players_to_move(populations: &TeamPopulationSnapshot) -> u32 {
        populations.difference() / 2
    }

    /// Plan a balance pass, recording every planned move in `lineup`.
    pub fn plan(&mut self, lineup: &mut TeamLineup, teams: &TrackedTeams) -> SelectionOutcome {
        let populations = lineup.populations();
        if populations.has_empty_team() {
            log::debug!("balance declined: a tracked team is empty");
            return SelectionOutcome::Declined(DeclineReason::EmptyTeam);
        }
        if populations.in_dead_zone() {
            log::debug!(
                "balance declined: {} vs {} is close enough",
                populations.one,
                populations.two
            );
            return SelectionOutcome::Declined(DeclineReason::DeadZone);
        }

        let strong = populations.strong();
        let weak = strong.other();
        let to_move = Self::players_to_move(&populations);
        let mut moves = Vec::new();
        for _ in 0..to_move {
            // Sample the current roster again; earlier picks have already left it.
            let roster = lineup.roster(strong);
            if roster.is_empty() {
                break;
            }
            let player = roster[self.rng.gen_range(0..roster.len())];
            lineup.move_player(player, strong);
            moves.push(PlayerMoveIntent {
                player,
                from: teams.team(strong),
                to: teams.team(weak),
                reason: MoveReason::Balance,
            });
        }
        SelectionOutcome::Planned(moves)
    }
}
