//! Applies controller actions to the host.
use serde::{Deserialize, Serialize};

use crate::action::{BalanceAction, PlayerMoveIntent};
use crate::constants::TEAM_FLAG_INDICES;
use crate::host::{BalanceHost, PlayerId};
use crate::messages::switch_banner;
use crate::team::TeamId;

/// What an execution actually did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub moved: Vec<(PlayerId, TeamId)>,
    /// Players that vanished before their action could be applied.
    pub skipped: Vec<PlayerId>,
    pub eliminated: Vec<PlayerId>,
    pub flags_reset: Vec<usize>,
    pub capture_vetoed: bool,
    pub broadcasts: usize,
    pub replies: usize,
}

impl ExecutionReport {
    /// Whether a pending capture may proceed.
    #[must_use]
    pub const fn allows_capture(&self) -> bool {
        !self.capture_vetoed
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Stateless applier of [`BalanceAction`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceExecutor;

impl BalanceExecutor {
    /// Apply `actions` in order. A player who left the session is skipped and
    /// the remaining actions still run.
    pub fn execute<H: BalanceHost + ?Sized>(host: &mut H, actions: &[BalanceAction]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for action in actions {
            match action {
                BalanceAction::VetoCapture => report.capture_vetoed = true,
                BalanceAction::ResetCarriedFlag { player } => {
                    if let Some(index) = Self::reset_carried_flag(host, *player) {
                        report.flags_reset.push(index);
                    }
                }
                BalanceAction::Eliminate { player } => {
                    if host.lookup(*player).is_some() {
                        host.eliminate(*player);
                        report.eliminated.push(*player);
                    } else {
                        log::debug!("player {player} left before elimination");
                        report.skipped.push(*player);
                    }
                }
                BalanceAction::Move(intent) => {
                    if Self::apply_move(host, intent) {
                        report.moved.push((intent.player, intent.to));
                    } else {
                        report.skipped.push(intent.player);
                    }
                }
                BalanceAction::Broadcast { text } => {
                    host.broadcast(text);
                    report.broadcasts += 1;
                }
                BalanceAction::Reply { to, text } => {
                    host.send_to(*to, text);
                    report.replies += 1;
                }
                BalanceAction::PublishSetting { key, value } => host.publish(*key, value),
            }
        }
        if !report.moved.is_empty() {
            log::info!(
                "moved {} player(s), skipped {}",
                report.moved.len(),
                report.skipped.len()
            );
        }
        report
    }

    fn apply_move<H: BalanceHost + ?Sized>(host: &mut H, intent: &PlayerMoveIntent) -> bool {
        if host.lookup(intent.player).is_none() {
            log::debug!("player {} left before moving to {}", intent.player, intent.to);
            return false;
        }
        host.reassign(intent.player, intent.to);
        host.mark_for_respawn(intent.player);
        for line in switch_banner(&intent.reason, intent.to) {
            host.send_to(intent.player, &line);
        }
        log::debug!(
            "player {} moved from {} to {} ({:?})",
            intent.player,
            intent.from,
            intent.to,
            intent.reason
        );
        true
    }

    fn reset_carried_flag<H: BalanceHost + ?Sized>(host: &mut H, player: PlayerId) -> Option<usize> {
        let index = TEAM_FLAG_INDICES
            .into_iter()
            .find(|index| host.flag_carrier(*index) == Some(player))?;
        host.reset_flag(index);
        Some(index)
    }
}
