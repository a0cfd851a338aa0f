//! Event-driven balance state machine.
//!
//! Every handler reads the registry, updates the controller's own
//! [`FairnessState`] and [`BalanceConfig`], and returns the host mutations to
//! perform as [`BalanceAction`]s. The controller never mutates the host itself;
//! [`crate::BalanceExecutor`] applies the actions.
use std::time::Duration;

use crate::action::{BalanceAction, MoveReason, PlayerMoveIntent};
use crate::clock::{BalanceClock, FairnessState};
use crate::command::{CommandError, OperatorCommand, SwitchTarget};
use crate::config::{BalanceConfig, SettingKey};
use crate::constants::{MSG_BALANCING, MSG_TEAMS_BALANCED, PERMISSION_SWITCH};
use crate::fairness::Fairness;
use crate::host::{PlayerId, PlayerRegistry};
use crate::selector::{PlayerSelector, SelectionOutcome, TeamLineup};
use crate::team::{TeamId, TeamSlot, TrackedTeams};

/// Which scoring event is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureStage {
    /// The capture can still be vetoed.
    Attempt,
    /// Points were already awarded.
    Completed,
}

#[derive(Debug, Clone)]
pub struct BalanceController {
    config: BalanceConfig,
    state: FairnessState,
    teams: TrackedTeams,
    selector: PlayerSelector,
}

impl BalanceController {
    #[must_use]
    pub const fn new(config: BalanceConfig, teams: TrackedTeams, selector: PlayerSelector) -> Self {
        Self {
            config,
            state: FairnessState::Balanced,
            teams,
            selector,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BalanceConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> FairnessState {
        self.state
    }

    #[must_use]
    pub const fn teams(&self) -> &TrackedTeams {
        &self.teams
    }

    #[must_use]
    pub const fn selector(&self) -> &PlayerSelector {
        &self.selector
    }

    /// Publish the effective settings so the store mirrors the controller.
    #[must_use]
    pub fn startup_actions(&self) -> Vec<BalanceAction> {
        SettingKey::ALL
            .into_iter()
            .map(|key| BalanceAction::PublishSetting {
                key,
                value: self.config.value_of(key),
            })
            .collect()
    }

    /// Periodic tick carrying the current monotonic time.
    pub fn on_tick<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        now: Duration,
    ) -> Vec<BalanceAction> {
        if !self.config.always_balance {
            return Vec::new();
        }
        let lineup = TeamLineup::read(registry, &self.teams);
        let unfair = lineup.populations().fairness().is_unfair();
        let clock = BalanceClock::new(self.config.balance_delay_secs);
        let transition = clock.observe(&mut self.state, now, unfair);
        if !transition.should_balance() {
            return Vec::new();
        }
        log::info!(
            "teams unfair for {}s or more, balancing",
            clock.delay().as_secs()
        );
        let mut actions = vec![BalanceAction::broadcast(MSG_BALANCING)];
        actions.extend(self.balance_pass(lineup));
        actions
    }

    /// Vetoable "about to score" event.
    pub fn on_score_attempt<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        capper: PlayerId,
    ) -> Vec<BalanceAction> {
        if !self.config.disable_capture_with_unfair_teams {
            return Vec::new();
        }
        self.handle_capture(registry, capper, CaptureStage::Attempt)
    }

    /// Non-vetoable "scored" event.
    pub fn on_score_completed<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        capper: PlayerId,
    ) -> Vec<BalanceAction> {
        if !self.config.balance_on_capture {
            return Vec::new();
        }
        self.handle_capture(registry, capper, CaptureStage::Completed)
    }

    /// Settings store change notification. Returns whether anything changed.
    pub fn on_config_changed(&mut self, key: SettingKey, value: &str) -> bool {
        let changed = self.config.apply_change(key, value);
        if key == SettingKey::AlwaysBalance && !self.config.always_balance {
            self.state = FairnessState::Balanced;
        }
        if changed {
            log::debug!("setting {key} changed to {value:?}");
        }
        changed
    }

    /// Operator command. Failures become a reply to `caller`.
    pub fn on_command<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        caller: PlayerId,
        command: &str,
        params: &[&str],
    ) -> Vec<BalanceAction> {
        match self.run_command(registry, caller, command, params) {
            Ok(actions) => actions,
            Err(err) => {
                log::debug!("/{command} from {caller} rejected: {err}");
                vec![BalanceAction::reply(caller, err.to_string())]
            }
        }
    }

    fn run_command<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        caller: PlayerId,
        command: &str,
        params: &[&str],
    ) -> Result<Vec<BalanceAction>, CommandError> {
        let Some(name) = OperatorCommand::recognise(command) else {
            return Err(CommandError::UnknownCommand(command.to_string()));
        };
        if !registry.has_permission(caller, PERMISSION_SWITCH) {
            return Err(CommandError::Forbidden(name.to_string()));
        }
        match OperatorCommand::parse(command, params)? {
            OperatorCommand::Switch { target, team } => {
                Self::switch_player(registry, caller, &target, &team).map(|intent| {
                    log::info!("{caller} switched {} to {}", intent.player, intent.to);
                    vec![BalanceAction::Move(intent)]
                })
            }
            OperatorCommand::Balance => {
                let lineup = TeamLineup::read(registry, &self.teams);
                let mut actions = self.balance_pass(lineup);
                actions.push(BalanceAction::broadcast(MSG_BALANCING));
                actions.push(BalanceAction::reply(caller, MSG_TEAMS_BALANCED));
                Ok(actions)
            }
        }
    }

    /// Resolve a `/switch` request into a move, bypassing the fairness metric.
    fn switch_player<R: PlayerRegistry + ?Sized>(
        registry: &R,
        caller: PlayerId,
        target: &SwitchTarget,
        team_name: &str,
    ) -> Result<PlayerMoveIntent, CommandError> {
        let (player, raw) = match target {
            SwitchTarget::Caller => (Some(caller), caller.to_string()),
            SwitchTarget::Slot { id, raw } => (*id, raw.clone()),
        };
        let record = player
            .and_then(|id| registry.lookup(id))
            .ok_or(CommandError::PlayerNotFound(raw))?;
        if record.is_bzadmin {
            return Err(CommandError::ProtectedClient);
        }
        let team: TeamId = team_name
            .parse()
            .map_err(|()| CommandError::UnknownTeam(team_name.to_string()))?;
        if registry.capacity_of(team) == 0 {
            return Err(CommandError::TeamNotOnMap(team_name.to_string()));
        }
        let reason = if record.id == caller {
            MoveReason::SelfSwitch
        } else {
            let callsign = registry
                .lookup(caller)
                .map_or_else(|| "the server".to_string(), |op| op.callsign.to_string());
            MoveReason::SwitchedBy { callsign }
        };
        Ok(PlayerMoveIntent {
            player: record.id,
            from: record.team,
            to: team,
            reason,
        })
    }

    fn handle_capture<R: PlayerRegistry + ?Sized>(
        &mut self,
        registry: &R,
        capper: PlayerId,
        stage: CaptureStage,
    ) -> Vec<BalanceAction> {
        let mut lineup = TeamLineup::read(registry, &self.teams);
        let Fairness::Unfair { bonus, strong } = lineup.populations().fairness() else {
            return Vec::new();
        };
        // Near-even small line-ups never trigger a balance action.
        if lineup.populations().in_dead_zone() {
            log::debug!("capture by {capper} in the dead zone, leaving it alone");
            return Vec::new();
        }
        let Some(record) = registry.lookup(capper) else {
            log::debug!("capper {capper} is no longer in the session");
            return Vec::new();
        };
        // Caps by the weak team are left alone.
        if record.team != self.teams.team(strong) {
            return Vec::new();
        }
        log::info!(
            "unfair capture by {capper} ({stage:?}, bonus {bonus}), moving capper to {}",
            self.teams.team(strong.other())
        );

        let intent = self.capper_move(capper, strong);
        let mut actions = match stage {
            CaptureStage::Attempt => vec![
                BalanceAction::VetoCapture,
                BalanceAction::Move(intent),
                BalanceAction::ResetCarriedFlag { player: capper },
            ],
            CaptureStage::Completed => vec![
                BalanceAction::Eliminate { player: capper },
                BalanceAction::Move(intent),
            ],
        };
        actions.push(BalanceAction::broadcast(MSG_BALANCING));
        // The capper's move is itself a balance action.
        self.state = FairnessState::Balanced;
        lineup.move_player(capper, strong);
        actions.extend(self.balance_pass(lineup));
        actions
    }

    fn capper_move(&self, capper: PlayerId, strong: TeamSlot) -> PlayerMoveIntent {
        PlayerMoveIntent {
            player: capper,
            from: self.teams.team(strong),
            to: self.teams.team(strong.other()),
            reason: MoveReason::Capture,
        }
    }

    /// One run of the selector. A pass that is not declined resets the clock.
    fn balance_pass(&mut self, mut lineup: TeamLineup) -> Vec<BalanceAction> {
        match self.selector.plan(&mut lineup, &self.teams) {
            SelectionOutcome::Declined(reason) => {
                log::debug!("balance pass declined: {reason:?}");
                Vec::new()
            }
            SelectionOutcome::Planned(moves) => {
                self.state = FairnessState::Balanced;
                moves.into_iter().map(BalanceAction::Move).collect()
            }
        }
    }
}
