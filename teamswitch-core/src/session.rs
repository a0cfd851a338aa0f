//! A controller bound to the server it balances.
use std::time::Duration;

use crate::action::BalanceAction;
use crate::config::{BalanceConfig, SettingKey};
use crate::controller::BalanceController;
use crate::executor::{BalanceExecutor, ExecutionReport};
use crate::host::{BalanceHost, PlayerId};
use crate::selector::PlayerSelector;
use crate::team::{TeamDetectionError, TrackedTeams};

/// Owns a host and routes server events through the controller, applying the
/// resulting actions immediately.
#[derive(Debug)]
pub struct BalanceSession<H> {
    controller: BalanceController,
    host: H,
}

impl<H: BalanceHost> BalanceSession<H> {
    /// Detect the tracked teams, parse the startup arguments and publish the
    /// effective settings to the host.
    ///
    /// # Errors
    ///
    /// Returns an error when the current map has fewer than two colour teams.
    pub fn start(
        host: H,
        startup_args: &str,
        selector: PlayerSelector,
    ) -> Result<Self, TeamDetectionError> {
        let teams = TrackedTeams::detect(&host)?;
        let config = BalanceConfig::from_startup_args(startup_args);
        Ok(Self::with_config(host, config, teams, selector))
    }

    /// Build a session from explicit settings and teams.
    pub fn with_config(
        host: H,
        config: BalanceConfig,
        teams: TrackedTeams,
        selector: PlayerSelector,
    ) -> Self {
        let controller = BalanceController::new(config, teams, selector);
        let mut session = Self { controller, host };
        let actions = session.controller.startup_actions();
        session.apply(&actions);
        log::info!(
            "balancing {} against {} ({:?})",
            teams.one(),
            teams.two(),
            config
        );
        session
    }

    pub fn on_tick(&mut self, now: Duration) -> ExecutionReport {
        let actions = self.controller.on_tick(&self.host, now);
        self.apply(&actions)
    }

    /// Handle a capture about to be awarded. The report's
    /// [`ExecutionReport::allows_capture`] tells the server whether to proceed.
    pub fn on_score_attempt(&mut self, capper: PlayerId) -> ExecutionReport {
        let actions = self.controller.on_score_attempt(&self.host, capper);
        self.apply(&actions)
    }

    pub fn on_score_completed(&mut self, capper: PlayerId) -> ExecutionReport {
        let actions = self.controller.on_score_completed(&self.host, capper);
        self.apply(&actions)
    }

    /// Forward a settings store change. Keys the engine does not own are
    /// ignored. Returns whether the controller's settings changed.
    pub fn on_config_changed(&mut self, key: &str, value: &str) -> bool {
        match key.parse::<SettingKey>() {
            Ok(key) => self.controller.on_config_changed(key, value),
            Err(err) => {
                log::debug!("ignoring setting change: {err}");
                false
            }
        }
    }

    pub fn on_command(&mut self, caller: PlayerId, command: &str, params: &[&str]) -> ExecutionReport {
        let actions = self
            .controller
            .on_command(&self.host, caller, command, params);
        self.apply(&actions)
    }

    fn apply(&mut self, actions: &[BalanceAction]) -> ExecutionReport {
        BalanceExecutor::execute(&mut self.host, actions)
    }

    #[must_use]
    pub const fn controller(&self) -> &BalanceController {
        &self.controller
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access for joins, parts and flag pickups between events.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }
}
