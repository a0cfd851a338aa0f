//! Centralized balance tuning constants and player-facing text.
//!
//! These values define the fairness math and the wording players see.

// Fairness metric ----------------------------------------------------------
/// Weight applied to the population gap between the weak and strong team.
pub(crate) const BONUS_GAP_WEIGHT: i64 = 8;
/// Weight applied to the weak team's population.
pub(crate) const BONUS_WEAK_WEIGHT: i64 = 3;
/// Near-even line-ups that are never balanced, in either order.
pub(crate) const DEAD_ZONE_PAIRS: [(u32, u32); 3] = [(1, 2), (2, 3), (3, 4)];

// Configuration ------------------------------------------------------------
pub const DEFAULT_BALANCE_DELAY_SECS: u32 = 30;
pub(crate) const SETTING_BALANCE_DELAY: &str = "_atbBalanceDelay";
pub(crate) const SETTING_ALWAYS_BALANCE: &str = "_atbAlwaysBalanceTeams";
pub(crate) const SETTING_BALANCE_ON_CAPTURE: &str = "_atbBalanceTeamsOnCap";
pub(crate) const SETTING_DISABLE_UNFAIR_CAPTURE: &str = "_atbDisableCapWithUnfairTeams";

// Commands -----------------------------------------------------------------
pub const COMMAND_SWITCH: &str = "switch";
pub const COMMAND_BALANCE: &str = "balance";
/// Permission required by both operator commands.
pub const PERMISSION_SWITCH: &str = "switch";
/// Motto reported by legacy admin clients.
pub const BZADMIN_MOTTO: &str = "bzadmin";

// Flags --------------------------------------------------------------------
/// Team flag indices inspected when a capper's flag is reset.
pub(crate) const TEAM_FLAG_INDICES: [usize; 2] = [0, 1];

// Messages -----------------------------------------------------------------
pub const MSG_BALANCING: &str = "Balancing unfair teams...";
pub const MSG_TEAMS_BALANCED: &str = "Teams have been balanced";
pub(crate) const BANNER_PREFIX: &str = "-_-__-___-___++ ";
pub(crate) const BANNER_SUFFIX: &str = " ++____-___-__-_-";
pub(crate) const BANNER_HELP: &str = "SEE '/HELP SWITCH' FOR MORE INFO";
