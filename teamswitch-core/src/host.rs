//! Collaborator interfaces the balance engine consumes from the hosting server.
//!
//! The engine never owns players, flags or settings. Platform-specific
//! implementations should provide these traits; [`crate::memory::MemoryServer`]
//! is the in-process reference implementation.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SettingKey;
use crate::team::TeamId;

/// Player slot index assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of a player, valid only for the duration of the borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRecord<'a> {
    pub id: PlayerId,
    pub team: TeamId,
    pub callsign: &'a str,
    /// Legacy observer-only admin client that must never be switched.
    pub is_bzadmin: bool,
}

/// Player registry of the hosting session.
pub trait PlayerRegistry {
    /// Current number of players on `team`.
    fn population_of(&self, team: TeamId) -> u32;

    /// Player limit of `team` on the current map; zero when the team does not exist.
    fn capacity_of(&self, team: TeamId) -> u32;

    /// Players currently on `team`.
    fn roster_of(&self, team: TeamId) -> Vec<PlayerId>;

    /// Look up a player, returning `None` when the slot is empty.
    fn lookup(&self, player: PlayerId) -> Option<PlayerRecord<'_>>;

    /// Whether `player` holds the named permission.
    fn has_permission(&self, player: PlayerId, permission: &str) -> bool;

    /// Move `player` to `team`.
    fn reassign(&mut self, player: PlayerId, team: TeamId);

    /// Flag `player` as due to (re)spawn.
    fn mark_for_respawn(&mut self, player: PlayerId);

    /// Kill `player` without awarding the kill to anyone.
    fn eliminate(&mut self, player: PlayerId);
}

/// Team flag control of the capture-the-flag subsystem.
pub trait FlagControl {
    /// Player carrying flag `flag_index`, if any.
    fn flag_carrier(&self, flag_index: usize) -> Option<PlayerId>;

    /// Return flag `flag_index` to its neutral position.
    fn reset_flag(&mut self, flag_index: usize);
}

/// Text channel to players.
pub trait MessageChannel {
    fn send_to(&mut self, player: PlayerId, text: &str);

    fn broadcast(&mut self, text: &str);
}

/// Persisted settings store.
pub trait SettingsStore {
    /// Publish the effective value of a setting so operators can see and change it.
    fn publish(&mut self, key: SettingKey, value: &str);
}

/// Everything a [`crate::BalanceSession`] needs from its host.
pub trait BalanceHost: PlayerRegistry + FlagControl + MessageChannel + SettingsStore {}

impl<T> BalanceHost for T where T: PlayerRegistry + FlagControl + MessageChannel + SettingsStore {}
