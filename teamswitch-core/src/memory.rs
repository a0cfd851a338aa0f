//! In-memory host used by tests and the scenario runner.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::SettingKey;
use crate::constants::BZADMIN_MOTTO;
use crate::host::{
    FlagControl, MessageChannel, PlayerId, PlayerRecord, PlayerRegistry, SettingsStore,
};
use crate::team::TeamId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPlayer {
    pub callsign: String,
    pub team: TeamId,
    pub motto: String,
    pub permissions: BTreeSet<String>,
    pub respawn_pending: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Player(PlayerId),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub to: Recipient,
    pub text: String,
}

/// A single server session held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    players: BTreeMap<PlayerId, MemoryPlayer>,
    capacities: HashMap<TeamId, u32>,
    flags: [Option<PlayerId>; 2],
    sent: Vec<SentMessage>,
    eliminations: Vec<PlayerId>,
    flag_resets: Vec<usize>,
    settings: BTreeMap<String, String>,
}

impl MemoryServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the player limit of `team` on the current map.
    #[must_use]
    pub fn with_capacity(mut self, team: TeamId, capacity: u32) -> Self {
        self.capacities.insert(team, capacity);
        self
    }

    pub fn add_player(&mut self, id: PlayerId, callsign: &str, team: TeamId) {
        self.players.insert(
            id,
            MemoryPlayer {
                callsign: callsign.to_string(),
                team,
                motto: String::new(),
                permissions: BTreeSet::new(),
                respawn_pending: false,
                alive: true,
            },
        );
    }

    /// Join a legacy admin client as an observer.
    pub fn add_bzadmin(&mut self, id: PlayerId, callsign: &str) {
        self.add_player(id, callsign, TeamId::Observers);
        if let Some(player) = self.players.get_mut(&id) {
            player.motto = BZADMIN_MOTTO.to_string();
        }
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<MemoryPlayer> {
        for carrier in &mut self.flags {
            if *carrier == Some(id) {
                *carrier = None;
            }
        }
        self.players.remove(&id)
    }

    pub fn grant(&mut self, id: PlayerId, permission: &str) {
        if let Some(player) = self.players.get_mut(&id) {
            player.permissions.insert(permission.to_string());
        }
    }

    /// Hand team flag `flag_index` to `player`.
    pub fn give_flag(&mut self, flag_index: usize, player: PlayerId) {
        if let Some(slot) = self.flags.get_mut(flag_index) {
            *slot = Some(player);
        }
    }

    #[must_use]
    pub fn flag_carrier_of(&self, flag_index: usize) -> Option<PlayerId> {
        self.flags.get(flag_index).copied().flatten()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&MemoryPlayer> {
        self.players.get(&id)
    }

    #[must_use]
    pub fn team_of(&self, id: PlayerId) -> Option<TeamId> {
        self.players.get(&id).map(|player| player.team)
    }

    #[must_use]
    pub fn respawn_pending(&self, id: PlayerId) -> bool {
        self.players
            .get(&id)
            .is_some_and(|player| player.respawn_pending)
    }

    #[must_use]
    pub fn sent(&self) -> &[SentMessage] {
        &self.sent
    }

    #[must_use]
    pub fn messages_to(&self, id: PlayerId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|message| message.to == Recipient::Player(id))
            .map(|message| message.text.as_str())
            .collect()
    }

    #[must_use]
    pub fn broadcasts(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|message| message.to == Recipient::All)
            .map(|message| message.text.as_str())
            .collect()
    }

    #[must_use]
    pub fn eliminations(&self) -> &[PlayerId] {
        &self.eliminations
    }

    #[must_use]
    pub fn flag_resets(&self) -> &[usize] {
        &self.flag_resets
    }

    #[must_use]
    pub fn setting(&self, key: SettingKey) -> Option<&str> {
        self.settings.get(key.as_str()).map(String::as_str)
    }

    pub fn clear_messages(&mut self) {
        self.sent.clear();
    }
}

impl PlayerRegistry for MemoryServer {
    fn population_of(&self, team: TeamId) -> u32 {
        let count = self.players.values().filter(|p| p.team == team).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn capacity_of(&self, team: TeamId) -> u32 {
        self.capacities.get(&team).copied().unwrap_or(0)
    }

    fn roster_of(&self, team: TeamId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, player)| player.team == team)
            .map(|(id, _)| *id)
            .collect()
    }

    fn lookup(&self, player: PlayerId) -> Option<PlayerRecord<'_>> {
        self.players.get(&player).map(|record| PlayerRecord {
            id: player,
            team: record.team,
            callsign: &record.callsign,
            is_bzadmin: record.team == TeamId::Observers && record.motto == BZADMIN_MOTTO,
        })
    }

    fn has_permission(&self, player: PlayerId, permission: &str) -> bool {
        self.players
            .get(&player)
            .is_some_and(|record| record.permissions.contains(permission))
    }

    fn reassign(&mut self, player: PlayerId, team: TeamId) {
        if let Some(record) = self.players.get_mut(&player) {
            record.team = team;
        }
    }

    fn mark_for_respawn(&mut self, player: PlayerId) {
        if let Some(record) = self.players.get_mut(&player) {
            record.respawn_pending = true;
        }
    }

    fn eliminate(&mut self, player: PlayerId) {
        if let Some(record) = self.players.get_mut(&player) {
            record.alive = false;
            self.eliminations.push(player);
        }
    }
}

impl FlagControl for MemoryServer {
    fn flag_carrier(&self, flag_index: usize) -> Option<PlayerId> {
        self.flag_carrier_of(flag_index)
    }

    fn reset_flag(&mut self, flag_index: usize) {
        if let Some(slot) = self.flags.get_mut(flag_index) {
            *slot = None;
            self.flag_resets.push(flag_index);
        }
    }
}

impl MessageChannel for MemoryServer {
    fn send_to(&mut self, player: PlayerId, text: &str) {
        self.sent.push(SentMessage {
            to: Recipient::Player(player),
            text: text.to_string(),
        });
    }

    fn broadcast(&mut self, text: &str) {
        self.sent.push(SentMessage {
            to: Recipient::All,
            text: text.to_string(),
        });
    }
}

impl SettingsStore for MemoryServer {
    fn publish(&mut self, key: SettingKey, value: &str) {
        self.settings.insert(key.as_str().to_string(), value.to_string());
    }
}
