//! Side-effect intents produced by the controller and applied by the executor.
use serde::{Deserialize, Serialize};

use crate::config::SettingKey;
use crate::host::PlayerId;
use crate::team::TeamId;

/// Why a player is being moved; selects the notification they receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MoveReason {
    /// Part of a balance pass.
    Balance,
    /// The player capped (or tried to cap) while on the strong team.
    Capture,
    /// The player switched themself with `/switch <team>`.
    SelfSwitch,
    /// An operator switched the player.
    SwitchedBy { callsign: String },
}

/// One player moving from one team to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMoveIntent {
    pub player: PlayerId,
    pub from: TeamId,
    pub to: TeamId,
    pub reason: MoveReason,
}

/// Host mutation requested by a controller transition, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum BalanceAction {
    /// Cancel the pending capture before points are awarded.
    VetoCapture,
    /// Return any team flag carried by the player to its neutral position.
    ResetCarriedFlag { player: PlayerId },
    Eliminate { player: PlayerId },
    Move(PlayerMoveIntent),
    Broadcast { text: String },
    Reply { to: PlayerId, text: String },
    PublishSetting { key: SettingKey, value: String },
}

impl BalanceAction {
    #[must_use]
    pub fn broadcast(text: &str) -> Self {
        Self::Broadcast {
            text: text.to_string(),
        }
    }

    #[must_use]
    pub fn reply(to: PlayerId, text: impl Into<String>) -> Self {
        Self::Reply {
            to,
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn as_move(&self) -> Option<&PlayerMoveIntent> {
        match self {
            Self::Move(intent) => Some(intent),
            _ => None,
        }
    }
}
