//! Operator commands `/switch` and `/balance`.
use thiserror::Error;

use crate::constants::{COMMAND_BALANCE, COMMAND_SWITCH};
use crate::host::PlayerId;

/// Command failures. The `Display` text is the reply sent to the operator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Syntax: /switch <player slot> rogue|red|green|blue|purple|observer")]
    Usage,
    #[error("player \"{0}\" not found")]
    PlayerNotFound(String),
    #[error(
        "Warning: In order to prevent bzadmin clients from crashing, you cannot 'switch' bzadmin clients."
    )]
    ProtectedClient,
    #[error("The {0} team does not exist.")]
    UnknownTeam(String),
    #[error("The {0} team does not exist on this map.")]
    TeamNotOnMap(String),
    #[error("You do not have permission to run the /{0} command.")]
    Forbidden(String),
    #[error("Unknown command [{0}]")]
    UnknownCommand(String),
}

/// Whose team `/switch` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchTarget {
    /// `/switch <team>` moves the issuing player.
    Caller,
    /// `/switch <slot> <team>`; `raw` is kept for the not-found reply.
    Slot { id: Option<PlayerId>, raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Switch { target: SwitchTarget, team: String },
    Balance,
}

impl OperatorCommand {
    /// Name of a recognised command, used for the permission check.
    #[must_use]
    pub fn recognise(command: &str) -> Option<&'static str> {
        [COMMAND_SWITCH, COMMAND_BALANCE]
            .into_iter()
            .find(|known| *known == command)
    }

    /// Parse a command line already split into name and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for other commands and
    /// [`CommandError::Usage`] when `/switch` has the wrong number of arguments.
    pub fn parse(command: &str, params: &[&str]) -> Result<Self, CommandError> {
        match command {
            COMMAND_SWITCH => match params {
                [team] => Ok(Self::Switch {
                    target: SwitchTarget::Caller,
                    team: (*team).to_string(),
                }),
                [slot, team] => Ok(Self::Switch {
                    target: SwitchTarget::Slot {
                        id: parse_slot(slot),
                        raw: (*slot).to_string(),
                    },
                    team: (*team).to_string(),
                }),
                _ => Err(CommandError::Usage),
            },
            COMMAND_BALANCE => Ok(Self::Balance),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Slot references are written `#3`; a bare `3` is accepted too.
fn parse_slot(raw: &str) -> Option<PlayerId> {
    let digits = raw.strip_prefix('#').unwrap_or(raw);
    digits.parse().ok().map(PlayerId)
}
