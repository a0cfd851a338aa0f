//! Player-facing notification text.
use crate::action::MoveReason;
use crate::constants::{BANNER_HELP, BANNER_PREFIX, BANNER_SUFFIX};
use crate::team::TeamId;

/// Three-line banner sent to a player who changed teams.
#[must_use]
pub fn switch_banner(reason: &MoveReason, team: TeamId) -> [String; 3] {
    let team = team.as_str().to_uppercase();
    let headline = match reason {
        MoveReason::Balance | MoveReason::SelfSwitch => {
            format!("YOU SWITCHED TO THE {team} TEAM")
        }
        MoveReason::Capture => format!("YOU GOT SWITCHED TO THE {team} TEAM"),
        MoveReason::SwitchedBy { callsign } => format!(
            "YOU WERE SWITCHED TO THE {team} TEAM BY {}",
            callsign.to_uppercase()
        ),
    };
    let body = format!("{{{{{{ {headline} | {BANNER_HELP} }}}}}}");
    let rule = "#".repeat(body.chars().count());
    [frame(&rule), frame(&body), frame(&rule)]
}

fn frame(inner: &str) -> String {
    format!("{BANNER_PREFIX}{inner}{BANNER_SUFFIX}")
}
