//! Scripted server sessions exercising the balance engine end to end.
use anyhow::{Context, Result, ensure};
use std::time::Duration;

use teamswitch_core::constants::{MSG_BALANCING, MSG_TEAMS_BALANCED, PERMISSION_SWITCH};
use teamswitch_core::{
    BalanceSession, FairnessState, MemoryServer, PlayerId, PlayerRegistry, PlayerSelector,
    SettingKey, TeamId,
};

/// A named script run once per seed and iteration.
#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub description: &'static str,
    pub run: fn(u64) -> Result<()>,
}

const CATALOGUE: [TestScenario; 8] = [
    TestScenario {
        key: "persistent-imbalance",
        description: "Unfair teams are balanced once the delay elapses",
        run: persistent_imbalance,
    },
    TestScenario {
        key: "dead-zone",
        description: "Near-even line-ups fire the clock without moving anyone",
        run: dead_zone,
    },
    TestScenario {
        key: "capture-veto",
        description: "Strong-team capture is vetoed and the capper switched",
        run: capture_veto,
    },
    TestScenario {
        key: "capture-rebalance",
        description: "Completed strong-team capture eliminates and rebalances",
        run: capture_rebalance,
    },
    TestScenario {
        key: "operator-switch",
        description: "/switch moves one player and notifies only them",
        run: operator_switch,
    },
    TestScenario {
        key: "balance-command",
        description: "/balance runs a pass regardless of the metric",
        run: balance_command,
    },
    TestScenario {
        key: "mutual-exclusion",
        description: "Capture policies never end up both enabled",
        run: mutual_exclusion,
    },
    TestScenario {
        key: "deterministic-selection",
        description: "Equal seeds pick the same players",
        run: deterministic_selection,
    },
];

#[must_use]
pub fn all_scenarios() -> &'static [TestScenario] {
    &CATALOGUE
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = key.to_lowercase();
    CATALOGUE.iter().copied().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOGUE
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn map() -> MemoryServer {
    MemoryServer::new()
        .with_capacity(TeamId::Red, 16)
        .with_capacity(TeamId::Blue, 16)
        .with_capacity(TeamId::Observers, 4)
}

/// Red players take ids from 1, blue players from 100.
fn lineup(red: u32, blue: u32) -> MemoryServer {
    let mut server = map();
    for id in 1..=red {
        server.add_player(PlayerId(id), &format!("red{id}"), TeamId::Red);
    }
    for id in 100..100 + blue {
        server.add_player(PlayerId(id), &format!("blue{id}"), TeamId::Blue);
    }
    server
}

fn start(server: MemoryServer, args: &str, seed: u64) -> Result<BalanceSession<MemoryServer>> {
    BalanceSession::start(server, args, PlayerSelector::seeded(seed))
        .context("starting balance session")
}

fn populations(session: &BalanceSession<MemoryServer>) -> (u32, u32) {
    let host = session.host();
    (
        host.population_of(TeamId::Red),
        host.population_of(TeamId::Blue),
    )
}

const fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn persistent_imbalance(seed: u64) -> Result<()> {
    let red = 1 + u32::try_from(seed % 3).unwrap_or(0);
    let blue = red + 3 + u32::try_from(seed % 4).unwrap_or(0);
    let mut session = start(lineup(red, blue), "10,1,0,0", seed)?;

    ensure!(session.on_tick(secs(0)).is_noop(), "first tick acted");
    ensure!(
        session.controller().state() == FairnessState::Unfair { since: secs(0) },
        "unfair window not opened"
    );
    ensure!(session.on_tick(secs(5)).is_noop(), "balanced before the delay");

    let report = session.on_tick(secs(11));
    let expected = (blue - red) / 2;
    ensure!(
        report.moved.len() == expected as usize,
        "expected {expected} moves, got {}",
        report.moved.len()
    );
    let (red_after, blue_after) = populations(&session);
    ensure!(
        red_after.abs_diff(blue_after) <= 1,
        "still unbalanced: {red_after} vs {blue_after}"
    );
    for (player, team) in &report.moved {
        ensure!(*team == TeamId::Red, "{player} moved to {team}");
        ensure!(
            session.host().respawn_pending(*player),
            "{player} not respawned"
        );
    }
    ensure!(
        session.host().broadcasts() == [MSG_BALANCING],
        "unexpected broadcasts {:?}",
        session.host().broadcasts()
    );
    Ok(())
}

fn dead_zone(seed: u64) -> Result<()> {
    let (red, blue) = [(2, 3), (3, 2), (1, 2)][usize::try_from(seed % 3).unwrap_or(0)];
    let mut session = start(lineup(red, blue), "5,1", seed)?;
    session.on_tick(secs(0));
    let report = session.on_tick(secs(5));
    ensure!(report.moved.is_empty(), "dead zone moved players");
    ensure!(
        session.controller().state() == FairnessState::Balanced,
        "clock not reset after a declined pass"
    );
    ensure!(populations(&session) == (red, blue), "populations changed");
    Ok(())
}

fn capture_veto(seed: u64) -> Result<()> {
    let blue = 5;
    let capper = PlayerId(100 + u32::try_from(seed % u64::from(blue)).unwrap_or(0));
    let mut server = lineup(1, blue);
    server.give_flag(0, capper);
    let mut session = start(server, "30,0,0,1", seed)?;

    let report = session.on_score_attempt(capper);
    ensure!(!report.allows_capture(), "capture was not vetoed");
    ensure!(
        report.moved.first() == Some(&(capper, TeamId::Red)),
        "capper not switched first: {:?}",
        report.moved
    );
    ensure!(
        session.host().flag_carrier_of(0).is_none(),
        "flag still carried"
    );
    ensure!(populations(&session) == (3, 3), "teams not evened");
    ensure!(
        session.host().eliminations().is_empty(),
        "vetoed capper was eliminated"
    );

    let weak_capper = PlayerId(1);
    let report = session.on_score_attempt(weak_capper);
    ensure!(report.allows_capture(), "fair capture was vetoed");
    Ok(())
}

fn capture_rebalance(seed: u64) -> Result<()> {
    let capper = PlayerId(100 + u32::try_from(seed % 6).unwrap_or(0));
    let mut session = start(lineup(2, 6), "30,0,1,0", seed)?;
    let report = session.on_score_completed(capper);
    ensure!(report.eliminated == [capper], "capper not eliminated");
    ensure!(report.allows_capture(), "completed capture reported as vetoed");
    ensure!(
        session.host().team_of(capper) == Some(TeamId::Red),
        "capper stayed on the strong team"
    );
    ensure!(populations(&session) == (4, 4), "teams not evened");
    Ok(())
}

fn operator_switch(seed: u64) -> Result<()> {
    let mut server = lineup(3, 3).with_capacity(TeamId::Green, 8);
    server.grant(PlayerId(1), PERMISSION_SWITCH);
    let target = PlayerId(100 + u32::try_from(seed % 3).unwrap_or(0));
    let mut session = start(server, "", seed)?;

    let slot = target.0.to_string();
    let report = session.on_command(PlayerId(1), "switch", &[slot.as_str(), "green"]);
    ensure!(
        report.moved == [(target, TeamId::Green)],
        "unexpected moves {:?}",
        report.moved
    );
    let host = session.host();
    ensure!(
        host.messages_to(target).len() == 3,
        "moved player not notified"
    );
    ensure!(
        host.messages_to(PlayerId(1)).is_empty(),
        "operator received a reply"
    );
    ensure!(host.broadcasts().is_empty(), "switch was broadcast");

    let report = session.on_command(PlayerId(2), "switch", &["green"]);
    ensure!(report.moved.is_empty(), "unprivileged switch succeeded");
    Ok(())
}

fn balance_command(seed: u64) -> Result<()> {
    let blue = 4 + u32::try_from(seed % 4).unwrap_or(0);
    let mut server = lineup(1, blue);
    server.grant(PlayerId(1), PERMISSION_SWITCH);
    let mut session = start(server, "30,0,0,0", seed)?;

    let report = session.on_command(PlayerId(1), "balance", &[]);
    ensure!(
        report.moved.len() == ((blue - 1) / 2) as usize,
        "unexpected move count {}",
        report.moved.len()
    );
    ensure!(
        session.host().messages_to(PlayerId(1)).last() == Some(&MSG_TEAMS_BALANCED),
        "operator not told the teams were balanced"
    );
    Ok(())
}

fn mutual_exclusion(seed: u64) -> Result<()> {
    let mut session = start(map(), "30,0,1,1", seed)?;
    let keys = [
        SettingKey::BalanceOnCapture,
        SettingKey::DisableCaptureWithUnfairTeams,
    ];
    for step in 0..4_u64 {
        let key = keys[usize::try_from((seed + step) % 2).unwrap_or(0)];
        session.on_config_changed(key.as_str(), "1");
        let config = session.controller().config();
        ensure!(
            !(config.balance_on_capture && config.disable_capture_with_unfair_teams),
            "both capture policies enabled after {key}"
        );
    }
    Ok(())
}

fn deterministic_selection(seed: u64) -> Result<()> {
    let run = || -> Result<Vec<PlayerId>> {
        let mut session = start(lineup(1, 9), "1,1", seed)?;
        session.on_tick(secs(0));
        let report = session.on_tick(secs(1));
        Ok(report.moved.iter().map(|(player, _)| *player).collect())
    };
    let first = run()?;
    let second = run()?;
    ensure!(!first.is_empty(), "no players moved");
    ensure!(first == second, "selection differs: {first:?} vs {second:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_passes_for_a_few_seeds() {
        for scenario in all_scenarios() {
            for seed in 0..6 {
                if let Err(err) = (scenario.run)(seed) {
                    panic!("{} failed for seed {seed}: {err:#}", scenario.key);
                }
            }
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(get_scenario("Capture-Veto").is_some());
        assert!(get_scenario("smoke").is_none());
        assert_eq!(list_scenarios().len(), all_scenarios().len());
    }
}
