use std::time::Duration;

use teamswitch_core::constants::{MSG_BALANCING, MSG_TEAMS_BALANCED, PERMISSION_SWITCH};
use teamswitch_core::{
    BalanceSession, FairnessState, MemoryServer, PlayerId, PlayerRegistry, PlayerSelector,
    SettingKey, TeamId,
};

fn two_team_map() -> MemoryServer {
    MemoryServer::new()
        .with_capacity(TeamId::Red, 10)
        .with_capacity(TeamId::Blue, 10)
        .with_capacity(TeamId::Observers, 4)
}

fn populate(server: &mut MemoryServer, team: TeamId, first: u32, count: u32) {
    for id in first..first + count {
        server.add_player(PlayerId(id), &format!("{team}{id}"), team);
    }
}

const fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[test]
fn persistent_imbalance_is_corrected_after_delay() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 4);
    let mut session = BalanceSession::start(host, "10,1,0,0", PlayerSelector::seeded(42)).unwrap();

    assert!(session.on_tick(secs(0)).is_noop());
    assert_eq!(
        session.controller().state(),
        FairnessState::Unfair { since: secs(0) }
    );
    assert!(session.on_tick(secs(5)).is_noop());

    let report = session.on_tick(secs(11));
    assert_eq!(report.moved.len(), 1);
    let (moved, to) = report.moved[0];
    assert_eq!(to, TeamId::Red);
    assert!((10..14).contains(&moved.0));

    let host = session.host();
    assert_eq!(host.population_of(TeamId::Red), 2);
    assert_eq!(host.population_of(TeamId::Blue), 3);
    assert!(host.respawn_pending(moved));
    assert_eq!(host.broadcasts(), vec![MSG_BALANCING]);
    assert_eq!(host.messages_to(moved).len(), 3);
    assert_eq!(session.controller().state(), FairnessState::Balanced);
}

#[test]
fn recovering_before_the_delay_cancels_the_window() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 4);
    let mut session = BalanceSession::start(host, "10,1", PlayerSelector::seeded(1)).unwrap();

    session.on_tick(secs(0));
    populate(session.host_mut(), TeamId::Red, 2, 3);
    assert!(session.on_tick(secs(4)).is_noop());
    assert_eq!(session.controller().state(), FairnessState::Balanced);
    assert!(session.on_tick(secs(20)).is_noop());
    assert!(session.host().broadcasts().is_empty());
}

#[test]
fn operator_switch_notifies_only_the_moved_player() {
    let mut host = two_team_map().with_capacity(TeamId::Green, 6);
    populate(&mut host, TeamId::Red, 1, 2);
    populate(&mut host, TeamId::Blue, 3, 2);
    host.grant(PlayerId(1), PERMISSION_SWITCH);
    let mut session = BalanceSession::start(host, "", PlayerSelector::seeded(7)).unwrap();

    let report = session.on_command(PlayerId(1), "switch", &["3", "green"]);
    assert_eq!(report.moved, vec![(PlayerId(3), TeamId::Green)]);

    let host = session.host();
    assert_eq!(host.team_of(PlayerId(3)), Some(TeamId::Green));
    assert!(host.respawn_pending(PlayerId(3)));
    let lines = host.messages_to(PlayerId(3));
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("YOU WERE SWITCHED TO THE GREEN TEAM BY RED1"));
    assert!(host.messages_to(PlayerId(1)).is_empty());
    assert!(host.broadcasts().is_empty());
}

#[test]
fn switch_to_a_team_missing_from_the_map_is_refused() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 2);
    host.grant(PlayerId(1), PERMISSION_SWITCH);
    let mut session = BalanceSession::start(host, "", PlayerSelector::seeded(7)).unwrap();

    let report = session.on_command(PlayerId(1), "switch", &["#2", "purple"]);
    assert!(report.moved.is_empty());
    assert_eq!(
        session.host().messages_to(PlayerId(1)),
        vec!["The purple team does not exist on this map."]
    );
    assert_eq!(session.host().team_of(PlayerId(2)), Some(TeamId::Red));
}

#[test]
fn balance_command_runs_even_when_auto_balance_is_off() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 6);
    host.grant(PlayerId(1), PERMISSION_SWITCH);
    let mut session = BalanceSession::start(host, "30,0,0,0", PlayerSelector::seeded(3)).unwrap();

    let report = session.on_command(PlayerId(1), "balance", &[]);
    assert_eq!(report.moved.len(), 2);
    let host = session.host();
    assert_eq!(host.population_of(TeamId::Red), 3);
    assert_eq!(host.population_of(TeamId::Blue), 4);
    assert_eq!(host.broadcasts(), vec![MSG_BALANCING]);
    assert_eq!(
        host.messages_to(PlayerId(1)).last().copied(),
        Some(MSG_TEAMS_BALANCED)
    );
}

#[test]
fn capture_veto_moves_capper_and_returns_flag() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 5);
    host.give_flag(0, PlayerId(12));
    let mut session = BalanceSession::start(host, "30,0,0,1", PlayerSelector::seeded(11)).unwrap();

    let report = session.on_score_attempt(PlayerId(12));
    assert!(!report.allows_capture());
    assert_eq!(report.moved[0], (PlayerId(12), TeamId::Red));
    assert_eq!(report.moved.len(), 2);

    let host = session.host();
    assert_eq!(host.flag_carrier_of(0), None);
    assert_eq!(host.flag_resets(), &[0]);
    assert_eq!(host.population_of(TeamId::Red), 3);
    assert_eq!(host.population_of(TeamId::Blue), 3);
    assert!(host.eliminations().is_empty());
}

#[test]
fn capture_by_weak_team_is_allowed() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 5);
    host.give_flag(1, PlayerId(1));
    let mut session = BalanceSession::start(host, "30,0,0,1", PlayerSelector::seeded(11)).unwrap();

    let report = session.on_score_attempt(PlayerId(1));
    assert!(report.allows_capture());
    assert!(report.is_noop());
    assert_eq!(session.host().flag_carrier_of(1), Some(PlayerId(1)));
}

#[test]
fn captures_in_a_near_even_lineup_go_through() {
    for args in ["30,0,0,1", "30,0,1,0"] {
        let mut host = two_team_map();
        populate(&mut host, TeamId::Red, 1, 2);
        populate(&mut host, TeamId::Blue, 10, 3);
        host.give_flag(0, PlayerId(10));
        let mut session = BalanceSession::start(host, args, PlayerSelector::seeded(3)).unwrap();

        assert!(session.on_score_attempt(PlayerId(10)).is_noop(), "{args}");
        assert!(session.on_score_completed(PlayerId(10)).is_noop(), "{args}");

        let host = session.host();
        assert_eq!(host.flag_carrier_of(0), Some(PlayerId(10)));
        assert_eq!(host.population_of(TeamId::Red), 2);
        assert_eq!(host.population_of(TeamId::Blue), 3);
        assert!(host.broadcasts().is_empty());
    }
}

#[test]
fn completed_capture_eliminates_then_rebalances() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 2);
    populate(&mut host, TeamId::Blue, 10, 6);
    let mut session = BalanceSession::start(host, "30,0,1,0", PlayerSelector::seeded(5)).unwrap();

    let report = session.on_score_completed(PlayerId(13));
    assert_eq!(report.eliminated, vec![PlayerId(13)]);
    assert_eq!(report.moved[0], (PlayerId(13), TeamId::Red));
    assert_eq!(report.moved.len(), 2);
    let host = session.host();
    assert_eq!(host.population_of(TeamId::Red), 4);
    assert_eq!(host.population_of(TeamId::Blue), 4);
    assert_eq!(host.broadcasts(), vec![MSG_BALANCING]);
}

#[test]
fn capture_policies_stay_mutually_exclusive() {
    let mut session =
        BalanceSession::start(two_team_map(), "30,0,1,1", PlayerSelector::seeded(1)).unwrap();
    let config = *session.controller().config();
    assert!(config.disable_capture_with_unfair_teams);
    assert!(!config.balance_on_capture);
    assert_eq!(
        session.host().setting(SettingKey::BalanceOnCapture),
        Some("0")
    );

    assert!(session.on_config_changed(SettingKey::BalanceOnCapture.as_str(), "1"));
    let config = *session.controller().config();
    assert!(config.balance_on_capture);
    assert!(!config.disable_capture_with_unfair_teams);

    assert!(session.on_config_changed(SettingKey::DisableCaptureWithUnfairTeams.as_str(), "1"));
    let config = *session.controller().config();
    assert!(!config.balance_on_capture);
    assert!(config.disable_capture_with_unfair_teams);
}

#[test]
fn switch_to_unknown_slot_replies_not_found() {
    let mut host = two_team_map();
    populate(&mut host, TeamId::Red, 1, 1);
    populate(&mut host, TeamId::Blue, 10, 5);
    host.grant(PlayerId(1), PERMISSION_SWITCH);
    let mut session = BalanceSession::start(host, "", PlayerSelector::seeded(2)).unwrap();

    let report = session.on_command(PlayerId(1), "switch", &["#99", "red"]);
    assert!(report.moved.is_empty());
    assert_eq!(
        session.host().messages_to(PlayerId(1)),
        vec!["player \"#99\" not found"]
    );
}
