use serde_json::{Value, json};
use teamswitch_core::{
    BalanceAction, BalanceConfig, ExecutionReport, MoveReason, PlayerId, PlayerMoveIntent,
    SettingKey, TeamId,
};

#[test]
fn balance_config_defaults_fill_missing_fields() {
    let config: BalanceConfig = serde_json::from_value(json!({ "always_balance": true })).unwrap();
    assert_eq!(config.balance_delay_secs, 30);
    assert!(config.always_balance);
    assert!(!config.balance_on_capture);
    assert!(!config.disable_capture_with_unfair_teams);
}

#[test]
fn move_action_shape() {
    let action = BalanceAction::Move(PlayerMoveIntent {
        player: PlayerId(4),
        from: TeamId::Blue,
        to: TeamId::Red,
        reason: MoveReason::SwitchedBy {
            callsign: "ref".to_string(),
        },
    });
    let value = serde_json::to_value(&action).unwrap();
    assert_eq!(
        value,
        json!({
            "action": "move",
            "player": 4,
            "from": "blue",
            "to": "red",
            "reason": { "kind": "switched_by", "callsign": "ref" }
        })
    );
}

#[test]
fn setting_and_observer_names() {
    let publish = BalanceAction::PublishSetting {
        key: SettingKey::BalanceDelay,
        value: "30".to_string(),
    };
    let value = serde_json::to_value(&publish).unwrap();
    assert_eq!(value["action"], "publish_setting");
    assert_eq!(value["key"], "balance_delay");
    assert_eq!(
        serde_json::to_value(TeamId::Observers).unwrap(),
        Value::from("observer")
    );
}

#[test]
fn execution_report_serializes_moves_as_pairs() {
    let report = ExecutionReport {
        moved: vec![(PlayerId(2), TeamId::Green)],
        capture_vetoed: true,
        ..ExecutionReport::default()
    };
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["moved"], json!([[2, "green"]]));
    assert_eq!(value["capture_vetoed"], true);
}
