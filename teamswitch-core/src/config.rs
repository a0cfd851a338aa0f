//! Balance settings: startup parsing, change notifications and the
//! mutual exclusion between the two capture policies.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    DEFAULT_BALANCE_DELAY_SECS, SETTING_ALWAYS_BALANCE, SETTING_BALANCE_DELAY,
    SETTING_BALANCE_ON_CAPTURE, SETTING_DISABLE_UNFAIR_CAPTURE,
};

/// Errors raised while reading balance settings. All of them are recoverable:
/// callers fall back to defaults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("balance delay must be a positive number of seconds (got {0:?})")]
    InvalidDelay(String),
    #[error("unknown setting key {0:?}")]
    UnknownSetting(String),
}

/// The four settings recognised by the balance engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    BalanceDelay,
    AlwaysBalance,
    BalanceOnCapture,
    DisableCaptureWithUnfairTeams,
}

impl SettingKey {
    pub const ALL: [Self; 4] = [
        Self::BalanceDelay,
        Self::AlwaysBalance,
        Self::BalanceOnCapture,
        Self::DisableCaptureWithUnfairTeams,
    ];

    /// Name of the setting in the server's settings store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceDelay => SETTING_BALANCE_DELAY,
            Self::AlwaysBalance => SETTING_ALWAYS_BALANCE,
            Self::BalanceOnCapture => SETTING_BALANCE_ON_CAPTURE,
            Self::DisableCaptureWithUnfairTeams => SETTING_DISABLE_UNFAIR_CAPTURE,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownSetting(s.to_string()))
    }
}

/// In-memory balance settings.
///
/// `disable_capture_with_unfair_teams` and `balance_on_capture` are never both
/// enabled; enabling one through [`BalanceConfig::apply_change`] clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceConfig {
    #[serde(default = "BalanceConfig::default_delay")]
    pub balance_delay_secs: u32,
    #[serde(default)]
    pub always_balance: bool,
    #[serde(default)]
    pub balance_on_capture: bool,
    #[serde(default)]
    pub disable_capture_with_unfair_teams: bool,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            balance_delay_secs: Self::default_delay(),
            always_balance: false,
            balance_on_capture: false,
            disable_capture_with_unfair_teams: false,
        }
    }
}

impl BalanceConfig {
    const fn default_delay() -> u32 {
        DEFAULT_BALANCE_DELAY_SECS
    }

    /// Parse the comma separated startup arguments
    /// `delay,alwaysBalance,balanceOnCapture,disableCaptureWithUnfairTeams`.
    ///
    /// Missing or malformed fields fall back to their defaults. Boolean fields
    /// are enabled only by the exact token `1`.
    #[must_use]
    pub fn from_startup_args(args: &str) -> Self {
        let mut fields = args.split(',').filter(|field| !field.is_empty());
        let delay_field = fields.next().unwrap_or_default();
        let flag = |field: Option<&str>| field == Some("1");
        let always_balance = flag(fields.next());
        let balance_on_capture = flag(fields.next());
        let disable_capture_with_unfair_teams = flag(fields.next());

        let balance_delay_secs = match parse_delay(delay_field) {
            Ok(delay) => {
                log::debug!("balance delay set to {delay} seconds");
                delay
            }
            Err(err) => {
                log::debug!(
                    "{err}; balance delay automatically set to {DEFAULT_BALANCE_DELAY_SECS} seconds"
                );
                DEFAULT_BALANCE_DELAY_SECS
            }
        };

        let mut cfg = Self {
            balance_delay_secs,
            always_balance,
            balance_on_capture,
            disable_capture_with_unfair_teams,
        };
        if cfg.always_balance {
            log::debug!(
                "teams will be balanced automatically after {balance_delay_secs} seconds of being unfair"
            );
        }
        if cfg.balance_on_capture {
            log::debug!("teams will be automatically balanced after an unfair capture");
        }
        if cfg.disable_capture_with_unfair_teams {
            log::debug!("unfair team captures are disabled and will cause an automatic balance");
            if cfg.balance_on_capture {
                cfg.balance_on_capture = false;
                log::debug!("{SETTING_BALANCE_ON_CAPTURE} has been turned off");
            }
        }
        cfg
    }

    /// Apply a change notification from the settings store.
    ///
    /// Boolean settings accept `1` or `true`; anything else disables them.
    /// Returns whether the stored value changed.
    pub fn apply_change(&mut self, key: SettingKey, value: &str) -> bool {
        let before = *self;
        let enabled = matches!(value, "1" | "true");
        match key {
            SettingKey::BalanceDelay => {
                self.balance_delay_secs = parse_delay(value).unwrap_or_else(|err| {
                    log::debug!("{err}; falling back to {DEFAULT_BALANCE_DELAY_SECS} seconds");
                    DEFAULT_BALANCE_DELAY_SECS
                });
            }
            SettingKey::AlwaysBalance => self.always_balance = enabled,
            SettingKey::BalanceOnCapture => {
                self.balance_on_capture = enabled;
                if enabled {
                    self.disable_capture_with_unfair_teams = false;
                }
            }
            SettingKey::DisableCaptureWithUnfairTeams => {
                self.disable_capture_with_unfair_teams = enabled;
                if enabled {
                    self.balance_on_capture = false;
                }
            }
        }
        *self != before
    }

    /// Store representation of one setting.
    #[must_use]
    pub fn value_of(&self, key: SettingKey) -> String {
        let flag = |enabled: bool| if enabled { "1" } else { "0" }.to_string();
        match key {
            SettingKey::BalanceDelay => self.balance_delay_secs.to_string(),
            SettingKey::AlwaysBalance => flag(self.always_balance),
            SettingKey::BalanceOnCapture => flag(self.balance_on_capture),
            SettingKey::DisableCaptureWithUnfairTeams => {
                flag(self.disable_capture_with_unfair_teams)
            }
        }
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits; trailing
/// garbage is ignored. Values that are not strictly positive are rejected.
fn parse_delay(raw: &str) -> Result<u32, ConfigError> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let invalid = || ConfigError::InvalidDelay(raw.to_string());
    if negative || end == 0 {
        return Err(invalid());
    }
    match digits[..end].parse::<u32>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(delay) => Ok(delay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_defaults_when_empty() {
        assert_eq!(BalanceConfig::from_startup_args(""), BalanceConfig::default());
        let cfg = BalanceConfig::default();
        assert_eq!(cfg.balance_delay_secs, 30);
        assert!(!cfg.always_balance);
    }

    #[test]
    fn startup_parses_all_fields() {
        let cfg = BalanceConfig::from_startup_args("45,1,1,0");
        assert_eq!(cfg.balance_delay_secs, 45);
        assert!(cfg.always_balance);
        assert!(cfg.balance_on_capture);
        assert!(!cfg.disable_capture_with_unfair_teams);
    }

    #[test]
    fn startup_malformed_fields_fall_back() {
        let cfg = BalanceConfig::from_startup_args("soon,yes,true,2");
        assert_eq!(cfg, BalanceConfig::default());

        let cfg = BalanceConfig::from_startup_args("-5,1");
        assert_eq!(cfg.balance_delay_secs, 30);
        assert!(cfg.always_balance);

        assert_eq!(BalanceConfig::from_startup_args("12s").balance_delay_secs, 12);
    }

    #[test]
    fn startup_disable_capture_wins_over_balance_on_capture() {
        let cfg = BalanceConfig::from_startup_args("30,0,1,1");
        assert!(cfg.disable_capture_with_unfair_teams);
        assert!(!cfg.balance_on_capture);
    }

    #[test]
    fn change_enforces_mutual_exclusion() {
        let mut cfg = BalanceConfig {
            disable_capture_with_unfair_teams: true,
            ..BalanceConfig::default()
        };
        assert!(cfg.apply_change(SettingKey::BalanceOnCapture, "true"));
        assert!(cfg.balance_on_capture);
        assert!(!cfg.disable_capture_with_unfair_teams);

        assert!(cfg.apply_change(SettingKey::DisableCaptureWithUnfairTeams, "1"));
        assert!(cfg.disable_capture_with_unfair_teams);
        assert!(!cfg.balance_on_capture);

        // Disabling one does not re-enable the other.
        assert!(cfg.apply_change(SettingKey::DisableCaptureWithUnfairTeams, "0"));
        assert!(!cfg.disable_capture_with_unfair_teams);
        assert!(!cfg.balance_on_capture);
    }

    #[test]
    fn change_delay_and_flags() {
        let mut cfg = BalanceConfig::default();
        assert!(cfg.apply_change(SettingKey::BalanceDelay, "10"));
        assert_eq!(cfg.balance_delay_secs, 10);
        assert!(cfg.apply_change(SettingKey::BalanceDelay, "0"));
        assert_eq!(cfg.balance_delay_secs, 30);
        assert!(cfg.apply_change(SettingKey::AlwaysBalance, "1"));
        assert!(!cfg.apply_change(SettingKey::AlwaysBalance, "true"));
        assert!(cfg.apply_change(SettingKey::AlwaysBalance, "yes"));
        assert!(!cfg.always_balance);
    }

    #[test]
    fn setting_keys_roundtrip_store_names() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>(), Ok(key));
        }
        assert_eq!(
            "_atbSomethingElse".parse::<SettingKey>(),
            Err(ConfigError::UnknownSetting("_atbSomethingElse".to_string()))
        );
    }

    #[test]
    fn values_render_for_the_store() {
        let cfg = BalanceConfig::from_startup_args("15,1,0,1");
        assert_eq!(cfg.value_of(SettingKey::BalanceDelay), "15");
        assert_eq!(cfg.value_of(SettingKey::AlwaysBalance), "1");
        assert_eq!(cfg.value_of(SettingKey::BalanceOnCapture), "0");
        assert_eq!(cfg.value_of(SettingKey::DisableCaptureWithUnfairTeams), "1");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: BalanceConfig = serde_json::from_str(r#"{"always_balance":true}"#).unwrap();
        assert_eq!(cfg.balance_delay_secs, 30);
        assert!(cfg.always_balance);
    }
}
