//! Teamswitch Balance Engine
//!
//! Platform-agnostic automatic team balancing for two-team capture-the-flag sessions.
//! This crate decides who changes teams and when; the game server is reached only
//! through the traits in [`host`].

pub mod action;
pub mod clock;
pub mod command;
pub mod config;
pub mod constants;
pub mod controller;
pub mod executor;
pub mod fairness;
pub mod host;
pub mod memory;
pub mod messages;
pub mod rng;
pub mod selector;
pub mod session;
pub mod team;

// Re-export commonly used types
pub use action::{BalanceAction, MoveReason, PlayerMoveIntent};
pub use clock::{BalanceClock, ClockTransition, FairnessState};
pub use command::{CommandError, OperatorCommand, SwitchTarget};
pub use config::{BalanceConfig, ConfigError, SettingKey};
pub use controller::BalanceController;
pub use executor::{BalanceExecutor, ExecutionReport};
pub use fairness::{Fairness, TeamPopulationSnapshot, bonus};
pub use host::{
    BalanceHost, FlagControl, MessageChannel, PlayerId, PlayerRecord, PlayerRegistry,
    SettingsStore,
};
pub use memory::{MemoryPlayer, MemoryServer, Recipient, SentMessage};
pub use messages::switch_banner;
pub use rng::CountingRng;
pub use selector::{DeclineReason, PlayerSelector, SelectionOutcome, TeamLineup};
pub use session::BalanceSession;
pub use team::{TeamDetectionError, TeamId, TeamSlot, TrackedTeams};
