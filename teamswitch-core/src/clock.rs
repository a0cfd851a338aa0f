//! Tracks how long the tracked teams have been unfair.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fairness state owned by the controller.
///
/// `Unfair::since` is the first tick at which the current unfair window was
/// observed; it is never refreshed while the window lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessState {
    #[default]
    Balanced,
    Unfair { since: Duration },
}

impl FairnessState {
    #[must_use]
    pub const fn is_uneven(&self) -> bool {
        matches!(self, Self::Unfair { .. })
    }

    #[must_use]
    pub const fn uneven_since(&self) -> Option<Duration> {
        match self {
            Self::Unfair { since } => Some(*since),
            Self::Balanced => None,
        }
    }
}

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockTransition {
    /// Fair and already balanced.
    Steady,
    BecameUnfair,
    StillUnfair { elapsed: Duration },
    BecameFair,
    /// Unfair for at least the configured delay; a balance pass is due and the
    /// clock has been reset.
    Expired { elapsed: Duration },
}

impl ClockTransition {
    #[must_use]
    pub const fn should_balance(self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// Pure transition of the fairness state for one tick.
#[derive(Debug, Clone, Copy)]
pub struct BalanceClock {
    delay: Duration,
}

impl BalanceClock {
    #[must_use]
    pub const fn new(delay_secs: u32) -> Self {
        Self {
            delay: Duration::from_secs(delay_secs as u64),
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Advance `state` with the fairness observed at `now`.
    pub fn observe(&self, state: &mut FairnessState, now: Duration, unfair: bool) -> ClockTransition {
        match (*state, unfair) {
            (FairnessState::Balanced, false) => ClockTransition::Steady,
            (FairnessState::Balanced, true) => {
                *state = FairnessState::Unfair { since: now };
                log::debug!("teams became unfair at {:.1}s", now.as_secs_f64());
                ClockTransition::BecameUnfair
            }
            (FairnessState::Unfair { .. }, false) => {
                *state = FairnessState::Balanced;
                log::debug!("teams are fair again at {:.1}s", now.as_secs_f64());
                ClockTransition::BecameFair
            }
            (FairnessState::Unfair { since }, true) => {
                let elapsed = now.saturating_sub(since);
                if elapsed >= self.delay {
                    *state = FairnessState::Balanced;
                    ClockTransition::Expired { elapsed }
                } else {
                    ClockTransition::StillUnfair { elapsed }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn fair_ticks_never_start_a_window() {
        let clock = BalanceClock::new(30);
        let mut state = FairnessState::default();
        for t in 0..5 {
            assert_eq!(clock.observe(&mut state, secs(t), false), ClockTransition::Steady);
            assert_eq!(state.uneven_since(), None);
        }
    }

    #[test]
    fn delay_boundary_fires_exactly_once() {
        let clock = BalanceClock::new(30);
        let mut state = FairnessState::default();
        assert_eq!(
            clock.observe(&mut state, secs(0), true),
            ClockTransition::BecameUnfair
        );
        assert!(!clock.observe(&mut state, secs(29), true).should_balance());
        assert_eq!(state.uneven_since(), Some(secs(0)));
        assert!(clock.observe(&mut state, secs(30), true).should_balance());
        assert_eq!(state, FairnessState::Balanced);
        // The next unfair tick opens a new window instead of firing again.
        assert_eq!(
            clock.observe(&mut state, secs(31), true),
            ClockTransition::BecameUnfair
        );
        assert_eq!(state.uneven_since(), Some(secs(31)));
    }

    #[test]
    fn single_fair_tick_restarts_the_window() {
        let clock = BalanceClock::new(10);
        let mut state = FairnessState::default();
        clock.observe(&mut state, secs(0), true);
        clock.observe(&mut state, secs(8), true);
        assert_eq!(
            clock.observe(&mut state, secs(9), false),
            ClockTransition::BecameFair
        );
        assert!(!state.is_uneven());
        clock.observe(&mut state, secs(10), true);
        assert_eq!(
            clock.observe(&mut state, secs(15), true),
            ClockTransition::StillUnfair { elapsed: secs(5) }
        );
        assert!(clock.observe(&mut state, secs(20), true).should_balance());
    }

    #[test]
    fn window_measures_from_first_unfair_tick() {
        let clock = BalanceClock::new(10);
        let mut state = FairnessState::default();
        clock.observe(&mut state, secs(0), true);
        for t in 1..10 {
            clock.observe(&mut state, secs(t), true);
            assert_eq!(state.uneven_since(), Some(secs(0)));
        }
        assert_eq!(
            clock.observe(&mut state, secs(11), true),
            ClockTransition::Expired { elapsed: secs(11) }
        );
    }
}
