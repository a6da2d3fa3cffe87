//! Shared mutable context threaded through every actuator-FSM handler.
//!
//! `FsmContext` is the "blackboard" the state handlers read timing and
//! alarm settings from, and write output commands and alarm bookkeeping to.
//! The controller applies [`OutputCommands`] to the real pins each loop.

use crate::app::ports::Millis;
use crate::config::AlarmConfig;
use crate::drivers::buzzer::BurstState;

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; consumed by the controller)
// ---------------------------------------------------------------------------

/// Desired pin levels, in logical terms (polarity is the drivers' concern).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCommands {
    pub relay: bool,
    pub buzzer: bool,
}

impl OutputCommands {
    /// Relay open, buzzer silent.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Alarm bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmTiming {
    /// Set while `Alerting`.
    pub started_at: Option<Millis>,
    /// No new alarm may start before this instant.
    pub cooldown_until: Millis,
    pub burst: BurstState,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    /// Alarm settings; `None` on relay-only builds.
    pub alarm: Option<AlarmConfig>,
    pub alarm_timing: AlarmTiming,
    pub commands: OutputCommands,
    /// Timestamp of the current tick or transition request.
    pub now: Millis,
    /// When the current state was entered.
    pub entered_at: Millis,
}

impl FsmContext {
    pub fn new(alarm: Option<AlarmConfig>) -> Self {
        Self {
            alarm,
            alarm_timing: AlarmTiming::default(),
            commands: OutputCommands::all_off(),
            now: 0,
            entered_at: 0,
        }
    }

    /// Time spent in the current state.
    pub fn ms_in_state(&self) -> Millis {
        self.now.saturating_sub(self.entered_at)
    }

    /// Whether a new alarm may be raised at `self.now`.
    pub fn alarm_allowed(&self) -> bool {
        self.alarm.is_some() && self.now >= self.alarm_timing.cooldown_until
    }
}
