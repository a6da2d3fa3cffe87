//! Actuator state machine: the single owner of relay and alarm state.
//!
//! Nothing else in the firmware decides the relay level. Local motion,
//! remote commands and the autonomous timeout all arrive here as
//! [`ActuatorMachine::activate`] / [`ActuatorMachine::deactivate`] calls.

use super::context::{FsmContext, OutputCommands};
use super::{states, Fsm, StateId};
use crate::app::ports::Millis;
use crate::config::AlarmConfig;

/// Externally visible actuator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub state: StateId,
    pub relay_on: bool,
    pub alarm_on: bool,
    pub alarm_started_at: Option<Millis>,
    pub cooldown_until: Millis,
}

pub struct ActuatorMachine {
    fsm: Fsm,
    ctx: FsmContext,
}

impl ActuatorMachine {
    /// Build the machine in `Idle`. `alarm` is `None` on relay-only builds.
    pub fn new(alarm: Option<AlarmConfig>) -> Self {
        Self {
            fsm: Fsm::new(states::build_state_table(), StateId::Idle),
            ctx: FsmContext::new(alarm),
        }
    }

    /// Run `Idle`'s entry action so the outputs start de-energized.
    pub fn start(&mut self, now: Millis) {
        self.ctx.now = now;
        self.fsm.start(&mut self.ctx);
    }

    /// Energize the load. From `Idle` this raises the alarm when one is
    /// configured and not cooling down; otherwise it only closes the relay.
    /// Already-energized states are left as they are.
    ///
    /// Returns `true` if the state changed.
    pub fn activate(&mut self, now: Millis) -> bool {
        self.ctx.now = now;
        if self.fsm.current_state() != StateId::Idle {
            return false;
        }
        let target = if self.ctx.alarm_allowed() {
            StateId::Alerting
        } else {
            StateId::Engaged
        };
        self.fsm.force_transition(target, &mut self.ctx)
    }

    /// De-energize the load and silence any alarm.
    ///
    /// Returns `true` if the state changed.
    pub fn deactivate(&mut self, now: Millis) -> bool {
        self.ctx.now = now;
        self.fsm.force_transition(StateId::Idle, &mut self.ctx)
    }

    /// Advance time-driven behaviour (alarm expiry, buzzer burst).
    ///
    /// Returns `true` if the state changed.
    pub fn tick(&mut self, now: Millis) -> bool {
        self.ctx.now = now;
        self.fsm.tick(&mut self.ctx)
    }

    pub fn state(&self) -> ActuatorState {
        let state = self.fsm.current_state();
        ActuatorState {
            state,
            relay_on: state != StateId::Idle,
            alarm_on: state == StateId::Alerting,
            alarm_started_at: self.ctx.alarm_timing.started_at,
            cooldown_until: self.ctx.alarm_timing.cooldown_until,
        }
    }

    pub fn current_state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Pin levels the current state asks for.
    pub fn outputs(&self) -> OutputCommands {
        self.ctx.commands
    }

    pub fn has_alarm(&self) -> bool {
        self.ctx.alarm.is_some()
    }
}
