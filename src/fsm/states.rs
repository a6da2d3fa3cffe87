//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!            activate (alarm disabled or cooling down)
//!  IDLE ───────────────────────────────────────────▶ ENGAGED
//!   │ ▲                                                 ▲ │
//!   │ └────────────── deactivate ───────────────────────┼─┘
//!   │ activate (alarm ready)                            │
//!   ▼                                    [alarm_duration elapsed]
//!  ALERTING ────────────────────────────────────────────┘
//!     └──── deactivate ───▶ IDLE   (cooldown starts now)
//! ```
//!
//! `activate` / `deactivate` are requested through
//! [`Fsm::force_transition`](super::Fsm::force_transition); only the
//! alarm expiry is decided by an `on_update` handler.

use log::info;

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::ports::Millis;
use crate::drivers::buzzer::BurstState;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Engaged
        StateDescriptor {
            id: StateId::Engaged,
            name: "Engaged",
            on_enter: Some(engaged_enter),
            on_exit: None,
            on_update: engaged_update,
        },
        // Index 2: Alerting
        StateDescriptor {
            id: StateId::Alerting,
            name: "Alerting",
            on_enter: Some(alerting_enter),
            on_exit: Some(alerting_exit),
            on_update: alerting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: load de-energized
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.commands.relay = false;
    ctx.commands.buzzer = false;
    info!("IDLE: relay open");
}

fn idle_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENGAGED state: load energized, no alarm
// ═══════════════════════════════════════════════════════════════════════════

fn engaged_enter(ctx: &mut FsmContext) {
    ctx.commands.relay = true;
    ctx.commands.buzzer = false;
    info!("ENGAGED: relay closed");
}

fn engaged_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALERTING state: load energized, alarm raised
// ═══════════════════════════════════════════════════════════════════════════

fn alerting_enter(ctx: &mut FsmContext) {
    ctx.commands.relay = true;
    ctx.alarm_timing.started_at = Some(ctx.now);
    if let Some(alarm) = ctx.alarm {
        ctx.alarm_timing.burst = BurstState::start(
            ctx.now,
            alarm.burst_cycles,
            Millis::from(alarm.burst_period_ms),
        );
        info!(
            "ALERTING: relay closed, alarm raised for {} ms",
            alarm.duration_ms
        );
    }
    ctx.commands.buzzer = ctx.alarm_timing.burst.level();
}

fn alerting_exit(ctx: &mut FsmContext) {
    // Cut short or expired, the cooldown runs from the moment the alarm stops.
    let cooldown = ctx.alarm.map_or(0, |a| Millis::from(a.cooldown_ms));
    ctx.alarm_timing.started_at = None;
    ctx.alarm_timing.cooldown_until = ctx.now + cooldown;
    ctx.alarm_timing.burst = BurstState::Idle;
    ctx.commands.buzzer = false;
    info!("ALERTING: alarm cleared, cooldown until {} ms", ctx.alarm_timing.cooldown_until);
}

fn alerting_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.alarm_timing.burst.advance(ctx.now);
    ctx.commands.buzzer = ctx.alarm_timing.burst.level();

    let duration = ctx.alarm.map_or(0, |a| Millis::from(a.duration_ms));
    if ctx.ms_in_state() >= duration {
        return Some(StateId::Engaged);
    }

    None
}
