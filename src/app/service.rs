//! Controller: the hexagonal core of the guardian.
//!
//! [`Controller`] owns every piece of long-lived state (presence debouncer,
//! actuator state machine, link watchdog, coordination policy, interval
//! schedule, indicator pattern) and runs one control iteration per
//! [`Controller::tick`].  All I/O flows through port traits injected at
//! call sites, so the whole loop runs on the host against mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          Controller          │
//! ActuatorPort ◀──│ debounce · FSM · link · sync │◀─▶ CoordinationTransport
//!                 └──────────────────────────────┘
//!                                ▲
//!                         ConnectivityPort
//! ```
//!
//! Iteration order is fixed: link watchdog, presence, actuator timing,
//! coordination, transition report, outputs.  Actuator timing runs before
//! coordination so an alarm that just expired is reflected in the status
//! pushed on the same iteration.

use log::info;

use crate::config::{DeviceConfig, DeviceIdString, PolicyKind};
use crate::connectivity::{ConnectivityState, LinkActivity, LinkState, LinkWatchdog};
use crate::control::debounce::{MotionEdge, PresenceDebouncer, PresenceState};
use crate::coordination::{Coordinator, DeviceView, SyncDue, SyncPolicy};
use crate::drivers::led_patterns::{LedPatternEngine, LinkIndicator, FLASH_CONNECTED, FLASH_MOTION};
use crate::fsm::{ActuatorMachine, ActuatorState};
use crate::scheduler::{SyncCounter, SyncSchedule};

use super::commands::{ActuatorCommand, CommandSource, Decision};
use super::events::AppEvent;
use super::ports::{
    ActuatorPort, ConnectivityPort, CoordinationTransport, EventSink, Millis, SensorPort,
    SensorSnapshot,
};

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    config: DeviceConfig,
    device_id: DeviceIdString,
    presence: PresenceDebouncer,
    actuator: ActuatorMachine,
    link: LinkWatchdog,
    coordinator: Coordinator,
    schedule: SyncSchedule,
    indicator: LedPatternEngine,
    last_snapshot: SensorSnapshot,
    last_tick: Millis,
}

impl Controller {
    /// Build the controller. `device_id` is the resolved identity (see
    /// [`crate::adapters::device_id::resolve`]).
    ///
    /// Does **not** touch any port: call [`start`](Self::start) next.
    pub fn new(config: DeviceConfig, device_id: DeviceIdString) -> Self {
        let presence = PresenceDebouncer::new(config.motion_clear_delay());
        let alarm = config.alarm.filter(|_| config.policy.carries_alarm());
        let actuator = ActuatorMachine::new(alarm);
        let link = LinkWatchdog::new(
            Millis::from(config.reconnect_poll_ms),
            Millis::from(config.reconnect_timeout_ms),
        );
        let coordinator = Coordinator::from_config(&config);

        Self {
            config,
            device_id,
            presence,
            actuator,
            link,
            coordinator,
            schedule: SyncSchedule::new(),
            indicator: LedPatternEngine::new(),
            last_snapshot: SensorSnapshot::default(),
            last_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring every subsystem to its boot state and drive the outputs once.
    pub fn start(
        &mut self,
        now: Millis,
        hw: &mut impl ActuatorPort,
        net: &impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) {
        self.last_tick = now;
        self.actuator.start(now);

        let policy = self.coordinator.kind();
        if policy.requires_link() {
            self.link.start(now, Millis::from(self.config.boot_connect_timeout_ms), net, sink);
            self.schedule
                .register(SyncCounter::WifiCheck, Millis::from(self.config.wifi_check_interval_ms));
            self.schedule.register(
                SyncCounter::StatusUpdate,
                Millis::from(self.config.status_update_interval_ms),
            );
        }
        if policy == PolicyKind::PushCommand {
            self.schedule.register(
                SyncCounter::CommandCheck,
                Millis::from(self.config.command_check_interval_ms),
            );
        }

        sink.emit(&AppEvent::Started {
            policy,
            state: self.actuator.current_state(),
        });
        info!("Controller started (device_id={}, policy={})", self.device_id, policy);

        self.coordinator.on_start(now);
        if self.coordinator.energize_on_start() {
            self.apply(Decision::activate(CommandSource::Boot), now, sink);
        }

        self.update_indicator_base();
        self.write_outputs(hw, 0);
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one control iteration.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick<H, N, T, S>(
        &mut self,
        now: Millis,
        hw: &mut H,
        net: &mut N,
        transport: &mut T,
        sink: &mut S,
    ) where
        H: SensorPort + ActuatorPort,
        N: ConnectivityPort,
        T: CoordinationTransport,
        S: EventSink,
    {
        let delta = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        let mut transitioned = false;

        // 1. Connectivity
        let activity = self.poll_link(now, net, sink);

        // 2. Presence
        self.last_snapshot = hw.read_all();
        let update = self.presence.update(self.last_snapshot.motion_raw, now);
        if let Some(edge) = update.edge {
            sink.emit(&AppEvent::MotionChanged {
                active: edge == MotionEdge::Started,
            });
            if edge == MotionEdge::Started {
                self.indicator.flash(FLASH_MOTION);
                if self.coordinator.kind() == PolicyKind::PushCommand
                    && self.config.auto_activate_on_motion
                {
                    transitioned |=
                        self.apply(Decision::activate(CommandSource::Motion), now, sink);
                }
            }
        }

        // 3. Actuator timing
        let before = self.actuator.current_state();
        if self.actuator.tick(now) {
            transitioned = true;
            sink.emit(&AppEvent::ActuatorChanged {
                from: before,
                to: self.actuator.current_state(),
                source: CommandSource::AlarmExpired,
            });
        }

        // 4. Coordination
        let policy = self.coordinator.kind();
        let link_up = self.link_up(net);
        let due = SyncDue {
            status: self.schedule.is_due(SyncCounter::StatusUpdate, now),
            command: self.schedule.is_due(SyncCounter::CommandCheck, now),
        };
        let run_sync = if policy.requires_link() {
            link_up && due.any()
        } else {
            true
        };
        if run_sync {
            let view = device_view(
                &self.device_id,
                self.presence.state(),
                self.actuator.state(),
                self.last_snapshot.load_sensed,
                self.actuator.has_alarm(),
                net,
            );
            let outcome = self.coordinator.sync(now, due, &view, transport, sink);
            if let Some(decision) = outcome.decision {
                transitioned |= self.apply(decision, now, sink);
            }
            if due.status {
                self.schedule.mark(SyncCounter::StatusUpdate, now);
            }
            if due.command {
                self.schedule.mark(SyncCounter::CommandCheck, now);
            }
        }

        // 5. Transition report
        if transitioned && policy.requires_link() && link_up {
            let view = device_view(
                &self.device_id,
                self.presence.state(),
                self.actuator.state(),
                self.last_snapshot.load_sensed,
                self.actuator.has_alarm(),
                net,
            );
            self.coordinator.on_transition(&view, transport, sink);
        }

        // 6. Outputs
        if activity == LinkActivity::Restored {
            self.indicator.flash(FLASH_CONNECTED);
        }
        self.update_indicator_base();
        self.write_outputs(hw, delta);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn presence(&self) -> PresenceState {
        self.presence.state()
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator.state()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.link.state()
    }

    pub fn link_state(&self) -> LinkState {
        self.link.link_state()
    }

    pub fn policy(&self) -> PolicyKind {
        self.coordinator.kind()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn schedule(&self) -> &SyncSchedule {
        &self.schedule
    }

    // ── Internal ──────────────────────────────────────────────

    /// Apply a decision to the state machine. Returns `true` if it moved.
    fn apply(&mut self, decision: Decision, now: Millis, sink: &mut impl EventSink) -> bool {
        let from = self.actuator.current_state();
        let changed = match decision.command {
            ActuatorCommand::Activate => self.actuator.activate(now),
            ActuatorCommand::Deactivate => self.actuator.deactivate(now),
        };
        if changed {
            sink.emit(&AppEvent::ActuatorChanged {
                from,
                to: self.actuator.current_state(),
                source: decision.source,
            });
        }
        changed
    }

    /// Scheduled check plus reconnect progress. The check counter is
    /// stamped when a check runs and again when a reconnect settles.
    fn poll_link(
        &mut self,
        now: Millis,
        net: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> LinkActivity {
        if !self.schedule.is_registered(SyncCounter::WifiCheck) {
            return LinkActivity::Steady;
        }
        if !self.link.is_reconnecting() && self.schedule.is_due(SyncCounter::WifiCheck, now) {
            self.link.check(now, net, sink);
            self.schedule.mark(SyncCounter::WifiCheck, now);
        }
        let activity = self.link.advance(now, net, sink);
        if activity.completed() {
            self.schedule.mark(SyncCounter::WifiCheck, now);
        }
        activity
    }

    fn link_up(&self, net: &impl ConnectivityPort) -> bool {
        self.link.state().connected && net.is_connected()
    }

    fn update_indicator_base(&mut self) {
        let base = if self.coordinator.kind().requires_link() {
            match self.link.link_state() {
                LinkState::Connected => LinkIndicator::Connected,
                LinkState::Reconnecting { .. } => LinkIndicator::Connecting,
                LinkState::Down => LinkIndicator::Lost,
            }
        } else if self.actuator.state().relay_on {
            // No link to show: mirror the load instead.
            LinkIndicator::Connected
        } else {
            LinkIndicator::Lost
        };
        self.indicator.set_link_pattern(base);
    }

    fn write_outputs(&mut self, hw: &mut impl ActuatorPort, delta: Millis) {
        let outputs = self.actuator.outputs();
        hw.set_relay(outputs.relay);
        hw.set_buzzer(outputs.buzzer);
        let delta = u32::try_from(delta).unwrap_or(u32::MAX);
        hw.set_indicator(self.indicator.tick(delta));
    }
}

fn device_view<'a>(
    device_id: &'a str,
    presence: PresenceState,
    actuator: ActuatorState,
    load_sensed: bool,
    reports_alarm: bool,
    net: &impl ConnectivityPort,
) -> DeviceView<'a> {
    DeviceView {
        device_id,
        presence,
        actuator,
        load_sensed,
        rssi: net.rssi(),
        ip: net.local_ip(),
        reports_alarm,
    }
}
