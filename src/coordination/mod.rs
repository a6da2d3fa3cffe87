//! Coordination client: who decides the relay state.
//!
//! ```text
//!                 ┌────────────────────┐
//!   Controller ──▶│ Coordinator (enum) │──▶ SyncOutcome { decision }
//!                 ├────────────────────┤
//!                 │ Autonomous         │  local no-motion timer
//!                 │ PushCommand        │  POST status, GET command
//!                 │ PushComputed       │  POST facts,  GET relay_state
//!                 └────────────────────┘
//! ```
//!
//! Exactly one policy is active per build, selected by
//! [`PolicyKind`](crate::config::PolicyKind). Policies never touch the
//! actuator: they return a [`Decision`] and the controller applies it.
//! Every network failure is reported through the event sink and swallowed;
//! the loop keeps running on its current state.

pub mod autonomous;
pub mod command;
pub mod computed;
pub mod wire;

use core::net::Ipv4Addr;

use crate::app::commands::{ActuatorCommand, Decision};
use crate::app::events::AppEvent;
use crate::app::ports::{CoordinationTransport, EventSink, HttpMethod, HttpResponse, Millis};
use crate::config::{DeviceConfig, PolicyKind};
use crate::control::debounce::PresenceState;
use crate::error::{CommsError, RequestFailure};
use crate::fsm::ActuatorState;

pub use autonomous::AutonomousPolicy;
pub use command::CommandPolicy;
pub use computed::ComputedPolicy;
use wire::{CommandToken, Endpoint};

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// What the server asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDecision {
    /// Explicit command token (push-command policy).
    Command(CommandToken),
    /// Computed relay state (push-computed policy).
    RelayState(bool),
}

impl RemoteDecision {
    pub fn command(self) -> ActuatorCommand {
        match self {
            Self::Command(CommandToken::RelayOn) | Self::RelayState(true) => {
                ActuatorCommand::Activate
            }
            Self::Command(CommandToken::RelayOff) | Self::RelayState(false) => {
                ActuatorCommand::Deactivate
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs / outputs of a sync round
// ---------------------------------------------------------------------------

/// Which scheduled exchanges fell due this iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncDue {
    pub status: bool,
    pub command: bool,
}

impl SyncDue {
    pub fn any(self) -> bool {
        self.status || self.command
    }
}

/// Read-only view of the device handed to a policy.
#[derive(Debug, Clone, Copy)]
pub struct DeviceView<'a> {
    pub device_id: &'a str,
    pub presence: PresenceState,
    pub actuator: ActuatorState,
    pub load_sensed: bool,
    pub rssi: Option<i8>,
    pub ip: Option<Ipv4Addr>,
    /// Status reports carry the `alarm` field.
    pub reports_alarm: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub decision: Option<Decision>,
    /// Requests that failed this round (already reported to the sink).
    pub failures: u8,
}

impl SyncOutcome {
    /// Count and report a failed request; pass successes through.
    fn record<T>(
        &mut self,
        endpoint: Endpoint,
        res: Result<T, CommsError>,
        sink: &mut impl EventSink,
    ) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(error) => {
                self.failures = self.failures.saturating_add(1);
                sink.emit(&AppEvent::SyncFailed { endpoint, error });
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Policy trait
// ---------------------------------------------------------------------------

/// Per-iteration decision step of a coordination policy.
pub trait SyncPolicy {
    fn kind(&self) -> PolicyKind;

    /// Energize the load as soon as the controller starts.
    fn energize_on_start(&self) -> bool {
        false
    }

    /// Called once from `Controller::start`.
    fn on_start(&mut self, _now: Millis) {}

    /// Run whatever exchanges `due` names and return the resulting decision.
    ///
    /// Networked policies are only called while the link is up.
    fn sync<T, S>(
        &mut self,
        now: Millis,
        due: SyncDue,
        view: &DeviceView<'_>,
        transport: &mut T,
        sink: &mut S,
    ) -> SyncOutcome
    where
        T: CoordinationTransport,
        S: EventSink;

    /// The actuator just changed state; report it right away if this
    /// policy does that. Does not touch the status schedule.
    fn on_transition<T, S>(&mut self, _view: &DeviceView<'_>, _transport: &mut T, _sink: &mut S)
    where
        T: CoordinationTransport,
        S: EventSink,
    {
    }
}

// ---------------------------------------------------------------------------
// Coordinator: the active policy
// ---------------------------------------------------------------------------

pub enum Coordinator {
    Autonomous(AutonomousPolicy),
    PushCommand(CommandPolicy),
    PushComputed(ComputedPolicy),
}

impl Coordinator {
    pub fn from_config(config: &DeviceConfig) -> Self {
        match config.policy {
            PolicyKind::Autonomous => Self::Autonomous(AutonomousPolicy::new(
                Millis::from(config.autonomous_off_delay_ms),
                Millis::from(config.countdown_log_interval_ms),
            )),
            PolicyKind::PushCommand => Self::PushCommand(CommandPolicy::new()),
            PolicyKind::PushComputed => Self::PushComputed(ComputedPolicy::new()),
        }
    }
}

impl SyncPolicy for Coordinator {
    fn kind(&self) -> PolicyKind {
        match self {
            Self::Autonomous(p) => p.kind(),
            Self::PushCommand(p) => p.kind(),
            Self::PushComputed(p) => p.kind(),
        }
    }

    fn energize_on_start(&self) -> bool {
        match self {
            Self::Autonomous(p) => p.energize_on_start(),
            Self::PushCommand(p) => p.energize_on_start(),
            Self::PushComputed(p) => p.energize_on_start(),
        }
    }

    fn on_start(&mut self, now: Millis) {
        match self {
            Self::Autonomous(p) => p.on_start(now),
            Self::PushCommand(p) => p.on_start(now),
            Self::PushComputed(p) => p.on_start(now),
        }
    }

    fn sync<T, S>(
        &mut self,
        now: Millis,
        due: SyncDue,
        view: &DeviceView<'_>,
        transport: &mut T,
        sink: &mut S,
    ) -> SyncOutcome
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        match self {
            Self::Autonomous(p) => p.sync(now, due, view, transport, sink),
            Self::PushCommand(p) => p.sync(now, due, view, transport, sink),
            Self::PushComputed(p) => p.sync(now, due, view, transport, sink),
        }
    }

    fn on_transition<T, S>(&mut self, view: &DeviceView<'_>, transport: &mut T, sink: &mut S)
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        match self {
            Self::Autonomous(p) => p.on_transition(view, transport, sink),
            Self::PushCommand(p) => p.on_transition(view, transport, sink),
            Self::PushComputed(p) => p.on_transition(view, transport, sink),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared request helpers
// ---------------------------------------------------------------------------

/// Issue one request; any non-2xx status is a failure.
fn exchange(
    transport: &mut impl CoordinationTransport,
    method: HttpMethod,
    endpoint: Endpoint,
    body: Option<&[u8]>,
) -> Result<HttpResponse, CommsError> {
    let resp = transport.request(method, endpoint.path(), body)?;
    if !resp.is_success() {
        return Err(CommsError::RequestFailed(RequestFailure::Status(resp.status)));
    }
    Ok(resp)
}

/// POST a status payload and report the accepted status code.
fn push_status(
    transport: &mut impl CoordinationTransport,
    payload: &[u8],
    sink: &mut impl EventSink,
) -> Result<(), CommsError> {
    let resp = exchange(transport, HttpMethod::Post, Endpoint::Status, Some(payload))?;
    sink.emit(&AppEvent::StatusPushed {
        endpoint: Endpoint::Status,
        status: resp.status,
    });
    Ok(())
}
