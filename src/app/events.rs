//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller), the link watchdog and
//! the coordination policies emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (today: the serial log).

use crate::app::commands::CommandSource;
use crate::app::ports::Millis;
use crate::config::PolicyKind;
use crate::coordination::wire::Endpoint;
use crate::coordination::RemoteDecision;
use crate::error::CommsError;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries the policy and initial state).
    Started { policy: PolicyKind, state: StateId },

    /// Debounced presence changed.
    MotionChanged { active: bool },

    /// The actuator state machine transitioned.
    ActuatorChanged {
        from: StateId,
        to: StateId,
        source: CommandSource,
    },

    /// A scheduled check found the station disassociated.
    LinkLost,

    /// A reconnect attempt was issued.
    ReconnectStarted { deadline: Millis },

    /// The link came back during a reconnect attempt.
    LinkRestored { after_ms: Millis, rssi: Option<i8> },

    /// A reconnect attempt used its whole budget.
    ReconnectTimedOut,

    /// A status report was accepted by the server.
    StatusPushed { endpoint: Endpoint, status: u16 },

    /// A coordination request failed. The loop carries on.
    SyncFailed { endpoint: Endpoint, error: CommsError },

    /// The server returned an actionable decision.
    DecisionReceived(RemoteDecision),

    /// Autonomous policy: time left before the load is cut.
    CutoffCountdown { remaining_ms: Millis },
}
