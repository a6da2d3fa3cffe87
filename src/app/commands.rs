//! Inbound requests to the actuator.
//!
//! Whoever decides (local motion, the coordination server, the autonomous
//! timeout) expresses the decision as a [`Decision`], which the
//! [`Controller`](super::service::Controller) applies to the actuator state
//! machine. Nothing else drives the relay.

use crate::coordination::RemoteDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Activate,
    Deactivate,
}

/// Why the actuator changed state. Carried on events for the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Energized at power-on (autonomous policy).
    Boot,
    /// Debounced motion started.
    Motion,
    /// The coordination server decided.
    Remote(RemoteDecision),
    /// No motion for the autonomous off-delay.
    NoMotionTimeout,
    /// The alarm ran its full duration.
    AlarmExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub command: ActuatorCommand,
    pub source: CommandSource,
}

impl Decision {
    pub fn activate(source: CommandSource) -> Self {
        Self {
            command: ActuatorCommand::Activate,
            source,
        }
    }

    pub fn deactivate(source: CommandSource) -> Self {
        Self {
            command: ActuatorCommand::Deactivate,
            source,
        }
    }
}

impl From<RemoteDecision> for Decision {
    fn from(remote: RemoteDecision) -> Self {
        Self {
            command: remote.command(),
            source: CommandSource::Remote(remote),
        }
    }
}
