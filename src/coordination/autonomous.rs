//! Autonomous policy: no server, a local no-motion timer.
//!
//! The load is energized at boot and whenever motion is seen. Once
//! `off_delay` passes without a positive PIR sample the load is cut.
//! Runs every iteration whether or not the link is up.

use crate::app::commands::{CommandSource, Decision};
use crate::app::events::AppEvent;
use crate::app::ports::{CoordinationTransport, EventSink, Millis};
use crate::config::PolicyKind;

use super::{DeviceView, SyncDue, SyncOutcome, SyncPolicy};

pub struct AutonomousPolicy {
    off_delay: Millis,
    countdown_interval: Millis,
    /// No-motion time is measured from here until the first motion.
    started_at: Millis,
    last_countdown: Option<Millis>,
}

impl AutonomousPolicy {
    pub fn new(off_delay: Millis, countdown_interval: Millis) -> Self {
        Self {
            off_delay,
            countdown_interval,
            started_at: 0,
            last_countdown: None,
        }
    }

    fn countdown_due(&self, now: Millis) -> bool {
        self.last_countdown
            .is_none_or(|last| now.saturating_sub(last) >= self.countdown_interval)
    }
}

impl SyncPolicy for AutonomousPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Autonomous
    }

    fn energize_on_start(&self) -> bool {
        true
    }

    fn on_start(&mut self, now: Millis) {
        self.started_at = now;
        self.last_countdown = None;
    }

    fn sync<T, S>(
        &mut self,
        now: Millis,
        _due: SyncDue,
        view: &DeviceView<'_>,
        _transport: &mut T,
        sink: &mut S,
    ) -> SyncOutcome
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        let mut outcome = SyncOutcome::default();

        if view.presence.active {
            self.last_countdown = None;
            if !view.actuator.relay_on {
                outcome.decision = Some(Decision::activate(CommandSource::Motion));
            }
            return outcome;
        }

        if !view.actuator.relay_on {
            return outcome;
        }

        let last_motion = self.started_at.max(view.presence.last_true_timestamp);
        let idle = now.saturating_sub(last_motion);
        if idle >= self.off_delay {
            self.last_countdown = None;
            outcome.decision = Some(Decision::deactivate(CommandSource::NoMotionTimeout));
        } else if self.countdown_due(now) {
            self.last_countdown = Some(now);
            sink.emit(&AppEvent::CutoffCountdown {
                remaining_ms: self.off_delay - idle,
            });
        }

        outcome
    }
}
