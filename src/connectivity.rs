//! Link watchdog: notices a dropped WiFi association and recovers it
//! without ever blocking the control loop.
//!
//! ```text
//!            check: down                     poll: up
//!  Connected ───────────▶ Reconnecting ───────────────▶ Connected
//!      ▲                   │   ▲   │
//!      │ check: up         │   └───┘ poll: still down, before deadline
//!      │                   ▼ deadline passed
//!      └───────────────── Down
//! ```
//!
//! The controller calls [`LinkWatchdog::check`] when the link-check
//! interval falls due, and [`LinkWatchdog::advance`] every iteration.
//! While `Reconnecting`, the link is only polled every `poll_interval`; the
//! attempt is abandoned at `deadline` and retried at the next scheduled
//! check.

use crate::app::events::AppEvent;
use crate::app::ports::{ConnectivityPort, EventSink, Millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    /// Last attempt timed out; waiting for the next scheduled check.
    Down,
    Reconnecting {
        started: Millis,
        deadline: Millis,
        next_poll: Millis,
    },
}

/// Snapshot for the rest of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub connected: bool,
    /// When the most recent check (including any reconnect) completed.
    pub last_check_timestamp: Millis,
}

/// Result of [`LinkWatchdog::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkActivity {
    /// Not reconnecting.
    Steady,
    /// Reconnect in progress.
    Waiting,
    Restored,
    TimedOut,
}

impl LinkActivity {
    /// The reconnect attempt ended, successfully or not.
    pub fn completed(self) -> bool {
        matches!(self, Self::Restored | Self::TimedOut)
    }
}

pub struct LinkWatchdog {
    state: LinkState,
    last_check: Millis,
    poll_interval: Millis,
    timeout: Millis,
}

impl LinkWatchdog {
    pub fn new(poll_interval: Millis, timeout: Millis) -> Self {
        Self {
            state: LinkState::Down,
            last_check: 0,
            poll_interval,
            timeout,
        }
    }

    /// Adopt the station's state at boot. If the first association is still
    /// in flight, wait up to `boot_timeout` for it without issuing another
    /// connect.
    pub fn start(
        &mut self,
        now: Millis,
        boot_timeout: Millis,
        net: &impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) {
        self.last_check = now;
        if net.is_connected() {
            self.state = LinkState::Connected;
        } else {
            self.enter_reconnecting(now, boot_timeout, sink);
        }
    }

    /// Scheduled link check. A no-op while a reconnect is already running.
    pub fn check(
        &mut self,
        now: Millis,
        net: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> ConnectivityState {
        if self.is_reconnecting() {
            return self.state();
        }

        if net.is_connected() {
            self.state = LinkState::Connected;
            self.last_check = now;
        } else {
            if self.state == LinkState::Connected {
                sink.emit(&AppEvent::LinkLost);
            }
            net.begin_reconnect();
            self.enter_reconnecting(now, self.timeout, sink);
        }

        self.state()
    }

    /// Progress an in-flight reconnect. Cheap when there is none.
    pub fn advance(
        &mut self,
        now: Millis,
        net: &impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> LinkActivity {
        let LinkState::Reconnecting {
            started,
            deadline,
            next_poll,
        } = self.state
        else {
            return LinkActivity::Steady;
        };

        if now < next_poll {
            return LinkActivity::Waiting;
        }

        if net.is_connected() {
            self.state = LinkState::Connected;
            self.last_check = now;
            sink.emit(&AppEvent::LinkRestored {
                after_ms: now.saturating_sub(started),
                rssi: net.rssi(),
            });
            return LinkActivity::Restored;
        }

        if now >= deadline {
            self.state = LinkState::Down;
            self.last_check = now;
            sink.emit(&AppEvent::ReconnectTimedOut);
            return LinkActivity::TimedOut;
        }

        self.state = LinkState::Reconnecting {
            started,
            deadline,
            next_poll: now + self.poll_interval,
        };
        LinkActivity::Waiting
    }

    pub fn state(&self) -> ConnectivityState {
        ConnectivityState {
            connected: self.state == LinkState::Connected,
            last_check_timestamp: self.last_check,
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.state
    }

    pub fn is_reconnecting(&self) -> bool {
        matches!(self.state, LinkState::Reconnecting { .. })
    }

    fn enter_reconnecting(&mut self, now: Millis, budget: Millis, sink: &mut impl EventSink) {
        let deadline = now + budget;
        self.state = LinkState::Reconnecting {
            started: now,
            deadline,
            next_poll: now + self.poll_interval,
        };
        sink.emit(&AppEvent::ReconnectStarted { deadline });
    }
}
