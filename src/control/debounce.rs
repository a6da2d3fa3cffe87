//! Presence debouncer for the PIR input.
//!
//! Asymmetric filter: presence asserts on the first positive sample and
//! only clears once no positive sample has been seen for `clear_delay`.
//! Every positive sample re-arms the hold timer, so a person moving
//! intermittently keeps the room "occupied".
//!
//! ```text
//!  raw     ▁▁█▁▁▁█▁▁▁▁▁▁▁▁▁▁▁▁▁
//!  active  ▁▁███████████████▁▁▁
//!                ◄─ clear_delay ─►
//! ```

use crate::app::ports::Millis;

/// Debounced presence as seen by the rest of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceState {
    pub active: bool,
    /// Time of the most recent positive raw sample (0 before the first one).
    pub last_true_timestamp: Millis,
}

/// Edge of the debounced signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEdge {
    Started,
    Cleared,
}

/// Result of feeding one raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub state: PresenceState,
    /// `Some` exactly when `state.active` changed on this sample.
    pub edge: Option<MotionEdge>,
}

pub struct PresenceDebouncer {
    clear_delay: Millis,
    state: PresenceState,
}

impl PresenceDebouncer {
    pub fn new(clear_delay: Millis) -> Self {
        Self {
            clear_delay,
            state: PresenceState::default(),
        }
    }

    /// Feed one raw sample taken at `now`.
    ///
    /// A clock that steps backwards is treated as zero elapsed time, so a
    /// held presence never clears early.
    pub fn update(&mut self, raw: bool, now: Millis) -> PresenceUpdate {
        let was_active = self.state.active;

        if raw {
            self.state.active = true;
            self.state.last_true_timestamp = now;
        } else if was_active
            && now.saturating_sub(self.state.last_true_timestamp) >= self.clear_delay
        {
            self.state.active = false;
        }

        let edge = match (was_active, self.state.active) {
            (false, true) => Some(MotionEdge::Started),
            (true, false) => Some(MotionEdge::Cleared),
            _ => None,
        };

        PresenceUpdate {
            state: self.state,
            edge,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }
}
