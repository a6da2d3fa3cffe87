//! Interval bookkeeping for the control loop.
//!
//! Every periodic activity (link check, status push, command poll) is a
//! named counter holding its period and the time it last completed. The
//! controller asks [`SyncSchedule::is_due`] each iteration and stamps the
//! counter with [`SyncSchedule::mark`] once the activity has run, whatever
//! its outcome, so a failing server is retried on the regular cadence.
//!
//! ```text
//!  counter        period        stamped when
//!  ─────────────  ────────────  ──────────────────────────────────
//!  WifiCheck      5 000 ms      check completes (incl. reconnect)
//!  StatusUpdate   2 000 ms      scheduled push attempted
//!  CommandCheck   3 000 ms      command poll attempted
//! ```
//!
//! A counter that has never run is due immediately.

use crate::app::ports::Millis;

// ═══════════════════════════════════════════════════════════════
//  Counter identity
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncCounter {
    WifiCheck = 0,
    StatusUpdate = 1,
    CommandCheck = 2,
}

impl SyncCounter {
    pub const COUNT: usize = 3;

    pub fn label(self) -> &'static str {
        match self {
            Self::WifiCheck => "wifi-check",
            Self::StatusUpdate => "status-update",
            Self::CommandCheck => "command-check",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Millis,
    last: Option<Millis>,
}

// ═══════════════════════════════════════════════════════════════
//  Schedule
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct SyncSchedule {
    slots: [Option<Interval>; SyncCounter::COUNT],
}

impl SyncSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `counter` with the given period. Unregistered counters are
    /// never due.
    pub fn register(&mut self, counter: SyncCounter, period: Millis) {
        self.slots[counter as usize] = Some(Interval { period, last: None });
    }

    pub fn is_registered(&self, counter: SyncCounter) -> bool {
        self.slots[counter as usize].is_some()
    }

    /// `period` has elapsed since `counter` was last stamped (or it never ran).
    pub fn is_due(&self, counter: SyncCounter, now: Millis) -> bool {
        match self.slots[counter as usize] {
            Some(Interval { last: None, .. }) => true,
            Some(Interval {
                period,
                last: Some(last),
            }) => now.saturating_sub(last) >= period,
            None => false,
        }
    }

    /// Record that `counter`'s activity ran at `now`.
    pub fn mark(&mut self, counter: SyncCounter, now: Millis) {
        if let Some(slot) = self.slots[counter as usize].as_mut() {
            slot.last = Some(now);
        }
    }

    pub fn last(&self, counter: SyncCounter) -> Option<Millis> {
        self.slots[counter as usize].and_then(|s| s.last)
    }
}
