//! LED pattern engine with priority-based pattern selection.
//!
//! Generates the time-varying level of the single status LED. The
//! controller calls `tick()` every loop iteration with the elapsed time and
//! writes the returned level to the indicator pin.
//!
//! ## Priority hierarchy (highest first)
//!
//! 1. **Event flash**: a finite burst (motion seen, link restored), then
//!    the layer clears itself
//! 2. **Link**: standing pattern reflecting WiFi state
//!
//! ## Pattern types
//!
//! | Pattern   | Description                          | Rate        |
//! |-----------|--------------------------------------|-------------|
//! | Solid     | Constant on                          |:           |
//! | Off       | Constant off                         |:           |
//! | SlowBlink | On/off square wave                   | 1 Hz        |
//! | Flash     | `count` on/off pairs, then finished  | per request |

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Solid,
    Off,
    SlowBlink,
    Flash { count: u8, period_ms: u32 },
}

/// Standing pattern for each link condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkIndicator {
    Connecting,
    Connected,
    Lost,
}

impl LinkIndicator {
    fn pattern(self) -> PatternId {
        match self {
            Self::Connecting => PatternId::SlowBlink,
            Self::Connected => PatternId::Solid,
            Self::Lost => PatternId::Off,
        }
    }
}

/// Motion seen: five quick blinks.
pub const FLASH_MOTION: PatternId = PatternId::Flash {
    count: 5,
    period_ms: 200,
};
/// Link (re)established: two slow blinks.
pub const FLASH_CONNECTED: PatternId = PatternId::Flash {
    count: 2,
    period_ms: 300,
};

/// A pattern request with its layer priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PatternRequest {
    pattern: PatternId,
    priority: u8,
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedPatternEngine {
    phase_ms: u32,
    active: Option<PatternRequest>,
    flash_request: Option<PatternRequest>,
    link_request: Option<PatternRequest>,
    /// Restart the phase on the next tick even if the pattern is unchanged.
    restart: bool,
}

impl Default for LedPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPatternEngine {
    pub fn new() -> Self {
        Self {
            phase_ms: 0,
            active: None,
            flash_request: None,
            link_request: None,
            restart: false,
        }
    }

    /// Set the link-layer pattern (priority 2: lowest).
    pub fn set_link_pattern(&mut self, link: LinkIndicator) {
        self.link_request = Some(PatternRequest {
            pattern: link.pattern(),
            priority: 2,
        });
    }

    /// Start a finite flash overlay (priority 1). Re-triggering restarts it.
    pub fn flash(&mut self, pattern: PatternId) {
        self.flash_request = Some(PatternRequest {
            pattern,
            priority: 1,
        });
        self.restart = true;
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_request.is_some()
    }

    /// Clear all patterns: LED will be off.
    pub fn clear_all(&mut self) {
        self.flash_request = None;
        self.link_request = None;
        self.active = None;
        self.phase_ms = 0;
    }

    /// Advance the pattern phase and return the LED level.
    /// `delta_ms` is the time since the last call.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        self.phase_ms = self.phase_ms.saturating_add(delta_ms);

        let selected = self.select_active();
        let reset_phase = self.restart
            || match (&self.active, &selected) {
                (Some(prev), Some(next)) => prev != next,
                (None, Some(_)) => true,
                _ => false,
            };
        self.restart = false;
        if reset_phase {
            self.phase_ms = 0;
        }
        self.active = selected;

        if let Some(PatternRequest {
            pattern: PatternId::Flash { count, period_ms },
            ..
        }) = self.active
        {
            if self.phase_ms >= 2 * u32::from(count) * period_ms {
                self.flash_request = None;
                self.active = self.select_active();
                self.phase_ms = 0;
            }
        }

        self.active.is_some_and(|req| self.generate(req.pattern))
    }

    fn select_active(&self) -> Option<PatternRequest> {
        // Priority: flash (1) > link (2)
        self.flash_request.or(self.link_request)
    }

    fn generate(&self, pattern: PatternId) -> bool {
        match pattern {
            PatternId::Solid => true,
            PatternId::Off => false,
            PatternId::SlowBlink => (self.phase_ms % 1000) < 500,
            PatternId::Flash { period_ms, .. } => (self.phase_ms / period_ms.max(1)) % 2 == 0,
        }
    }
}
