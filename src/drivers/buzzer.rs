//! Active buzzer driver and the non-blocking alarm burst.
//!
//! The alarm opens with a short chirp pattern: `cycles` on/off pairs of
//! `period` ms each. [`BurstState`] advances that pattern from the loop's
//! timestamps, so the loop never blocks while the buzzer sounds.
//!
//! ```text
//!  level  █▁█▁█▁█▁█▁▁▁▁▁▁▁▁▁
//!         ◄► period     burst done, alarm still raised
//! ```

use embedded_hal::digital::OutputPin;

use crate::app::ports::Millis;
use crate::drivers::hw_init;

// ── Burst pattern (pure logic) ────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstState {
    #[default]
    Idle,
    Bursting {
        /// Level changes still to come, including the pending one.
        remaining: u16,
        next_toggle: Millis,
        level: bool,
        period: Millis,
    },
}

impl BurstState {
    /// Begin a burst at `now`. The buzzer sounds immediately.
    pub fn start(now: Millis, cycles: u8, period: Millis) -> Self {
        if cycles == 0 || period == 0 {
            return Self::Idle;
        }
        Self::Bursting {
            remaining: u16::from(cycles) * 2 - 1,
            next_toggle: now + period,
            level: true,
            period,
        }
    }

    /// Apply every toggle that fell due by `now`.
    pub fn advance(&mut self, now: Millis) {
        while let Self::Bursting {
            remaining,
            next_toggle,
            level,
            period,
        } = *self
        {
            if now < next_toggle {
                break;
            }
            *self = if remaining <= 1 {
                Self::Idle
            } else {
                Self::Bursting {
                    remaining: remaining - 1,
                    next_toggle: next_toggle + period,
                    level: !level,
                    period,
                }
            };
        }
    }

    /// Buzzer level the pattern wants right now.
    pub fn level(&self) -> bool {
        matches!(self, Self::Bursting { level: true, .. })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

// ── Driver ────────────────────────────────────────────────────

pub struct BuzzerDriver<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> BuzzerDriver<P> {
    /// Take ownership of the pin and silence it.
    pub fn new(pin: P) -> Self {
        let mut drv = Self { pin, on: true };
        drv.set(false);
        drv
    }

    /// Sound or silence the buzzer. Writes only on change.
    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        // A failed write is logged by hw_init and retried on the next change.
        if hw_init::write_level(&mut self.pin, on, true).is_ok() {
            self.on = on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
