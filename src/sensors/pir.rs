//! HC-SR501 passive-infrared motion sensor.
//!
//! The module's own retrigger logic holds its output HIGH for a few
//! seconds after motion; the firmware debounces on top of that (see
//! [`PresenceDebouncer`](crate::control::debounce::PresenceDebouncer)).
//! A failed read reports the last good level.

use embedded_hal::digital::InputPin;

use crate::drivers::hw_init;

pub struct PirSensor<P: InputPin> {
    pin: P,
    active_high: bool,
    last: bool,
}

impl<P: InputPin> PirSensor<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            last: false,
        }
    }

    /// Raw motion sample, polarity applied.
    pub fn read(&mut self) -> bool {
        if let Ok(motion) = hw_init::read_level(&mut self.pin, self.active_high) {
            self.last = motion;
        }
        self.last
    }
}
