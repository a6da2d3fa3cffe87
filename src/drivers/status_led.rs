//! Single-colour status LED driver.
//!
//! The level comes from the [`LedPatternEngine`](super::led_patterns::LedPatternEngine);
//! this driver only remembers the last level so the pin is written on
//! change rather than every loop iteration.

use embedded_hal::digital::OutputPin;

use crate::drivers::hw_init;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, on: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        if hw_init::write_level(&mut self.pin, on, true).is_ok() {
            self.on = on;
        }
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
