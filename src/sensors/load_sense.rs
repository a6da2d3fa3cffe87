//! Load-sense input: a photodiode module aimed at the switched lamp.
//!
//! Digital output, HIGH when the lamp is lit. Lets the server tell a lamp
//! that is on with nobody around apart from one that is merely commanded
//! on. A failed read reports "not sensed".

use embedded_hal::digital::InputPin;

use crate::drivers::hw_init;

pub struct LoadSense<P: InputPin> {
    pin: P,
}

impl<P: InputPin> LoadSense<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn read(&mut self) -> bool {
        hw_init::read_level(&mut self.pin, true).unwrap_or(false)
    }
}
