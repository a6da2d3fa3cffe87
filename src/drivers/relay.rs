//! Relay driver for the switched load.
//!
//! The relay module's input polarity varies between boards, so the driver
//! takes the level that energizes the coil. Construction de-energizes the
//! load before anything else runs.

use embedded_hal::digital::OutputPin;
use log::info;

use crate::drivers::hw_init;
use crate::error::ActuatorError;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active_high: bool,
    energized: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        let mut drv = Self {
            pin,
            active_high,
            energized: true,
        };
        // A failed write here is retried by the first `set` from the loop.
        let _ = drv.set(false);
        drv
    }

    /// Energize or release the load. Writes only on change.
    pub fn set(&mut self, energized: bool) -> Result<(), ActuatorError> {
        if energized == self.energized {
            return Ok(());
        }
        hw_init::write_level(&mut self.pin, energized, self.active_high)?;
        self.energized = energized;
        info!("Relay: {}", if energized { "ON" } else { "OFF" });
        Ok(())
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }
}
