//! Hardware adapter: bridges pin drivers to domain port traits.
//!
//! Owns the [`SensorHub`] and all output drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  Generic over the embedded-hal pin
//! types: `main` instantiates it with esp-idf-hal `PinDriver`s, tests with
//! in-memory pins.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, SensorPort, SensorSnapshot};
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<M, L, R, B, I>
where
    M: InputPin,
    L: InputPin,
    R: OutputPin,
    B: OutputPin,
    I: OutputPin,
{
    sensor_hub: SensorHub<M, L>,
    relay: RelayDriver<R>,
    buzzer: BuzzerDriver<B>,
    led: StatusLed<I>,
}

impl<M, L, R, B, I> HardwareAdapter<M, L, R, B, I>
where
    M: InputPin,
    L: InputPin,
    R: OutputPin,
    B: OutputPin,
    I: OutputPin,
{
    pub fn new(
        sensor_hub: SensorHub<M, L>,
        relay: RelayDriver<R>,
        buzzer: BuzzerDriver<B>,
        led: StatusLed<I>,
    ) -> Self {
        Self {
            sensor_hub,
            relay,
            buzzer,
            led,
        }
    }

    pub fn relay_energized(&self) -> bool {
        self.relay.is_energized()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<M, L, R, B, I> SensorPort for HardwareAdapter<M, L, R, B, I>
where
    M: InputPin,
    L: InputPin,
    R: OutputPin,
    B: OutputPin,
    I: OutputPin,
{
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<M, L, R, B, I> ActuatorPort for HardwareAdapter<M, L, R, B, I>
where
    M: InputPin,
    L: InputPin,
    R: OutputPin,
    B: OutputPin,
    I: OutputPin,
{
    fn set_relay(&mut self, on: bool) {
        // Logged by the driver; the next call retries the write.
        let _ = self.relay.set(on);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn set_indicator(&mut self, on: bool) {
        self.led.set(on);
    }

    fn all_off(&mut self) {
        let _ = self.relay.set(false);
        self.buzzer.set(false);
        self.led.off();
    }
}
