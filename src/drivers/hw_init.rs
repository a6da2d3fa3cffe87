//! One-shot GPIO initialisation and pin-level helpers.
//!
//! On ESP-IDF, [`init_board_pins`] claims every GPIO listed in [`pins`] as
//! an esp-idf-hal `PinDriver` and hands them to `main()`, which wires them
//! into the drivers. Drivers themselves are generic over the embedded-hal
//! `InputPin` / `OutputPin` traits, so host tests substitute in-memory pins.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::error::{ActuatorError, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// `gpio_config` (direction or pull) rejected the pin: (gpio, rc).
    GpioConfigFailed(i32, i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(gpio, rc) => {
                write!(f, "GPIO{} config failed (rc={})", gpio, rc)
            }
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("GPIO configuration failed")
    }
}

// ── Level helpers ─────────────────────────────────────────────

/// Drive `pin` to the electrical level that means `active`.
pub fn write_level<P: OutputPin>(
    pin: &mut P,
    active: bool,
    active_high: bool,
) -> Result<(), ActuatorError> {
    let high = active == active_high;
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|e| {
        warn!("GPIO write failed: {:?}", e);
        ActuatorError::GpioWriteFailed
    })
}

/// Read `pin` and translate its electrical level into "asserted".
pub fn read_level<P: InputPin>(pin: &mut P, active_high: bool) -> Result<bool, SensorError> {
    let high = pin.is_high().map_err(|e| {
        warn!("GPIO read failed: {:?}", e);
        SensorError::GpioReadFailed
    })?;
    Ok(high == active_high)
}

// ── Board bring-up (ESP-IDF) ──────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::{init_board_pins, BoardPins, InputDriver, OutputDriver};

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver, Pull};
    use log::info;

    use super::HwInitError;
    use super::pins;

    pub type InputDriver = PinDriver<'static, AnyInputPin, Input>;
    pub type OutputDriver = PinDriver<'static, AnyOutputPin, Output>;

    /// Every GPIO the firmware touches, configured and ready.
    pub struct BoardPins {
        pub pir: InputDriver,
        pub load_sense: InputDriver,
        pub relay: OutputDriver,
        pub buzzer: OutputDriver,
        pub status_led: OutputDriver,
    }

    fn input(gpio: i32, pull: Pull) -> Result<InputDriver, HwInitError> {
        // SAFETY: each number in `pins` is claimed exactly once, here, and
        // `Peripherals::take()` pins for these GPIOs are never used.
        let pin = unsafe { AnyInputPin::new(gpio) };
        let mut drv =
            PinDriver::input(pin).map_err(|e| HwInitError::GpioConfigFailed(gpio, e.code()))?;
        drv.set_pull(pull)
            .map_err(|e| HwInitError::GpioConfigFailed(gpio, e.code()))?;
        Ok(drv)
    }

    fn output(gpio: i32) -> Result<OutputDriver, HwInitError> {
        // SAFETY: as for `input`.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        PinDriver::output(pin).map_err(|e| HwInitError::GpioConfigFailed(gpio, e.code()))
    }

    /// Claim and configure all board GPIOs. Call once from `main()`.
    pub fn init_board_pins() -> Result<BoardPins, HwInitError> {
        let pins = BoardPins {
            pir: input(pins::PIR_GPIO, Pull::Down)?,
            load_sense: input(pins::LOAD_SENSE_GPIO, Pull::Down)?,
            relay: output(pins::RELAY_GPIO)?,
            buzzer: output(pins::BUZZER_GPIO)?,
            status_led: output(pins::STATUS_LED_GPIO)?,
        };
        info!(
            "hw_init: PIR=GPIO{} sense=GPIO{} relay=GPIO{} buzzer=GPIO{} led=GPIO{}",
            pins::PIR_GPIO,
            pins::LOAD_SENSE_GPIO,
            pins::RELAY_GPIO,
            pins::BUZZER_GPIO,
            pins::STATUS_LED_GPIO
        );
        Ok(pins)
    }
}
