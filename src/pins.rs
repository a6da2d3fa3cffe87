//! GPIO pin assignments for the guardian board (ESP32 DevKit v1).
//!
//! Single source of truth: `main` builds every pin driver from these numbers
//! rather than hard-coding them.
//!
//! ```text
//!   GPIO13 ◄── HC-SR501 PIR output (HIGH = motion)
//!   GPIO27 ◄── load-sense photodiode (HIGH = downstream lamp lit)
//!   GPIO12 ──► relay module IN (HIGH = energized)
//!   GPIO14 ──► active buzzer (alarm variant)
//!   GPIO2  ──► on-board blue LED (status indicator)
//! ```

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// PIR motion sensor output. Pulled down; the sensor drives it HIGH on motion.
pub const PIR_GPIO: i32 = 13;

/// Optical sense of whether the switched load is actually lit. Only reported
/// by the push-computed policy.
pub const LOAD_SENSE_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Relay coil driver. GPIO12 is a strapping pin (flash voltage); the relay
/// module's input must not pull it HIGH during reset.
pub const RELAY_GPIO: i32 = 12;

/// Active buzzer, driven HIGH to sound.
pub const BUZZER_GPIO: i32 = 14;

/// On-board status LED.
pub const STATUS_LED_GPIO: i32 = 2;
