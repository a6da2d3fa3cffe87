//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control loop of the guardian: presence
//! debouncing, actuator decisions and coordination with the server, tied
//! together by the [`service::Controller`]. All interaction with hardware
//! and the network happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
