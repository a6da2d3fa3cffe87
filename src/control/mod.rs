//! Signal conditioning between raw inputs and the actuator state machine.

pub mod debounce;
