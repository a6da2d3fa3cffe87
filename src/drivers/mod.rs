//! Actuator drivers, GPIO bring-up, and the status LED pattern engine.

pub mod buzzer;
pub mod hw_init;
pub mod led_patterns;
pub mod relay;
pub mod status_led;
pub mod watchdog;
