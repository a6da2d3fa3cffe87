//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stops feeding it. One iteration
//! is bounded by its blocking HTTP round: on the networked policies a
//! status POST and a command or relay-state GET, each allowed up to
//! `http_timeout_ms`, plus the `loop_period_ms` sleep. Reconnects and buzzer
//! bursts never block, so that round is the whole worst case.
//! `DeviceConfig::validate` keeps `watchdog_timeout_ms` above two HTTP
//! timeouts; [`iteration_budget_ms`] is the precise figure.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

use crate::config::DeviceConfig;

/// Requests one iteration may block on in the worst case.
const REQUESTS_PER_ROUND: u64 = 2;

/// Longest a single loop iteration can take before it feeds the watchdog.
pub fn iteration_budget_ms(config: &DeviceConfig) -> u64 {
    let http = if config.policy.requires_link() {
        u64::from(config.http_timeout_ms) * REQUESTS_PER_ROUND
    } else {
        0
    };
    http + u64::from(config.loop_period_ms)
}

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Subscribe the calling task with the configured timeout.
    pub fn for_config(config: &DeviceConfig) -> Self {
        let budget = iteration_budget_ms(config);
        if u64::from(config.watchdog_timeout_ms) <= budget {
            warn!(
                "Watchdog: {} ms timeout leaves no margin over a {} ms iteration",
                config.watchdog_timeout_ms, budget
            );
        }
        Self::new(config.watchdog_timeout_ms)
    }

    /// Reconfigure the TWDT and subscribe the current task to it.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("Watchdog: reconfigure returned {} (already running?)", ret);
                }

                let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
                if subscribed {
                    info!("Watchdog: loop subscribed, {} ms to reset", timeout_ms);
                } else {
                    warn!("Watchdog: loop task not subscribed");
                }

                Self {
                    subscribed,
                    timeout_ms,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {} ms, never fires", timeout_ms);
            Self { timeout_ms }
        }
    }

    /// Called once per loop iteration, after the sleep.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
