//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production). Each line starts with a fixed
//! tag so field logs can be grepped by subsystem.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { policy, state } => {
                info!("START | policy={} | initial_state={:?}", policy, state);
            }
            AppEvent::MotionChanged { active } => {
                info!("MOTION | {}", if *active { "detected" } else { "cleared" });
            }
            AppEvent::ActuatorChanged { from, to, source } => {
                info!("RELAY | {:?} -> {:?} | source={:?}", from, to, source);
            }
            AppEvent::LinkLost => {
                warn!("LINK | connection lost");
            }
            AppEvent::ReconnectStarted { deadline } => {
                info!("LINK | reconnecting (deadline t={}ms)", deadline);
            }
            AppEvent::LinkRestored { after_ms, rssi } => {
                info!("LINK | connected after {}ms (RSSI={:?})", after_ms, rssi);
            }
            AppEvent::ReconnectTimedOut => {
                warn!("LINK | reconnect timed out, retrying at next check");
            }
            AppEvent::StatusPushed { endpoint, status } => {
                info!("SYNC | {} -> HTTP {}", endpoint.path(), status);
            }
            AppEvent::SyncFailed { endpoint, error } => {
                warn!("SYNC | {} failed: {}", endpoint.path(), error);
            }
            AppEvent::DecisionReceived(decision) => {
                info!("SYNC | server decision {:?}", decision);
            }
            AppEvent::CutoffCountdown { remaining_ms } => {
                info!("CUTOFF | no motion, power off in {}s", remaining_ms / 1_000);
            }
        }
    }
}
