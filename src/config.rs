//! Device configuration parameters
//!
//! All tunable parameters for the guardian firmware. Defaults reproduce the
//! shipped field units; the build environment may override the deployment
//! specific values (network credentials, coordination server, policy).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::adapters::wifi::{validate_password, validate_ssid};
use crate::app::ports::Millis;

/// Device identifier (also used as the `device_id` field on the wire).
pub type DeviceIdString = heapless::String<32>;
/// Station SSID (802.11 limit).
pub type SsidString = heapless::String<32>;
/// WPA2 passphrase (8-63 chars, or 64 hex digits).
pub type PasswordString = heapless::String<64>;
/// Coordination server hostname or dotted IPv4 address.
pub type HostString = heapless::String<64>;

// ---------------------------------------------------------------------------
// Coordination policy selection
// ---------------------------------------------------------------------------

/// Who decides when the relay is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// No server. Energize at boot, cut power after a fixed no-motion delay.
    Autonomous,
    /// Push status on a schedule and poll the server for explicit commands.
    PushCommand,
    /// Push raw sensor facts; the server computes the relay state.
    PushComputed,
}

impl PolicyKind {
    /// Parse the policy names accepted by `GUARDIAN_POLICY`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "autonomous" => Some(Self::Autonomous),
            "push_command" | "command" => Some(Self::PushCommand),
            "push_computed" | "computed" => Some(Self::PushComputed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autonomous => "autonomous",
            Self::PushCommand => "push_command",
            Self::PushComputed => "push_computed",
        }
    }

    /// Whether this policy does anything while the link is down.
    pub fn requires_link(self) -> bool {
        !matches!(self, Self::Autonomous)
    }

    /// Only the push-command build wires a buzzer and acts on motion locally.
    pub fn carries_alarm(self) -> bool {
        matches!(self, Self::PushCommand)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Alarm variant
// ---------------------------------------------------------------------------

/// Buzzer alarm raised on activation. Absent on relay-only builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// How long the alarm stays raised before auto-clearing (ms).
    pub duration_ms: u32,
    /// Quiet period after an alarm clears before another may start (ms).
    pub cooldown_ms: u32,
    /// Number of on/off buzzer cycles at the start of an alarm.
    pub burst_cycles: u8,
    /// Duration of each half-cycle of the burst (ms).
    pub burst_period_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5_000,
            cooldown_ms: 30_000,
            burst_cycles: 5,
            burst_period_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Device configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value the firmware cannot run with.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Identity / network ---
    /// Reported as `device_id`. Empty means "derive from the MAC".
    pub device_id: DeviceIdString,
    pub wifi_ssid: SsidString,
    pub wifi_password: PasswordString,
    pub server_host: HostString,
    pub server_port: u16,
    /// Per-request HTTP timeout (ms).
    pub http_timeout_ms: u32,

    // --- Policy ---
    pub policy: PolicyKind,
    /// Energize locally on a motion rising edge (push-command policy).
    pub auto_activate_on_motion: bool,
    /// `Some` on the alarm variant.
    pub alarm: Option<AlarmConfig>,

    // --- Presence ---
    /// Hold time after the last positive PIR sample before presence clears.
    pub motion_clear_delay_ms: u32,
    /// PIR output level that means "motion".
    pub motion_active_high: bool,
    /// Relay input level that energizes the load.
    pub relay_active_high: bool,

    // --- Connectivity ---
    pub wifi_check_interval_ms: u32,
    pub reconnect_poll_ms: u32,
    pub reconnect_timeout_ms: u32,
    /// Budget for the first association after boot.
    pub boot_connect_timeout_ms: u32,

    // --- Coordination cadence ---
    pub status_update_interval_ms: u32,
    pub command_check_interval_ms: u32,
    /// Autonomous policy: de-energize after this long without motion.
    pub autonomous_off_delay_ms: u32,
    /// Autonomous policy: how often the remaining time is logged.
    pub countdown_log_interval_ms: u32,

    // --- Loop ---
    pub loop_period_ms: u32,
    /// Task watchdog timeout (ms). Must exceed the longest blocking HTTP call.
    pub watchdog_timeout_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: bounded("esp32_smart_guardian"),
            wifi_ssid: SsidString::new(),
            wifi_password: PasswordString::new(),
            server_host: bounded("192.168.1.100"),
            server_port: 8000,
            http_timeout_ms: 3_000,

            policy: PolicyKind::PushCommand,
            auto_activate_on_motion: true,
            alarm: Some(AlarmConfig::default()),

            motion_clear_delay_ms: 2_000,
            motion_active_high: true,
            relay_active_high: true,

            wifi_check_interval_ms: 5_000,
            reconnect_poll_ms: 500,
            reconnect_timeout_ms: 10_000,
            boot_connect_timeout_ms: 15_000,

            status_update_interval_ms: 2_000,
            command_check_interval_ms: 3_000,
            autonomous_off_delay_ms: 60_000,
            countdown_log_interval_ms: 5_000,

            loop_period_ms: 100,
            watchdog_timeout_ms: 30_000,
        }
    }
}

impl DeviceConfig {
    /// Defaults overlaid with `GUARDIAN_*` values baked in at compile time.
    ///
    /// Unset variables keep their default. An unparsable port or policy name
    /// is a validation failure, never silently ignored.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(ssid) = option_env!("GUARDIAN_WIFI_SSID") {
            cfg.wifi_ssid = bounded(ssid);
        }
        if let Some(pass) = option_env!("GUARDIAN_WIFI_PASSWORD") {
            cfg.wifi_password = bounded(pass);
        }
        if let Some(host) = option_env!("GUARDIAN_SERVER_HOST") {
            cfg.server_host = bounded(host);
        }
        if let Some(port) = option_env!("GUARDIAN_SERVER_PORT") {
            cfg.server_port = port
                .parse()
                .map_err(|_| ConfigError::ValidationFailed("GUARDIAN_SERVER_PORT is not a port"))?;
        }
        if let Some(id) = option_env!("GUARDIAN_DEVICE_ID") {
            cfg.device_id = bounded(id);
        }
        if let Some(policy) = option_env!("GUARDIAN_POLICY") {
            cfg.apply_policy(policy)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Select a policy by name and reset the variant-specific knobs to the
    /// values that variant ships with.
    pub fn apply_policy(&mut self, name: &str) -> Result<(), ConfigError> {
        let policy = PolicyKind::parse(name)
            .ok_or(ConfigError::ValidationFailed("unknown coordination policy"))?;
        self.policy = policy;
        if !policy.carries_alarm() {
            self.alarm = None;
            self.auto_activate_on_motion = false;
        }
        if policy == PolicyKind::PushComputed {
            self.loop_period_ms = 50;
        }
        Ok(())
    }

    /// Check cross-field constraints. Called once at boot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            (self.loop_period_ms, "loop period must be non-zero"),
            (self.motion_clear_delay_ms, "motion clear delay must be non-zero"),
            (self.wifi_check_interval_ms, "wifi check interval must be non-zero"),
            (self.status_update_interval_ms, "status update interval must be non-zero"),
            (self.command_check_interval_ms, "command check interval must be non-zero"),
            (self.autonomous_off_delay_ms, "autonomous off delay must be non-zero"),
            (self.countdown_log_interval_ms, "countdown log interval must be non-zero"),
        ];
        if let Some(&(_, msg)) = intervals.iter().find(|(ms, _)| *ms == 0) {
            return Err(ConfigError::ValidationFailed(msg));
        }
        if self.reconnect_poll_ms == 0 || self.reconnect_poll_ms > self.reconnect_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "reconnect poll must be within the reconnect timeout",
            ));
        }
        if !self.policy.carries_alarm() && (self.alarm.is_some() || self.auto_activate_on_motion) {
            return Err(ConfigError::ValidationFailed(
                "alarm and local motion activation are push_command only",
            ));
        }
        if let Some(alarm) = &self.alarm {
            if alarm.duration_ms == 0 {
                return Err(ConfigError::ValidationFailed("alarm duration must be non-zero"));
            }
            let burst_span = u64::from(alarm.burst_cycles) * 2 * u64::from(alarm.burst_period_ms);
            if burst_span > u64::from(alarm.duration_ms) {
                return Err(ConfigError::ValidationFailed(
                    "buzzer burst outlasts the alarm",
                ));
            }
        }
        if self.policy.requires_link() {
            if self.server_host.is_empty() || self.server_port == 0 {
                return Err(ConfigError::ValidationFailed("coordination server not set"));
            }
            if u64::from(self.watchdog_timeout_ms) <= u64::from(self.http_timeout_ms) * 2 {
                return Err(ConfigError::ValidationFailed(
                    "watchdog would fire during a push/pull round",
                ));
            }
        }
        if !self.wifi_ssid.is_empty() {
            validate_ssid(&self.wifi_ssid)
                .map_err(|_| ConfigError::ValidationFailed("invalid WiFi SSID"))?;
            validate_password(&self.wifi_password)
                .map_err(|_| ConfigError::ValidationFailed("invalid WiFi password"))?;
        }
        Ok(())
    }

    // --- Millisecond accessors in the loop's time base ---

    pub fn motion_clear_delay(&self) -> Millis {
        Millis::from(self.motion_clear_delay_ms)
    }

    pub fn loop_period(&self) -> Millis {
        Millis::from(self.loop_period_ms)
    }
}

/// Copy `s` into a bounded string, truncating at capacity.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
