//! JSON wire format spoken with the coordination server.
//!
//! ```text
//!  POST /api/v1/status        CommandStatus | ComputedStatus   → 2xx
//!  GET  /api/v1/command       CommandRequest                   → CommandResponse
//!  GET  /api/v1/relay_state   (no body)                        → 200 "1" | "0"
//! ```
//!
//! Payloads are serialised with serde_json into a heap `Vec<u8>` and
//! handed to the transport as-is. Responses are parsed from the
//! transport's fixed-capacity body buffer.

use core::fmt::Write as _;
use core::net::Ipv4Addr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CommsError;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Status,
    Command,
    RelayState,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "/api/v1/status",
            Self::Command => "/api/v1/command",
            Self::RelayState => "/api/v1/relay_state",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// Dotted-quad text of an IPv4 address.
pub type IpString = heapless::String<15>;

/// Status report for the push-command policy.
#[derive(Debug, Clone, Serialize)]
pub struct CommandStatus<'a> {
    pub device_id: &'a str,
    pub motion: bool,
    pub relay: bool,
    /// Present only on the alarm variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<bool>,
    /// RSSI in dBm; 0 when unknown.
    pub signal_strength: i32,
    /// "0.0.0.0" when no address is assigned.
    pub ip_address: IpString,
}

/// Three-way summary the server uses to compute the relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SituationCode {
    MotionDetected = 1,
    LoadOnWithoutMotion = 2,
    Quiet = 3,
}

impl SituationCode {
    pub fn classify(motion: bool, load_sensed: bool) -> Self {
        if motion {
            Self::MotionDetected
        } else if load_sensed {
            Self::LoadOnWithoutMotion
        } else {
            Self::Quiet
        }
    }
}

impl Serialize for SituationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Raw sensor facts for the push-computed policy.
#[derive(Debug, Clone, Serialize)]
pub struct ComputedStatus<'a> {
    pub device_id: &'a str,
    pub motion: bool,
    pub led_sensed: bool,
    pub situation: SituationCode,
}

/// Body of the command poll.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    pub device_id: &'a str,
}

pub fn format_ip(ip: Option<Ipv4Addr>) -> IpString {
    let mut out = IpString::new();
    // 15 chars always fit "255.255.255.255".
    let _ = write!(out, "{}", ip.unwrap_or(Ipv4Addr::UNSPECIFIED));
    out
}

pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, CommsError> {
    serde_json::to_vec(payload).map_err(|_| CommsError::MalformedResponse)
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

/// Actionable command tokens. Anything else the server sends is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandToken {
    RelayOn,
    RelayOff,
}

impl CommandToken {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "relay_on" => Some(Self::RelayOn),
            "relay_off" => Some(Self::RelayOff),
            _ => None,
        }
    }
}

/// Response to the command poll. Unknown fields (`device_id`, `timestamp`,
/// ...) are ignored; `command` may be absent or null.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub command: Option<heapless::String<32>>,
}

/// Extract the command token from a command-poll body.
///
/// `Ok(None)` covers "no command", null, and unrecognised tokens.
pub fn parse_command(body: &[u8]) -> Result<Option<CommandToken>, CommsError> {
    let resp: CommandResponse =
        serde_json::from_slice(body).map_err(|_| CommsError::MalformedResponse)?;
    Ok(resp.command.as_deref().and_then(CommandToken::parse))
}

/// Interpret a relay-state body. Only the exact texts `1` and `0` count.
pub fn parse_relay_state(body: &[u8]) -> Result<bool, CommsError> {
    match body {
        b"1" => Ok(true),
        b"0" => Ok(false),
        _ => Err(CommsError::MalformedResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(v: &impl Serialize) -> serde_json::Value {
        serde_json::from_slice(&encode(v).unwrap()).unwrap()
    }

    #[test]
    fn command_status_fields() {
        let v = json(&CommandStatus {
            device_id: "esp32_smart_guardian",
            motion: true,
            relay: false,
            alarm: Some(true),
            signal_strength: -61,
            ip_address: format_ip(Some(Ipv4Addr::new(192, 168, 1, 42))),
        });
        assert_eq!(v["device_id"], "esp32_smart_guardian");
        assert_eq!(v["motion"], true);
        assert_eq!(v["relay"], false);
        assert_eq!(v["alarm"], true);
        assert_eq!(v["signal_strength"], -61);
        assert_eq!(v["ip_address"], "192.168.1.42");
    }

    #[test]
    fn alarm_field_omitted_on_relay_only() {
        let v = json(&CommandStatus {
            device_id: "d",
            motion: false,
            relay: false,
            alarm: None,
            signal_strength: 0,
            ip_address: format_ip(None),
        });
        assert!(v.get("alarm").is_none());
        assert_eq!(v["ip_address"], "0.0.0.0");
    }

    #[test]
    fn situation_is_numeric() {
        let v = json(&ComputedStatus {
            device_id: "d",
            motion: false,
            led_sensed: true,
            situation: SituationCode::classify(false, true),
        });
        assert_eq!(v["situation"], 2);
        assert_eq!(v["led_sensed"], true);
    }

    #[test]
    fn situation_classification() {
        assert_eq!(SituationCode::classify(true, true), SituationCode::MotionDetected);
        assert_eq!(SituationCode::classify(true, false), SituationCode::MotionDetected);
        assert_eq!(SituationCode::classify(false, true), SituationCode::LoadOnWithoutMotion);
        assert_eq!(SituationCode::classify(false, false), SituationCode::Quiet);
    }

    #[test]
    fn command_parse_accepts_tokens_and_ignores_extras() {
        let body = br#"{"device_id":"d","command":"relay_on","timestamp":"2024-01-01T00:00:00"}"#;
        assert_eq!(parse_command(body).unwrap(), Some(CommandToken::RelayOn));
        assert_eq!(
            parse_command(br#"{"command":"relay_off"}"#).unwrap(),
            Some(CommandToken::RelayOff)
        );
    }

    #[test]
    fn command_parse_null_missing_and_unknown_are_no_command() {
        assert_eq!(parse_command(br#"{"command":null}"#).unwrap(), None);
        assert_eq!(parse_command(br#"{"device_id":"d"}"#).unwrap(), None);
        assert_eq!(parse_command(br#"{"command":"reboot"}"#).unwrap(), None);
    }

    #[test]
    fn command_parse_rejects_garbage() {
        assert_eq!(parse_command(b"<html>"), Err(CommsError::MalformedResponse));
        assert_eq!(parse_command(b""), Err(CommsError::MalformedResponse));
    }

    #[test]
    fn relay_state_exact_match_only() {
        assert_eq!(parse_relay_state(b"1"), Ok(true));
        assert_eq!(parse_relay_state(b"0"), Ok(false));
        for bad in [&b"1\n"[..], b" 0", b"true", b"", b"10"] {
            assert_eq!(parse_relay_state(bad), Err(CommsError::MalformedResponse));
        }
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Status.path(), "/api/v1/status");
        assert_eq!(Endpoint::Command.path(), "/api/v1/command");
        assert_eq!(Endpoint::RelayState.path(), "/api/v1/relay_state");
    }
}
