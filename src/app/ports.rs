//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (pins, WiFi station, HTTP client, clock, event sinks)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! takes them as generic parameters on every call, so the domain core never
//! touches hardware directly and every test can substitute a mock.

use core::net::Ipv4Addr;

use crate::error::TransportError;

/// Milliseconds since boot. Monotonic; wraps after ~584 million years.
pub type Millis = u64;

/// Largest response body the coordination client will buffer.
pub const MAX_RESPONSE_BODY: usize = 512;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw digital inputs, polarity already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// PIR reports motion on this sample (undebounced).
    pub motion_raw: bool,
    /// The switched load was observed to be lit.
    pub load_sensed: bool,
}

/// Read-side port: the domain calls this once per loop iteration.
pub trait SensorPort {
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port. Writes are treated as infallible by the domain; an
/// adapter that sees a pin error logs it and retries on the next call.
pub trait ActuatorPort {
    fn set_relay(&mut self, on: bool);

    fn set_buzzer(&mut self, on: bool);

    /// Status indicator LED.
    fn set_indicator(&mut self, on: bool);

    /// Relay open, buzzer silent, indicator dark.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi station)
// ───────────────────────────────────────────────────────────────

/// Station-mode link as the domain sees it. Every method is non-blocking.
pub trait ConnectivityPort {
    /// Associated and holding an IP address.
    fn is_connected(&self) -> bool;

    /// Kick off a reconnect attempt and return immediately.
    fn begin_reconnect(&mut self);

    /// Signal strength of the current association (dBm).
    fn rssi(&self) -> Option<i8>;

    /// Station IPv4 address, when one is assigned.
    fn local_ip(&self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Coordination transport (driven adapter: domain ↔ HTTP server)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A completed HTTP exchange. Any status code, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: heapless::Vec<u8, MAX_RESPONSE_BODY>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request/response channel to the coordination server.
///
/// Implementations bound every call by their configured timeout and send
/// `Content-Type: application/json` whenever `body` is present.
pub trait CoordinationTransport {
    fn request(
        &mut self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source. Sampled once per loop iteration.
pub trait ClockPort {
    fn now_ms(&self) -> Millis;
}
