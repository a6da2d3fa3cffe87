//! Mock adapters for integration tests.
//!
//! Every port the controller talks to has an in-memory stand-in here. The
//! transport records each request and answers from a per-path script, so
//! tests can assert on the full conversation with the server without a
//! socket.

use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;

use guardian::app::events::AppEvent;
use guardian::app::ports::{
    ActuatorPort, ConnectivityPort, CoordinationTransport, EventSink, HttpMethod, HttpResponse,
    Millis, SensorPort, SensorSnapshot,
};
use guardian::app::service::Controller;
use guardian::config::DeviceConfig;
use guardian::error::TransportError;

// ── MockHardware ──────────────────────────────────────────────

/// Pin-level stand-in: tests set the inputs, the controller sets the outputs.
#[derive(Debug, Default)]
pub struct MockHardware {
    pub motion: bool,
    pub load_sensed: bool,
    pub relay: bool,
    pub buzzer: bool,
    pub indicator: bool,
    /// Every buzzer level written, in order.
    pub buzzer_writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of off→on edges seen on the buzzer line.
    pub fn buzzer_pulses(&self) -> usize {
        let mut prev = false;
        let mut pulses = 0;
        for &level in &self.buzzer_writes {
            if level && !prev {
                pulses += 1;
            }
            prev = level;
        }
        pulses
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            motion_raw: self.motion,
            load_sensed: self.load_sensed,
        }
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay(&mut self, on: bool) {
        self.relay = on;
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
        self.buzzer_writes.push(on);
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator = on;
    }

    fn all_off(&mut self) {
        self.relay = false;
        self.buzzer = false;
        self.indicator = false;
    }
}

// ── MockNetwork ───────────────────────────────────────────────

#[derive(Debug)]
pub struct MockNetwork {
    pub up: bool,
    pub reconnects: u32,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn online() -> Self {
        Self {
            up: true,
            reconnects: 0,
        }
    }

    pub fn offline() -> Self {
        Self {
            up: false,
            reconnects: 0,
        }
    }
}

impl ConnectivityPort for MockNetwork {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn begin_reconnect(&mut self) {
        self.reconnects += 1;
    }

    fn rssi(&self) -> Option<i8> {
        self.up.then_some(-55)
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.up.then_some(Ipv4Addr::new(192, 168, 1, 42))
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

type Reply = Result<HttpResponse, TransportError>;

/// Scripted coordination server.
///
/// Replies queued with [`push`](Self::push) are consumed first; after that
/// the path's sticky [`set_default`](Self::set_default) reply is used, and
/// failing that a bare `200` with an empty JSON object.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub requests: Vec<RecordedRequest>,
    queued: HashMap<String, VecDeque<Reply>>,
    defaults: HashMap<String, Reply>,
}

pub fn reply(status: u16, body: &str) -> Reply {
    let mut buf = heapless::Vec::new();
    buf.extend_from_slice(body.as_bytes()).expect("body fits");
    Ok(HttpResponse { status, body: buf })
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, r: Reply) {
        self.queued.entry(path.to_owned()).or_default().push_back(r);
    }

    pub fn set_default(&mut self, path: &str, r: Reply) {
        self.defaults.insert(path.to_owned(), r);
    }

    pub fn requests_to(&self, path: &str) -> Vec<&RecordedRequest> {
        self.requests.iter().filter(|r| r.path == path).collect()
    }

    pub fn status_reports(&self) -> Vec<serde_json::Value> {
        self.requests_to("/api/v1/status")
            .into_iter()
            .map(RecordedRequest::json)
            .collect()
    }
}

impl CoordinationTransport for MockTransport {
    fn request(
        &mut self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.push(RecordedRequest {
            method,
            path: path.to_owned(),
            body: body.map(<[u8]>::to_vec).unwrap_or_default(),
        });
        if let Some(r) = self.queued.get_mut(path).and_then(VecDeque::pop_front) {
            return r;
        }
        self.defaults
            .get(path)
            .cloned()
            .unwrap_or_else(|| reply(200, "{}"))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A started controller wired to a full set of mocks.
pub struct Rig {
    pub ctl: Controller,
    pub hw: MockHardware,
    pub net: MockNetwork,
    pub server: MockTransport,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn start(config: DeviceConfig, net: MockNetwork) -> Self {
        let device_id = config.device_id.clone();
        let mut rig = Self {
            ctl: Controller::new(config, device_id),
            hw: MockHardware::new(),
            net,
            server: MockTransport::new(),
            sink: RecordingSink::new(),
        };
        rig.ctl.start(0, &mut rig.hw, &rig.net, &mut rig.sink);
        rig
    }

    pub fn tick(&mut self, now: Millis) {
        self.ctl
            .tick(now, &mut self.hw, &mut self.net, &mut self.server, &mut self.sink);
    }

    /// Tick every `step` ms over `from..=to`.
    pub fn run(&mut self, from: Millis, to: Millis, step: Millis) {
        let mut now = from;
        while now <= to {
            self.tick(now);
            now += step;
        }
    }
}
