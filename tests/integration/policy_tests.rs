//! Push-computed and autonomous policies, end to end through the controller.

use guardian::app::commands::CommandSource;
use guardian::app::events::AppEvent;
use guardian::app::ports::HttpMethod;
use guardian::config::DeviceConfig;
use guardian::coordination::wire::Endpoint;
use guardian::error::{CommsError, RequestFailure, TransportError};
use guardian::fsm::{ActuatorMachine, StateId};

use crate::mock_hw::{reply, MockNetwork, Rig};

const STATUS: &str = "/api/v1/status";
const RELAY_STATE: &str = "/api/v1/relay_state";

fn with_policy(name: &str) -> DeviceConfig {
    let mut cfg = DeviceConfig::default();
    cfg.apply_policy(name).expect("known policy");
    cfg
}

// ── Push-computed ─────────────────────────────────────────────

#[test]
fn computed_reports_facts_then_pulls_relay_state() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.push(RELAY_STATE, reply(200, "1"));
    rig.hw.load_sensed = true;

    rig.tick(50);

    let seen: Vec<_> = rig
        .server
        .requests
        .iter()
        .map(|r| (r.method, r.path.as_str(), r.body.is_empty()))
        .collect();
    // No transition report: this policy only reports on schedule.
    assert_eq!(
        seen,
        [(HttpMethod::Post, STATUS, false), (HttpMethod::Get, RELAY_STATE, true)]
    );
    assert_eq!(
        rig.server.status_reports()[0],
        serde_json::json!({
            "device_id": "esp32_smart_guardian",
            "motion": false,
            "led_sensed": true,
            "situation": 2,
        })
    );
    assert!(rig.hw.relay);
}

#[test]
fn computed_situation_codes() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.set_default(RELAY_STATE, reply(200, "0"));

    rig.hw.motion = true;
    rig.tick(50);
    // Presence clears exactly at the clear delay; the lamp is still lit.
    rig.hw.motion = false;
    rig.hw.load_sensed = true;
    rig.tick(2_050);
    rig.hw.load_sensed = false;
    rig.tick(4_050);

    let codes: Vec<_> = rig
        .server
        .status_reports()
        .iter()
        .map(|r| r["situation"].clone())
        .collect();
    assert_eq!(codes, [1, 2, 3]);
}

#[test]
fn computed_relay_state_matches_direct_activation() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.push(RELAY_STATE, reply(200, "1"));
    rig.server.push(RELAY_STATE, reply(200, "0"));

    let mut direct = ActuatorMachine::new(None);
    direct.start(0);

    rig.tick(50);
    direct.activate(50);
    assert_eq!(rig.ctl.actuator_state(), direct.state());

    rig.tick(2_050);
    direct.deactivate(2_050);
    assert_eq!(rig.ctl.actuator_state(), direct.state());
    assert!(!rig.hw.relay);
}

#[test]
fn computed_ignores_anything_but_exact_bodies() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.push(RELAY_STATE, reply(200, "1"));
    rig.tick(50);
    let engaged = rig.ctl.actuator_state();

    for (i, body) in ["on", "0\n", " 0", "", "true"].iter().enumerate() {
        rig.server.push(RELAY_STATE, reply(200, body));
        rig.tick(2_050 + 2_000 * i as u64);
        assert_eq!(rig.ctl.actuator_state(), engaged, "body {:?} must be a no-op", body);
    }
    assert_eq!(
        rig.sink.count(|e| *e
            == AppEvent::SyncFailed {
                endpoint: Endpoint::RelayState,
                error: CommsError::MalformedResponse,
            }),
        5
    );
}

#[test]
fn computed_requires_200_for_relay_state() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.push(RELAY_STATE, reply(204, "1"));

    rig.tick(50);

    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
    assert!(rig.sink.contains(&AppEvent::SyncFailed {
        endpoint: Endpoint::RelayState,
        error: CommsError::RequestFailed(RequestFailure::Status(204)),
    }));
}

#[test]
fn computed_pulls_even_when_push_fails() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.push(STATUS, Err(TransportError::Connect));
    rig.server.push(RELAY_STATE, reply(200, "1"));

    rig.tick(50);

    assert!(rig.sink.contains(&AppEvent::SyncFailed {
        endpoint: Endpoint::Status,
        error: CommsError::RequestFailed(RequestFailure::Transport(TransportError::Connect)),
    }));
    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
}

#[test]
fn computed_never_acts_on_motion_locally() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::online());
    rig.server.set_default(RELAY_STATE, reply(200, "0"));

    rig.hw.motion = true;
    rig.run(50, 1_950, 50);

    assert!(rig.ctl.presence().active);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
    // One exchange per status interval, not per iteration.
    assert_eq!(rig.server.requests_to(RELAY_STATE).len(), 1);
    rig.tick(2_050);
    assert_eq!(rig.server.requests_to(RELAY_STATE).len(), 2);
}

#[test]
fn computed_goes_quiet_while_link_is_down() {
    let mut rig = Rig::start(with_policy("push_computed"), MockNetwork::offline());
    rig.run(50, 5_000, 50);
    assert!(rig.server.requests.is_empty());
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
}

// ── Autonomous ────────────────────────────────────────────────

#[test]
fn autonomous_cuts_power_after_a_minute_without_motion() {
    let mut rig = Rig::start(with_policy("autonomous"), MockNetwork::online());
    assert!(rig.hw.relay, "energized at boot");
    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Idle,
        to: StateId::Engaged,
        source: CommandSource::Boot,
    }));

    rig.run(1_000, 59_000, 1_000);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
    assert!(rig.sink.contains(&AppEvent::CutoffCountdown { remaining_ms: 59_000 }));

    rig.tick(60_000);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
    assert!(!rig.hw.relay);
    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Engaged,
        to: StateId::Idle,
        source: CommandSource::NoMotionTimeout,
    }));

    assert!(rig.server.requests.is_empty(), "autonomous never talks to a server");
    assert_eq!(rig.net.reconnects, 0);
}

#[test]
fn autonomous_countdown_is_rate_limited() {
    let mut rig = Rig::start(with_policy("autonomous"), MockNetwork::offline());
    rig.run(100, 20_000, 100);

    let countdowns = rig
        .sink
        .count(|e| matches!(e, AppEvent::CutoffCountdown { .. }));
    // 100, 5100, 10100, 15100
    assert_eq!(countdowns, 4);
}

#[test]
fn autonomous_motion_restarts_the_timer() {
    let mut rig = Rig::start(with_policy("autonomous"), MockNetwork::offline());
    rig.run(1_000, 29_000, 1_000);

    rig.hw.motion = true;
    rig.tick(30_000);
    rig.hw.motion = false;

    rig.run(31_000, 89_000, 1_000);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);

    rig.tick(90_000);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
}

#[test]
fn autonomous_motion_after_cutoff_reenergizes() {
    let mut rig = Rig::start(with_policy("autonomous"), MockNetwork::offline());
    rig.run(1_000, 60_000, 1_000);
    assert!(!rig.hw.relay);

    rig.hw.motion = true;
    rig.tick(61_000);
    assert!(rig.hw.relay);
    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Idle,
        to: StateId::Engaged,
        source: CommandSource::Motion,
    }));
    assert!(!rig.hw.buzzer, "autonomous units carry no alarm");
}
