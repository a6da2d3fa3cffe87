//! Controller loop against mock ports, push-command policy.
//!
//! Covers the motion → status → command → relay round trip, failure
//! isolation, link-loss recovery and the alarm timing as seen from the
//! outside (pins, requests, events).

use guardian::app::commands::CommandSource;
use guardian::app::events::AppEvent;
use guardian::app::ports::HttpMethod;
use guardian::config::DeviceConfig;
use guardian::connectivity::LinkState;
use guardian::coordination::wire::{CommandToken, Endpoint};
use guardian::coordination::RemoteDecision;
use guardian::error::{CommsError, RequestFailure, TransportError};
use guardian::fsm::StateId;

use crate::mock_hw::{reply, MockNetwork, Rig};

const STATUS: &str = "/api/v1/status";
const COMMAND: &str = "/api/v1/command";

/// Relay-only push-command unit that waits for the server to decide.
fn relay_only() -> DeviceConfig {
    DeviceConfig {
        alarm: None,
        auto_activate_on_motion: false,
        ..DeviceConfig::default()
    }
}

// ── Round trip ────────────────────────────────────────────────

#[test]
fn motion_status_command_round_trip() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server.push(
        COMMAND,
        reply(200, r#"{"command":"relay_on","device_id":"esp32_smart_guardian","timestamp":1}"#),
    );

    rig.hw.motion = true;
    rig.tick(100);
    assert!(rig.ctl.presence().active, "presence must set on the first positive sample");
    rig.tick(200);
    rig.tick(300);

    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
    assert!(rig.hw.relay);

    // POST status, GET command, then the out-of-schedule transition report.
    let seen: Vec<_> = rig
        .server
        .requests
        .iter()
        .map(|r| (r.method, r.path.as_str()))
        .collect();
    assert_eq!(
        seen,
        [(HttpMethod::Post, STATUS), (HttpMethod::Get, COMMAND), (HttpMethod::Post, STATUS)]
    );
    assert_eq!(
        rig.server.requests_to(COMMAND)[0].json(),
        serde_json::json!({ "device_id": "esp32_smart_guardian" })
    );

    let reports = rig.server.status_reports();
    assert_eq!(reports[0]["motion"], true);
    assert_eq!(reports[0]["relay"], false);
    assert_eq!(reports[0]["signal_strength"], -55);
    assert_eq!(reports[0]["ip_address"], "192.168.1.42");
    assert!(reports[0].get("alarm").is_none(), "relay-only units do not report an alarm");
    assert_eq!(reports[1]["relay"], true);

    // Next scheduled report still says energized.
    rig.tick(2_100);
    let reports = rig.server.status_reports();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[2]["relay"], true);

    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Idle,
        to: StateId::Engaged,
        source: CommandSource::Remote(RemoteDecision::Command(CommandToken::RelayOn)),
    }));
}

#[test]
fn relay_off_command_cuts_the_load() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server.push(COMMAND, reply(200, r#"{"command":"relay_on"}"#));
    rig.server.push(COMMAND, reply(200, r#"{"command":"relay_off"}"#));

    rig.tick(100);
    assert!(rig.hw.relay);

    rig.tick(3_100);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
    assert!(!rig.hw.relay);
}

#[test]
fn repeated_relay_on_is_idempotent() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server
        .set_default(COMMAND, reply(200, r#"{"command":"relay_on"}"#));

    rig.run(100, 10_000, 100);

    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
    let changes = rig
        .sink
        .count(|e| matches!(e, AppEvent::ActuatorChanged { .. }));
    assert_eq!(changes, 1);
}

#[test]
fn local_motion_activates_without_waiting_for_the_server() {
    let cfg = DeviceConfig {
        alarm: None,
        ..DeviceConfig::default()
    };
    let mut rig = Rig::start(cfg, MockNetwork::online());

    rig.hw.motion = true;
    rig.tick(100);

    assert!(rig.hw.relay);
    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Idle,
        to: StateId::Engaged,
        source: CommandSource::Motion,
    }));
    // The scheduled report already sees the new state.
    assert_eq!(rig.server.status_reports()[0]["relay"], true);
}

// ── Failure isolation ─────────────────────────────────────────

#[test]
fn failed_command_poll_leaves_actuator_untouched() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server.set_default(COMMAND, reply(500, "boom"));

    let before = rig.ctl.actuator_state();
    rig.tick(100);
    assert_eq!(rig.ctl.actuator_state(), before);
    assert!(rig.sink.contains(&AppEvent::SyncFailed {
        endpoint: Endpoint::Command,
        error: CommsError::RequestFailed(RequestFailure::Status(500)),
    }));

    // The counter advanced anyway: no retry until the next interval.
    rig.run(200, 3_000, 100);
    assert_eq!(rig.server.requests_to(COMMAND).len(), 1);
    rig.tick(3_100);
    assert_eq!(rig.server.requests_to(COMMAND).len(), 2);
}

#[test]
fn failed_status_push_does_not_skip_the_command_poll() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server.push(STATUS, Err(TransportError::Timeout));
    rig.server.push(COMMAND, reply(200, r#"{"command":"relay_on"}"#));

    rig.tick(100);

    assert!(rig.sink.contains(&AppEvent::SyncFailed {
        endpoint: Endpoint::Status,
        error: CommsError::RequestFailed(RequestFailure::Transport(TransportError::Timeout)),
    }));
    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
}

#[test]
fn malformed_and_unknown_commands_are_ignored() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.server.push(COMMAND, reply(200, "relay_on"));
    rig.server.push(COMMAND, reply(200, r#"{"command":"reboot"}"#));
    rig.server.push(COMMAND, reply(200, r#"{"command":null}"#));

    rig.tick(100);
    assert!(rig.sink.contains(&AppEvent::SyncFailed {
        endpoint: Endpoint::Command,
        error: CommsError::MalformedResponse,
    }));
    rig.tick(3_100);
    rig.tick(6_100);

    assert_eq!(rig.server.requests_to(COMMAND).len(), 3);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::DecisionReceived(_))),
        0
    );
}

// ── Link watchdog ─────────────────────────────────────────────

#[test]
fn link_loss_pauses_sync_until_restored() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.tick(100);
    assert_eq!(rig.server.requests.len(), 2);

    rig.net.up = false;
    rig.tick(5_100);
    assert!(rig.sink.contains(&AppEvent::LinkLost));
    assert!(rig.sink.contains(&AppEvent::ReconnectStarted { deadline: 15_100 }));
    assert_eq!(rig.net.reconnects, 1);
    assert!(matches!(rig.ctl.link_state(), LinkState::Reconnecting { .. }));

    // Status and command are overdue, but nothing goes out while down.
    rig.tick(5_300);
    assert_eq!(rig.server.requests.len(), 2);

    rig.net.up = true;
    rig.tick(5_600);
    assert!(rig.sink.contains(&AppEvent::LinkRestored {
        after_ms: 500,
        rssi: Some(-55),
    }));
    assert_eq!(rig.ctl.link_state(), LinkState::Connected);
    assert_eq!(rig.server.requests.len(), 4);
    // Celebratory flash starts on the restore tick.
    assert!(rig.hw.indicator);
}

#[test]
fn reconnect_gives_up_at_deadline_and_retries_on_next_check() {
    let mut rig = Rig::start(relay_only(), MockNetwork::online());
    rig.tick(100);

    rig.net.up = false;
    rig.run(5_100, 15_000, 100);
    assert!(!rig.ctl.connectivity().connected);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ReconnectTimedOut), 0);

    rig.tick(15_100);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ReconnectTimedOut), 1);
    assert_eq!(rig.ctl.link_state(), LinkState::Down);
    assert_eq!(rig.ctl.connectivity().last_check_timestamp, 15_100);

    rig.run(15_200, 20_000, 100);
    assert_eq!(rig.net.reconnects, 1);

    rig.tick(20_100);
    assert_eq!(rig.net.reconnects, 2);
    // Already down: the second attempt is not a fresh loss.
    assert_eq!(rig.sink.count(|e| *e == AppEvent::LinkLost), 1);
}

#[test]
fn boot_without_link_waits_for_first_association() {
    let mut rig = Rig::start(relay_only(), MockNetwork::offline());
    assert!(rig.sink.contains(&AppEvent::ReconnectStarted { deadline: 15_000 }));

    rig.run(100, 2_000, 100);
    // The boot association is still in flight; no second connect issued.
    assert_eq!(rig.net.reconnects, 0);
    assert!(rig.server.requests.is_empty());

    // Picked up on the next 500 ms poll.
    rig.net.up = true;
    rig.tick(2_100);
    assert!(matches!(rig.ctl.link_state(), LinkState::Reconnecting { .. }));
    rig.tick(2_500);
    assert_eq!(rig.ctl.link_state(), LinkState::Connected);
    assert_eq!(rig.server.requests.len(), 2);
}

// ── Alarm ─────────────────────────────────────────────────────

#[test]
fn alarm_bursts_then_expires_keeping_relay_closed() {
    // Offline on purpose: local behaviour must not depend on the link.
    let mut rig = Rig::start(DeviceConfig::default(), MockNetwork::offline());

    rig.hw.motion = true;
    rig.tick(100);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Alerting);
    assert!(rig.hw.relay && rig.hw.buzzer);

    rig.hw.motion = false;
    rig.run(150, 5_050, 50);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Alerting);
    assert_eq!(rig.hw.buzzer_pulses(), 5);
    assert!(!rig.hw.buzzer, "burst is over before the alarm window ends");

    rig.tick(5_100);
    let st = rig.ctl.actuator_state();
    assert_eq!(st.state, StateId::Engaged);
    assert!(st.relay_on && !st.alarm_on);
    assert!(rig.hw.relay && !rig.hw.buzzer);
    assert!(rig.sink.contains(&AppEvent::ActuatorChanged {
        from: StateId::Alerting,
        to: StateId::Engaged,
        source: CommandSource::AlarmExpired,
    }));
}

#[test]
fn expired_alarm_is_reported_on_the_same_iteration() {
    let cfg = DeviceConfig {
        status_update_interval_ms: 5_000,
        ..DeviceConfig::default()
    };
    let mut rig = Rig::start(cfg, MockNetwork::online());

    rig.hw.motion = true;
    rig.tick(100);
    let reports = rig.server.status_reports();
    assert_eq!(reports[0]["alarm"], true);
    assert_eq!(reports[0]["relay"], true);

    rig.hw.motion = false;
    rig.tick(5_100);
    let reports = rig.server.status_reports();
    // [0] scheduled @100, [1] transition @100, [2] scheduled @5100.
    assert_eq!(reports[2]["alarm"], false);
    assert_eq!(reports[2]["relay"], true);
    assert_eq!(reports[2]["motion"], false);
}

#[test]
fn activation_during_cooldown_skips_the_alarm() {
    let mut rig = Rig::start(DeviceConfig::default(), MockNetwork::online());
    rig.hw.motion = true;
    rig.tick(100);
    rig.hw.motion = false;
    rig.tick(5_100);
    assert_eq!(rig.ctl.actuator_state().cooldown_until, 35_100);

    rig.server.push(COMMAND, reply(200, r#"{"command":"relay_off"}"#));
    rig.tick(8_100);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Idle);

    rig.hw.motion = true;
    rig.tick(9_000);
    assert_eq!(rig.ctl.actuator_state().state, StateId::Engaged);
    assert!(rig.hw.relay);
    assert!(!rig.hw.buzzer);
}
