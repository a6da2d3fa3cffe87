//! Push-command policy: report status, poll for explicit commands.
//!
//! ```text
//!  every status interval   POST /api/v1/status  {device_id, motion, relay, [alarm], rssi, ip}
//!  every command interval  GET  /api/v1/command {device_id}  →  {"command": "relay_on" | "relay_off" | null}
//!  on every transition     POST /api/v1/status  (out of schedule)
//! ```
//!
//! Local motion may also energize the load directly; that is handled by the
//! controller (`auto_activate_on_motion`), not here.

use crate::app::events::AppEvent;
use crate::app::ports::{CoordinationTransport, EventSink, HttpMethod, Millis};
use crate::config::PolicyKind;
use crate::error::CommsError;

use super::wire::{self, CommandRequest, CommandStatus, CommandToken, Endpoint};
use super::{exchange, push_status, DeviceView, RemoteDecision, SyncDue, SyncOutcome, SyncPolicy};

#[derive(Debug, Default)]
pub struct CommandPolicy;

impl CommandPolicy {
    pub fn new() -> Self {
        Self
    }

    fn status_payload(view: &DeviceView<'_>) -> Result<Vec<u8>, CommsError> {
        wire::encode(&CommandStatus {
            device_id: view.device_id,
            motion: view.presence.active,
            relay: view.actuator.relay_on,
            alarm: view.reports_alarm.then_some(view.actuator.alarm_on),
            signal_strength: view.rssi.map_or(0, i32::from),
            ip_address: wire::format_ip(view.ip),
        })
    }

    fn report(
        view: &DeviceView<'_>,
        transport: &mut impl CoordinationTransport,
        sink: &mut impl EventSink,
    ) -> Result<(), CommsError> {
        let payload = Self::status_payload(view)?;
        push_status(transport, &payload, sink)
    }

    fn poll_command(
        view: &DeviceView<'_>,
        transport: &mut impl CoordinationTransport,
    ) -> Result<Option<CommandToken>, CommsError> {
        let body = wire::encode(&CommandRequest {
            device_id: view.device_id,
        })?;
        let resp = exchange(transport, HttpMethod::Get, Endpoint::Command, Some(&body))?;
        wire::parse_command(&resp.body)
    }
}

impl SyncPolicy for CommandPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PushCommand
    }

    fn sync<T, S>(
        &mut self,
        _now: Millis,
        due: SyncDue,
        view: &DeviceView<'_>,
        transport: &mut T,
        sink: &mut S,
    ) -> SyncOutcome
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        let mut outcome = SyncOutcome::default();

        if due.status {
            let res = Self::report(view, transport, sink);
            outcome.record(Endpoint::Status, res, sink);
        }

        if due.command {
            let res = Self::poll_command(view, transport);
            if let Some(Some(token)) = outcome.record(Endpoint::Command, res, sink) {
                let remote = RemoteDecision::Command(token);
                sink.emit(&AppEvent::DecisionReceived(remote));
                outcome.decision = Some(remote.into());
            }
        }

        outcome
    }

    fn on_transition<T, S>(&mut self, view: &DeviceView<'_>, transport: &mut T, sink: &mut S)
    where
        T: CoordinationTransport,
        S: EventSink,
    {
        if let Err(error) = Self::report(view, transport, sink) {
            sink.emit(&AppEvent::SyncFailed {
                endpoint: Endpoint::Status,
                error,
            });
        }
    }
}
